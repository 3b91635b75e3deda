/// Sync API contract tests.
///
/// Validates the JSON wire contract the sync endpoints promise to clients:
/// - Snapshot shape (nested portfolio -> stock group -> transaction tree)
/// - Conflict-check request/response shapes
/// - Resolve-conflict strategy tokens
/// - Import request items and partial-failure accounting shape
///
/// NOTE: These tests validate payload structures and the documented
/// semantics at the boundary. Full end-to-end tests require a running
/// server with a live database.
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Wire structures as documented to clients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Snapshot {
    portfolios: Vec<PortfolioEntry>,
    metadata: Vec<PortfolioMeta>,
    selected_portfolio_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PortfolioEntry {
    id: Uuid,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    stocks: Vec<StockGroup>,
    last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StockGroup {
    symbol: String,
    transactions: Vec<TransactionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TransactionEntry {
    id: Uuid,
    #[serde(rename = "type")]
    kind: String,
    quantity: i64,
    price: BigDecimal,
    date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PortfolioMeta {
    id: Uuid,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct CheckConflictRequest {
    local_portfolio_count: i64,
    local_transaction_count: i64,
}

#[derive(Debug, Deserialize)]
struct ConflictReport {
    has_conflict: bool,
    server_counts: ServerCounts,
    #[serde(default)]
    server_snapshot: Option<Snapshot>,
}

#[derive(Debug, Deserialize)]
struct ServerCounts {
    portfolios: i64,
    transactions: i64,
}

#[derive(Debug, Deserialize)]
struct ImportOutcome {
    imported_count: usize,
    errors: Vec<ImportErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ImportErrorEntry {
    index: usize,
    item: serde_json::Value,
    reason: String,
}

// ---------------------------------------------------------------------------
// Snapshot shape
// ---------------------------------------------------------------------------

#[test]
fn snapshot_round_trips_with_nested_tree() {
    let pid = Uuid::new_v4();
    let tid = Uuid::new_v4();
    let now: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();

    let snapshot = Snapshot {
        portfolios: vec![PortfolioEntry {
            id: pid,
            name: "Growth".into(),
            color: Some("#2196f3".into()),
            stocks: vec![StockGroup {
                symbol: "NABIL".into(),
                transactions: vec![TransactionEntry {
                    id: tid,
                    kind: "SECONDARY_BUY".into(),
                    quantity: 10,
                    price: BigDecimal::from(500),
                    date: now,
                    updated_at: Some(now),
                }],
            }],
            last_updated: now,
        }],
        metadata: vec![PortfolioMeta {
            id: pid,
            name: "Growth".into(),
            color: Some("#2196f3".into()),
            created_at: now,
            last_updated: now,
        }],
        selected_portfolio_id: Some(pid),
    };

    let wire = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(wire["portfolios"][0]["stocks"][0]["symbol"], "NABIL");
    assert_eq!(
        wire["portfolios"][0]["stocks"][0]["transactions"][0]["type"],
        "SECONDARY_BUY"
    );
    assert_eq!(wire["selected_portfolio_id"], json!(pid.to_string()));

    let back: Snapshot = serde_json::from_value(wire).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn snapshot_accepts_minimal_client_payload() {
    // Offline clients may omit color, updated_at and the selection.
    let raw = json!({
        "portfolios": [{
            "id": Uuid::new_v4(),
            "name": "Income",
            "stocks": [],
            "last_updated": "2024-06-01T12:00:00Z"
        }],
        "metadata": [],
        "selected_portfolio_id": null
    });

    let snapshot: Snapshot = serde_json::from_value(raw).unwrap();
    assert_eq!(snapshot.portfolios.len(), 1);
    assert!(snapshot.portfolios[0].color.is_none());
    assert!(snapshot.selected_portfolio_id.is_none());
}

#[test]
fn transaction_entry_requires_known_fields() {
    let raw = json!({
        "id": Uuid::new_v4(),
        "type": "BONUS",
        "quantity": 5,
        "price": 0,
        "date": "2024-06-01T12:00:00Z"
    });
    let entry: TransactionEntry = serde_json::from_value(raw).unwrap();
    assert_eq!(entry.kind, "BONUS");
    assert!(entry.updated_at.is_none());

    // Missing quantity is a malformed payload, not a default.
    let missing = json!({
        "id": Uuid::new_v4(),
        "type": "BONUS",
        "price": 0,
        "date": "2024-06-01T12:00:00Z"
    });
    assert!(serde_json::from_value::<TransactionEntry>(missing).is_err());
}

// ---------------------------------------------------------------------------
// Conflict check
// ---------------------------------------------------------------------------

#[test]
fn conflict_request_serializes_count_fields() {
    let req = CheckConflictRequest {
        local_portfolio_count: 2,
        local_transaction_count: 17,
    };
    let wire = serde_json::to_value(&req).unwrap();
    assert_eq!(wire["local_portfolio_count"], 2);
    assert_eq!(wire["local_transaction_count"], 17);
}

#[test]
fn conflict_report_with_and_without_snapshot() {
    let clean: ConflictReport = serde_json::from_value(json!({
        "has_conflict": false,
        "server_counts": {"portfolios": 2, "transactions": 17}
    }))
    .unwrap();
    assert!(!clean.has_conflict);
    assert!(clean.server_snapshot.is_none());
    assert_eq!(clean.server_counts.portfolios, 2);
    assert_eq!(clean.server_counts.transactions, 17);

    let flagged: ConflictReport = serde_json::from_value(json!({
        "has_conflict": true,
        "server_counts": {"portfolios": 3, "transactions": 17},
        "server_snapshot": {
            "portfolios": [],
            "metadata": [],
            "selected_portfolio_id": null
        }
    }))
    .unwrap();
    assert!(flagged.has_conflict);
    assert!(flagged.server_snapshot.is_some());
}

// ---------------------------------------------------------------------------
// Resolve conflict
// ---------------------------------------------------------------------------

#[test]
fn resolve_request_accepts_documented_strategies() {
    for strategy in ["USE_SERVER", "USE_LOCAL", "MERGE"] {
        let raw = json!({"strategy": strategy, "local_data": null});
        assert_eq!(raw["strategy"], strategy);
    }
}

// ---------------------------------------------------------------------------
// Import accounting
// ---------------------------------------------------------------------------

#[test]
fn import_outcome_reports_partial_failures() {
    // Two submitted, one rejected: imported_count + errors.len() == total.
    let outcome: ImportOutcome = serde_json::from_value(json!({
        "imported_count": 1,
        "errors": [{
            "index": 1,
            "item": {"stock_symbol": "XYZ", "type": "NOT_A_TYPE", "quantity": 5, "price": 10},
            "reason": "unrecognized transaction type: NOT_A_TYPE"
        }]
    }))
    .unwrap();

    assert_eq!(outcome.imported_count, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].index, 1);
    assert_eq!(outcome.errors[0].item["type"], "NOT_A_TYPE");
    assert!(outcome.errors[0].reason.contains("NOT_A_TYPE"));
}
