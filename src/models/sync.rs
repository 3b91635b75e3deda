use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Snapshot;

/// Caller-chosen reconciliation strategy. There is deliberately no default:
/// an unrecognized or missing strategy rejects the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeStrategy {
    UseServer,
    UseLocal,
    Merge,
}

#[derive(Debug, Deserialize)]
pub struct CheckConflictRequest {
    pub local_portfolio_count: i64,
    pub local_transaction_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerCounts {
    pub portfolios: i64,
    pub transactions: i64,
}

#[derive(Debug, Serialize)]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub server_counts: ServerCounts,
    /// Included only when a conflict was flagged, saving the client an
    /// extra round trip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_snapshot: Option<Snapshot>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveConflictRequest {
    pub strategy: MergeStrategy,
    #[serde(default)]
    pub local_data: Option<Snapshot>,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub transactions: Vec<ImportItem>,
}

// The kind stays a raw string here so one bad item fails item validation
// instead of rejecting the whole request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportItem {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub stock_symbol: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: i64,
    pub price: BigDecimal,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ImportError {
    pub index: usize,
    pub item: ImportItem,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ImportOutcome {
    pub imported_count: usize,
    pub errors: Vec<ImportError>,
}

#[derive(Debug, Serialize)]
pub struct DeleteOutcome {
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_wire_tokens() {
        assert_eq!(
            serde_json::from_str::<MergeStrategy>("\"USE_SERVER\"").unwrap(),
            MergeStrategy::UseServer
        );
        assert_eq!(
            serde_json::from_str::<MergeStrategy>("\"USE_LOCAL\"").unwrap(),
            MergeStrategy::UseLocal
        );
        assert_eq!(
            serde_json::from_str::<MergeStrategy>("\"MERGE\"").unwrap(),
            MergeStrategy::Merge
        );
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!(serde_json::from_str::<MergeStrategy>("\"OVERWRITE\"").is_err());
    }

    #[test]
    fn import_item_tolerates_missing_id_and_date() {
        let item: ImportItem = serde_json::from_str(
            r#"{"stock_symbol":"NABIL","type":"SECONDARY_BUY","quantity":10,"price":500}"#,
        )
        .unwrap();
        assert!(item.id.is_none());
        assert!(item.date.is_none());
        assert_eq!(item.kind, "SECONDARY_BUY");
    }
}
