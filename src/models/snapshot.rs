use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::TransactionKind;

/// Full nested portfolio tree for one user — the single wire shape every
/// sync endpoint returns, and the shape a client submits as its local
/// replica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub portfolios: Vec<PortfolioEntry>,
    pub metadata: Vec<PortfolioMeta>,
    pub selected_portfolio_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub stocks: Vec<StockGroup>,
    /// Logical last-modified: max over the portfolio header and all of its
    /// transactions. This, not arrival time, drives merge decisions.
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockGroup {
    pub symbol: String,
    pub transactions: Vec<TransactionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub quantity: i64,
    pub price: BigDecimal,
    pub date: DateTime<Utc>,
    /// Per-transaction merge timestamp. When a client omits it the parent
    /// portfolio's `last_updated` is used instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMeta {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}
