use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Closed set of trade event kinds recognized by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Ipo,
    Fpo,
    Auction,
    Rights,
    SecondaryBuy,
    SecondarySell,
    Bonus,
    Dividend,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Ipo => "IPO",
            TransactionKind::Fpo => "FPO",
            TransactionKind::Auction => "AUCTION",
            TransactionKind::Rights => "RIGHTS",
            TransactionKind::SecondaryBuy => "SECONDARY_BUY",
            TransactionKind::SecondarySell => "SECONDARY_SELL",
            TransactionKind::Bonus => "BONUS",
            TransactionKind::Dividend => "DIVIDEND",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IPO" => Some(TransactionKind::Ipo),
            "FPO" => Some(TransactionKind::Fpo),
            "AUCTION" => Some(TransactionKind::Auction),
            "RIGHTS" => Some(TransactionKind::Rights),
            "SECONDARY_BUY" => Some(TransactionKind::SecondaryBuy),
            "SECONDARY_SELL" => Some(TransactionKind::SecondarySell),
            "BONUS" => Some(TransactionKind::Bonus),
            "DIVIDEND" => Some(TransactionKind::Dividend),
            _ => None,
        }
    }
}

// One trade event against a portfolio, stored exactly as synced. The kind
// is kept as its wire string in the row; `TransactionKind` guards the edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StockTransaction {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub stock_symbol: String,
    pub kind: String,
    pub quantity: i64,
    pub price: BigDecimal,
    pub date: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertTransaction {
    pub id: Option<Uuid>,
    pub stock_symbol: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub quantity: i64,
    pub price: BigDecimal,
    pub date: chrono::DateTime<chrono::Utc>,
}

/// Symbols are compared and grouped case-insensitively; the upper-cased,
/// trimmed form is the canonical one everywhere.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_wire_form() {
        for kind in [
            TransactionKind::Ipo,
            TransactionKind::Fpo,
            TransactionKind::Auction,
            TransactionKind::Rights,
            TransactionKind::SecondaryBuy,
            TransactionKind::SecondarySell,
            TransactionKind::Bonus,
            TransactionKind::Dividend,
        ] {
            assert_eq!(TransactionKind::parse(kind.as_str()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            let back: TransactionKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!(TransactionKind::parse("NOT_A_TYPE"), None);
        assert!(serde_json::from_str::<TransactionKind>("\"NOT_A_TYPE\"").is_err());
    }

    #[test]
    fn symbol_normalization_uppercases_and_trims() {
        assert_eq!(normalize_symbol("  nabil "), "NABIL");
        assert_eq!(normalize_symbol("NTC"), "NTC");
        assert_eq!(normalize_symbol("   "), "");
    }
}
