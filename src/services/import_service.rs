use anyhow::bail;
use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::{portfolio_queries, transaction_queries};
use crate::errors::AppError;
use crate::models::{
    normalize_symbol, ImportError, ImportItem, ImportOutcome, StockTransaction, TransactionKind,
};

/// Additive batch ingestion into one portfolio with a two-tier failure
/// model: item validation failures are recorded and skipped, while a
/// storage failure rolls the whole batch back so nothing is half-applied.
pub async fn import(
    pool: &PgPool,
    user_id: &str,
    portfolio_id: Uuid,
    items: Vec<ImportItem>,
) -> Result<ImportOutcome, AppError> {
    portfolio_queries::fetch_one(pool, user_id, portfolio_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let total = items.len();
    let mut valid = Vec::new();
    let mut errors = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        match validate_item(portfolio_id, &item) {
            Ok(row) => valid.push((index, item, row)),
            Err(e) => errors.push(ImportError {
                index,
                item,
                reason: e.to_string(),
            }),
        }
    }

    let mut tx = pool.begin().await?;
    let mut imported_count = 0;
    for (index, item, row) in valid {
        match transaction_queries::upsert(&mut *tx, user_id, &row).await? {
            Some(_) => imported_count += 1,
            // The id is already taken by a row outside this user's
            // portfolios; recorded without confirming whose it is.
            None => errors.push(ImportError {
                index,
                item,
                reason: "transaction id is not available".to_string(),
            }),
        }
    }
    tx.commit().await?;

    errors.sort_by_key(|e| e.index);
    info!(
        "Imported {}/{} transactions into portfolio {} ({} rejected)",
        imported_count,
        total,
        portfolio_id,
        errors.len()
    );

    Ok(ImportOutcome {
        imported_count,
        errors,
    })
}

fn validate_item(portfolio_id: Uuid, item: &ImportItem) -> anyhow::Result<StockTransaction> {
    let symbol = normalize_symbol(&item.stock_symbol);
    if symbol.is_empty() {
        bail!("stock_symbol must not be empty");
    }
    let kind = match TransactionKind::parse(item.kind.trim()) {
        Some(kind) => kind,
        None => bail!("unrecognized transaction type: {}", item.kind),
    };
    if item.quantity <= 0 {
        bail!("quantity must be positive");
    }
    if item.price < BigDecimal::from(0) {
        bail!("price must not be negative");
    }

    let now = Utc::now();
    Ok(StockTransaction {
        id: item.id.unwrap_or_else(Uuid::new_v4),
        portfolio_id,
        stock_symbol: symbol,
        kind: kind.as_str().to_string(),
        quantity: item.quantity,
        price: item.price.clone(),
        date: item.date.unwrap_or(now),
        created_at: now,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(symbol: &str, kind: &str, quantity: i64, price: i64) -> ImportItem {
        ImportItem {
            id: None,
            stock_symbol: symbol.into(),
            kind: kind.into(),
            quantity,
            price: BigDecimal::from(price),
            date: None,
        }
    }

    #[test]
    fn valid_item_becomes_a_row_with_generated_id() {
        let pid = Uuid::new_v4();
        let row = validate_item(pid, &item("nabil", "SECONDARY_BUY", 10, 500)).unwrap();
        assert_eq!(row.portfolio_id, pid);
        assert_eq!(row.stock_symbol, "NABIL");
        assert_eq!(row.kind, "SECONDARY_BUY");
        assert_eq!(row.quantity, 10);
    }

    #[test]
    fn client_supplied_id_is_preserved() {
        let id = Uuid::new_v4();
        let mut i = item("NABIL", "IPO", 10, 100);
        i.id = Some(id);
        let row = validate_item(Uuid::new_v4(), &i).unwrap();
        assert_eq!(row.id, id);
    }

    #[test]
    fn unrecognized_type_is_rejected() {
        let err = validate_item(Uuid::new_v4(), &item("XYZ", "NOT_A_TYPE", 5, 10)).unwrap_err();
        assert!(err.to_string().contains("NOT_A_TYPE"));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert!(validate_item(Uuid::new_v4(), &item("NABIL", "IPO", 0, 10)).is_err());
        assert!(validate_item(Uuid::new_v4(), &item("NABIL", "IPO", -5, 10)).is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(validate_item(Uuid::new_v4(), &item("NABIL", "IPO", 1, -1)).is_err());
    }

    #[test]
    fn zero_price_is_allowed() {
        // Bonus shares and the like carry no price.
        assert!(validate_item(Uuid::new_v4(), &item("NABIL", "BONUS", 5, 0)).is_ok());
    }

    #[test]
    fn blank_symbol_is_rejected() {
        assert!(validate_item(Uuid::new_v4(), &item("   ", "IPO", 1, 1)).is_err());
    }
}
