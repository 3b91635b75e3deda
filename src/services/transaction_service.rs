use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{portfolio_queries, transaction_queries};
use crate::errors::AppError;
use crate::models::{normalize_symbol, StockTransaction, UpsertTransaction};

// Every write is checked against the parent portfolio's ownership before
// anything touches the transaction table.
pub async fn upsert(
    pool: &PgPool,
    user_id: &str,
    portfolio_id: Uuid,
    input: UpsertTransaction,
) -> Result<StockTransaction, AppError> {
    portfolio_queries::fetch_one(pool, user_id, portfolio_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let symbol = normalize_symbol(&input.stock_symbol);
    if symbol.is_empty() {
        return Err(AppError::Validation("stock_symbol must not be empty".into()));
    }
    if input.quantity <= 0 {
        return Err(AppError::Validation("quantity must be positive".into()));
    }
    if input.price < BigDecimal::from(0) {
        return Err(AppError::Validation("price must not be negative".into()));
    }

    let now = Utc::now();
    let row = StockTransaction {
        id: input.id.unwrap_or_else(Uuid::new_v4),
        portfolio_id,
        stock_symbol: symbol,
        kind: input.kind.as_str().to_string(),
        quantity: input.quantity,
        price: input.price,
        date: input.date,
        created_at: now,
        updated_at: now,
    };

    let mut conn = pool.acquire().await?;
    transaction_queries::upsert(&mut *conn, user_id, &row)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn delete_one(
    pool: &PgPool,
    user_id: &str,
    portfolio_id: Uuid,
    id: Uuid,
) -> Result<(), AppError> {
    match transaction_queries::delete_one(pool, user_id, portfolio_id, id).await? {
        0 => Err(AppError::NotFound),
        _ => Ok(()),
    }
}

pub async fn delete_all(
    pool: &PgPool,
    user_id: &str,
    portfolio_id: Uuid,
) -> Result<u64, AppError> {
    portfolio_queries::fetch_one(pool, user_id, portfolio_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let deleted = transaction_queries::delete_all_for_portfolio(pool, user_id, portfolio_id).await?;
    Ok(deleted)
}
