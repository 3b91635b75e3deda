use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::StockTransaction;

pub async fn fetch_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<StockTransaction>, sqlx::Error> {
    sqlx::query_as::<_, StockTransaction>(
        "SELECT t.id, t.portfolio_id, t.stock_symbol, t.kind, t.quantity, t.price,
                t.date, t.created_at, t.updated_at
         FROM stock_transactions t
         JOIN portfolios p ON p.id = t.portfolio_id
         WHERE p.user_id = $1
         ORDER BY t.date, t.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

// Idempotent insert-or-replace keyed by the client-generated id. The update
// arm only fires when the existing row already belongs to one of the acting
// user's portfolios; a foreign id collision yields no row.
pub async fn upsert(
    conn: &mut PgConnection,
    user_id: &str,
    input: &StockTransaction,
) -> Result<Option<StockTransaction>, sqlx::Error> {
    sqlx::query_as::<_, StockTransaction>(
        "INSERT INTO stock_transactions
             (id, portfolio_id, stock_symbol, kind, quantity, price, date, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         ON CONFLICT (id) DO UPDATE
         SET portfolio_id = EXCLUDED.portfolio_id,
             stock_symbol = EXCLUDED.stock_symbol,
             kind = EXCLUDED.kind,
             quantity = EXCLUDED.quantity,
             price = EXCLUDED.price,
             date = EXCLUDED.date,
             updated_at = EXCLUDED.updated_at
         WHERE stock_transactions.portfolio_id IN
             (SELECT id FROM portfolios WHERE user_id = $10)
         RETURNING id, portfolio_id, stock_symbol, kind, quantity, price,
                   date, created_at, updated_at",
    )
    .bind(input.id)
    .bind(input.portfolio_id)
    .bind(&input.stock_symbol)
    .bind(&input.kind)
    .bind(input.quantity)
    .bind(&input.price)
    .bind(input.date)
    .bind(input.created_at)
    .bind(input.updated_at)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

pub async fn delete_one(
    pool: &PgPool,
    user_id: &str,
    portfolio_id: Uuid,
    id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM stock_transactions t
         USING portfolios p
         WHERE t.id = $1
           AND t.portfolio_id = $2
           AND p.id = t.portfolio_id
           AND p.user_id = $3",
    )
    .bind(id)
    .bind(portfolio_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_all_for_portfolio(
    pool: &PgPool,
    user_id: &str,
    portfolio_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM stock_transactions t
         USING portfolios p
         WHERE t.portfolio_id = $1
           AND p.id = t.portfolio_id
           AND p.user_id = $2",
    )
    .bind(portfolio_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn count_for_user(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*)
         FROM stock_transactions t
         JOIN portfolios p ON p.id = t.portfolio_id
         WHERE p.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn insert(
    conn: &mut PgConnection,
    input: &StockTransaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO stock_transactions
             (id, portfolio_id, stock_symbol, kind, quantity, price, date, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(input.id)
    .bind(input.portfolio_id)
    .bind(&input.stock_symbol)
    .bind(&input.kind)
    .bind(input.quantity)
    .bind(&input.price)
    .bind(input.date)
    .bind(input.created_at)
    .bind(input.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete_all_for_user(
    conn: &mut PgConnection,
    user_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM stock_transactions t
         USING portfolios p
         WHERE p.id = t.portfolio_id AND p.user_id = $1",
    )
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
