use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::Portfolio;

pub async fn fetch_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Portfolio>, sqlx::Error> {
    sqlx::query_as::<_, Portfolio>(
        "SELECT id, user_id, name, color, created_at, updated_at
         FROM portfolios
         WHERE user_id = $1
         ORDER BY created_at, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(
    pool: &PgPool,
    user_id: &str,
    id: Uuid,
) -> Result<Option<Portfolio>, sqlx::Error> {
    sqlx::query_as::<_, Portfolio>(
        "SELECT id, user_id, name, color, created_at, updated_at
         FROM portfolios
         WHERE user_id = $1 AND id = $2",
    )
    .bind(user_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

// Idempotent insert-or-replace keyed by the client-generated id. The
// conflict guard pins ownership: an id already taken by another user's row
// updates nothing and yields no row.
pub async fn upsert(pool: &PgPool, input: &Portfolio) -> Result<Option<Portfolio>, sqlx::Error> {
    sqlx::query_as::<_, Portfolio>(
        "INSERT INTO portfolios (id, user_id, name, color, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (id) DO UPDATE
         SET name = EXCLUDED.name,
             color = EXCLUDED.color,
             updated_at = EXCLUDED.updated_at
         WHERE portfolios.user_id = EXCLUDED.user_id
         RETURNING id, user_id, name, color, created_at, updated_at",
    )
    .bind(input.id)
    .bind(&input.user_id)
    .bind(&input.name)
    .bind(&input.color)
    .bind(input.created_at)
    .bind(input.updated_at)
    .fetch_optional(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    user_id: &str,
    id: Uuid,
    name: &str,
    color: &Option<String>,
) -> Result<Option<Portfolio>, sqlx::Error> {
    sqlx::query_as::<_, Portfolio>(
        "UPDATE portfolios
         SET name = $1, color = $2, updated_at = now()
         WHERE id = $3 AND user_id = $4
         RETURNING id, user_id, name, color, created_at, updated_at",
    )
    .bind(name)
    .bind(color)
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, user_id: &str, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM portfolios WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count_for_user(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM portfolios WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn insert(conn: &mut PgConnection, input: &Portfolio) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO portfolios (id, user_id, name, color, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(input.id)
    .bind(&input.user_id)
    .bind(&input.name)
    .bind(&input.color)
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
    let result = sqlx::query("DELETE FROM portfolios WHERE user_id = $1")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
