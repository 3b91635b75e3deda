use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub async fn fetch_selected(pool: &PgPool, user_id: &str) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Option<Uuid>,)> =
        sqlx::query_as("SELECT selected_portfolio_id FROM sync_states WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|r| r.0))
}

pub async fn set_selected(
    conn: &mut PgConnection,
    user_id: &str,
    selected_portfolio_id: Option<Uuid>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO sync_states (user_id, selected_portfolio_id, updated_at)
         VALUES ($1, $2, now())
         ON CONFLICT (user_id) DO UPDATE
         SET selected_portfolio_id = EXCLUDED.selected_portfolio_id,
             updated_at = now()",
    )
    .bind(user_id)
    .bind(selected_portfolio_id)
    .execute(conn)
    .await?;
    Ok(())
}
