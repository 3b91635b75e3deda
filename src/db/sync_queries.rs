use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{portfolio_queries, sync_state_queries, transaction_queries};
use crate::models::{Portfolio, StockTransaction};

/// Replaces a user's entire entity set in one durable transaction.
///
/// A concurrent reader sees either the fully-old or fully-new state; any
/// failure mid-way rolls the whole replacement back. Transactions are
/// deleted before portfolios and inserted after them to satisfy the FK.
pub async fn replace_user_data(
    pool: &PgPool,
    user_id: &str,
    portfolios: &[Portfolio],
    transactions: &[StockTransaction],
    selected_portfolio_id: Option<Uuid>,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    transaction_queries::delete_all_for_user(&mut *tx, user_id).await?;
    portfolio_queries::delete_all_for_user(&mut *tx, user_id).await?;

    for portfolio in portfolios {
        portfolio_queries::insert(&mut *tx, portfolio).await?;
    }
    for transaction in transactions {
        transaction_queries::insert(&mut *tx, transaction).await?;
    }

    sync_state_queries::set_selected(&mut *tx, user_id, selected_portfolio_id).await?;

    tx.commit().await?;
    Ok(())
}
