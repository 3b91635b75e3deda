use sqlx::PgPool;

use crate::db::{portfolio_queries, transaction_queries};
use crate::errors::AppError;
use crate::models::{CheckConflictRequest, ConflictReport, ServerCounts};
use crate::services::snapshot_service;

/// Coarse divergence check: compares the client's aggregate counts against
/// the server's. Content-only edits with unchanged counts are intentionally
/// not flagged; a caller needing content-accurate detection diffs full
/// snapshots. When counts disagree, the server snapshot rides along so the
/// client can resolve without another round trip.
pub async fn detect(
    pool: &PgPool,
    user_id: &str,
    local: &CheckConflictRequest,
) -> Result<ConflictReport, AppError> {
    let portfolios = portfolio_queries::count_for_user(pool, user_id).await?;
    let transactions = transaction_queries::count_for_user(pool, user_id).await?;
    let server_counts = ServerCounts {
        portfolios,
        transactions,
    };

    let has_conflict = local.local_portfolio_count != server_counts.portfolios
        || local.local_transaction_count != server_counts.transactions;

    let server_snapshot = if has_conflict {
        Some(snapshot_service::build(pool, user_id).await?)
    } else {
        None
    };

    Ok(ConflictReport {
        has_conflict,
        server_counts,
        server_snapshot,
    })
}
