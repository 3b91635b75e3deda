use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{CheckConflictRequest, ConflictReport, ResolveConflictRequest, Snapshot};
use crate::services::{conflict_service, merge_service, snapshot_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync", get(get_snapshot))
        .route("/check-conflict", post(check_conflict))
        .route("/upload-local", post(upload_local))
        .route("/resolve-conflict", post(resolve_conflict))
}

#[axum::debug_handler]
pub async fn get_snapshot(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Snapshot>, AppError> {
    info!("GET /portfolios/sync - Building snapshot");
    let snapshot = snapshot_service::build(&state.pool, &user_id)
        .await
        .map_err(|e| {
            error!("Failed to build snapshot: {}", e);
            e
        })?;
    Ok(Json(snapshot))
}

pub async fn check_conflict(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(data): Json<CheckConflictRequest>,
) -> Result<Json<ConflictReport>, AppError> {
    info!(
        "POST /portfolios/check-conflict - local counts {}/{}",
        data.local_portfolio_count, data.local_transaction_count
    );
    let report = conflict_service::detect(&state.pool, &user_id, &data)
        .await
        .map_err(|e| {
            error!("Failed to check conflict: {}", e);
            e
        })?;
    if report.has_conflict {
        info!(
            "Conflict detected: server counts {}/{}",
            report.server_counts.portfolios, report.server_counts.transactions
        );
    }
    Ok(Json(report))
}

/// Unconditional local-replace: the uploaded replica becomes the server
/// state and is echoed back as the freshly rebuilt snapshot.
pub async fn upload_local(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(data): Json<Snapshot>,
) -> Result<Json<Snapshot>, AppError> {
    info!(
        "POST /portfolios/upload-local - Replacing with {} portfolios",
        data.portfolios.len()
    );
    let snapshot = merge_service::replace_with_local(&state.pool, &user_id, &data)
        .await
        .map_err(|e| {
            error!("Failed to upload local data: {}", e);
            e
        })?;
    Ok(Json(snapshot))
}

pub async fn resolve_conflict(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(data): Json<ResolveConflictRequest>,
) -> Result<Json<Snapshot>, AppError> {
    info!("POST /portfolios/resolve-conflict - Strategy {:?}", data.strategy);
    let snapshot = merge_service::resolve(
        &state.pool,
        &user_id,
        data.strategy,
        data.local_data.as_ref(),
    )
    .await
    .map_err(|e| {
        error!("Failed to resolve conflict: {}", e);
        e
    })?;
    Ok(Json(snapshot))
}
