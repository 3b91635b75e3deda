use axum::extract::{Path, State};
use axum::routing::{delete, post};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{DeleteOutcome, ImportOutcome, ImportRequest, StockTransaction, UpsertTransaction};
use crate::services::{import_service, transaction_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/:id/transactions",
            post(create_transaction).delete(delete_all_transactions),
        )
        .route("/:id/transactions/:tid", delete(delete_transaction))
        .route("/:id/import", post(import_transactions))
}

#[axum::debug_handler]
pub async fn create_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(portfolio_id): Path<Uuid>,
    Json(data): Json<UpsertTransaction>,
) -> Result<Json<StockTransaction>, AppError> {
    info!("POST /portfolios/{}/transactions - Upserting transaction", portfolio_id);
    let transaction = transaction_service::upsert(&state.pool, &user_id, portfolio_id, data)
        .await
        .map_err(|e| {
            error!("Failed to upsert transaction in portfolio {}: {}", portfolio_id, e);
            e
        })?;
    Ok(Json(transaction))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((portfolio_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<()>, AppError> {
    info!("DELETE /portfolios/{}/transactions/{} - Deleting transaction", portfolio_id, id);
    transaction_service::delete_one(&state.pool, &user_id, portfolio_id, id)
        .await
        .map_err(|e| {
            error!("Failed to delete transaction {}: {}", id, e);
            e
        })?;
    Ok(Json(()))
}

pub async fn delete_all_transactions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(portfolio_id): Path<Uuid>,
) -> Result<Json<DeleteOutcome>, AppError> {
    info!("DELETE /portfolios/{}/transactions - Deleting all transactions", portfolio_id);
    let deleted = transaction_service::delete_all(&state.pool, &user_id, portfolio_id)
        .await
        .map_err(|e| {
            error!("Failed to delete transactions for portfolio {}: {}", portfolio_id, e);
            e
        })?;
    Ok(Json(DeleteOutcome { deleted }))
}

pub async fn import_transactions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(portfolio_id): Path<Uuid>,
    Json(data): Json<ImportRequest>,
) -> Result<Json<ImportOutcome>, AppError> {
    info!(
        "POST /portfolios/{}/import - Importing {} transactions",
        portfolio_id,
        data.transactions.len()
    );
    let outcome = import_service::import(&state.pool, &user_id, portfolio_id, data.transactions)
        .await
        .map_err(|e| {
            error!("Failed to import into portfolio {}: {}", portfolio_id, e);
            e
        })?;
    Ok(Json(outcome))
}
