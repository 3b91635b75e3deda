use axum::extract::{Path, State};
use axum::routing::{delete, post, put};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{Portfolio, UpdatePortfolio, UpsertPortfolio};
use crate::services::portfolio_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_portfolio).get(fetch_portfolios))
        .route("/:id", put(update_portfolio))
        .route("/:id", delete(delete_portfolio))
}

#[axum::debug_handler]
pub async fn create_portfolio(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(data): Json<UpsertPortfolio>,
) -> Result<Json<Portfolio>, AppError> {
    info!("POST /portfolios - Upserting portfolio");
    let portfolio = portfolio_service::upsert(&state.pool, &user_id, data)
        .await
        .map_err(|e| {
            error!("Failed to upsert portfolio: {}", e);
            e
        })?;
    Ok(Json(portfolio))
}

pub async fn fetch_portfolios(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Portfolio>>, AppError> {
    info!("GET /portfolios - Fetching portfolios");
    let portfolios = portfolio_service::fetch_all(&state.pool, &user_id)
        .await
        .map_err(|e| {
            error!("Failed to fetch portfolios: {}", e);
            e
        })?;
    Ok(Json(portfolios))
}

pub async fn update_portfolio(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdatePortfolio>,
) -> Result<Json<Portfolio>, AppError> {
    info!("PUT /portfolios/{} - Updating portfolio", id);
    let portfolio = portfolio_service::update(&state.pool, &user_id, id, data)
        .await
        .map_err(|e| {
            error!("Failed to update portfolio {}: {}", id, e);
            e
        })?;
    Ok(Json(portfolio))
}

pub async fn delete_portfolio(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, AppError> {
    info!("DELETE /portfolios/{} - Deleting portfolio", id);
    portfolio_service::delete(&state.pool, &user_id, id)
        .await
        .map_err(|e| {
            error!("Failed to delete portfolio {}: {}", id, e);
            e
        })?;
    Ok(Json(()))
}
