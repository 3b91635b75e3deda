use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::routes::{health, portfolios, sync, transactions};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest(
            "/api/portfolios",
            portfolios::router()
                .merge(transactions::router())
                .merge(sync::router()),
        )
        .layer(cors)
        .with_state(state)
}
