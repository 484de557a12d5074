use axum::{Router, routing::get};

use super::{AppState, handlers};

/// Root router: card routes under `/genidcard` plus `/healthz`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/genidcard", get(handlers::banner))
        .route("/genidcard/api/create", get(handlers::create))
        .route("/genidcard/test", get(handlers::sample))
        .route("/genidcard/:file", get(handlers::artifact))
        .with_state(state)
}
