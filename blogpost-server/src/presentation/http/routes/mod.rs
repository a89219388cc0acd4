use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::handlers::health::healthz;

pub(crate) mod auth;
pub(crate) mod drafts;
pub(crate) mod me;
pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api/auth", auth::router())
        .nest("/api/blog", posts::router(state.clone()))
        .nest("/api/me", me::router(state.clone()))
        .nest("/api/draft", drafts::router(state.clone()))
        .with_state(state)
}
