use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::http::handlers::drafts::{
    create_draft, delete_draft, get_draft, list_drafts, update_draft,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_drafts).post(create_draft))
        .route(
            "/{id}",
            get(get_draft).patch(update_draft).delete(delete_draft),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
