use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::my_posts;
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/posts", get(my_posts))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
