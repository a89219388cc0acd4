use axum::{
    Router,
    routing::{get, post},
};

use crate::presentation::AppState;
use crate::presentation::http::handlers::auth::{
    confirm_email, login, password_forgot_email, password_reset, refresh_token, register,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/confirm/{token}", get(confirm_email).post(confirm_email))
        .route("/refresh-token", post(refresh_token))
        .route("/password-forgot-email", get(password_forgot_email))
        .route("/password-reset", post(password_reset))
}
