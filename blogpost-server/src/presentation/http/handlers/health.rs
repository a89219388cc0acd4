use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::presentation::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthzResponse {
    pub(crate) status: &'static str,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Service and database are reachable", body = HealthzResponse),
        (status = 503, description = "Database is unreachable", body = HealthzResponse)
    )
)]
pub(crate) async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthzResponse>) {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (StatusCode::OK, Json(HealthzResponse { status: "ok" })),
        Err(err) => {
            warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthzResponse {
                    status: "unavailable",
                }),
            )
        }
    }
}
