use crate::{error::ApiError, state::AppState};
use axum::{extract::State, http::StatusCode};
use database::error::ReportError;

/// Returns "OK" when the service can reach its database
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", content_type = "text/plain", body = String),
        (status = 500, description = "Database unreachable", body = crate::dtos::error::ErrorResponse)
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> Result<(StatusCode, &'static str), ApiError> {
    state.db.ping().await.map_err(ReportError::from)?;
    Ok((StatusCode::OK, "OK"))
}
