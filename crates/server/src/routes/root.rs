use axum::http::StatusCode;

/// Names the service; see `/swagger-ui` for the full API
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", content_type = "text/plain", body = String)
    ),
    tag = "Health"
)]
pub async fn root() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Curriculum ledger API")
}
