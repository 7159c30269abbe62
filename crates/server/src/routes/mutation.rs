use crate::{
    dtos::{
        error::ErrorResponse,
        mutation::{MutationResponse, fields_from_json},
    },
    error::ApiError,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;
use std::collections::HashMap;

/// Runs one guarded mutation in its own transaction.
///
/// `action` is a mutation name such as `upsert_course`,
/// `link_objective_to_course` or `record_evaluation`; the body carries its
/// named fields. A rejected mutation leaves the store unchanged.
#[utoipa::path(
    post,
    path = "/mutations/{action}",
    params(
        ("action" = String, Path, description = "Mutation name")
    ),
    request_body(content = HashMap<String, String>, description = "Field values keyed by name", content_type = "application/json"),
    responses(
        (status = 200, description = "Mutation committed", body = MutationResponse),
        (status = 400, description = "Malformed or missing fields", body = ErrorResponse),
        (status = 404, description = "A referenced row does not exist", body = ErrorResponse),
        (status = 409, description = "A curriculum rule rejected the change", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
        (status = 503, description = "Timed out and rolled back; safe to retry", body = ErrorResponse)
    ),
    tag = "Mutations"
)]
pub async fn submit_mutation(
    State(state): State<AppState>,
    Path(action): Path<String>,
    Json(body): Json<HashMap<String, Value>>,
) -> Result<Json<MutationResponse>, ApiError> {
    let fields = fields_from_json(body);
    let outcome = state.coordinator.submit(&action, &fields).await?;
    Ok(Json(outcome.into()))
}
