use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// One of `Validation`, `ConstraintViolation`, `NotFound` or `Store`
    pub kind: String,
    pub message: String,
}
