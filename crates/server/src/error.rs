use crate::dtos::error::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::error::{ErrorKind, MutationError, ReportError};
use log::error;
use models::fields::FieldError;

/// A failed request, rendered as `{ "kind": ..., "message": ... }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    fn new(kind: ErrorKind, message: String) -> Self {
        Self {
            status: status_for(kind),
            kind,
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ConstraintViolation => StatusCode::CONFLICT,
        ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<MutationError> for ApiError {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::Timeout(_) => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                kind: ErrorKind::Store,
                message: err.to_string(),
            },
            MutationError::Store(db_err) => {
                error!("Mutation failed in the store: {db_err}");
                Self::new(ErrorKind::Store, "Internal server error".to_owned())
            }
            err => Self::new(err.kind(), err.to_string()),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Store(db_err) => {
                error!("Report query failed: {db_err}");
                Self::new(ErrorKind::Store, "Internal server error".to_owned())
            }
            err => Self::new(err.kind(), err.to_string()),
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        Self::new(ErrorKind::Validation, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            kind: format!("{:?}", self.kind),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
