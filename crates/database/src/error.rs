//! Error types for guarded mutations and read-only reports.

use models::{
    fields::FieldError,
    keys::{DcoKey, DegreeCourseKey, DegreeKey, EvaluationKey, SectionKey},
    term::Semester,
};
use sea_orm::DbErr;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// The failure category a caller can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Validation,
    ConstraintViolation,
    NotFound,
    Store,
}

/// A business rule that rejected a mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rule {
    #[error("Add at least one objective before marking the course as core.")]
    CoreRequiresObjective,

    #[error("Each degree must keep at least one core course.")]
    LastCoreDemoted,

    #[error("Cannot remove the last core course from a degree.")]
    LastCoreRemoved,

    #[error("Each objective must remain tied to at least one course for the degree.")]
    ObjectiveStaysAnchored,

    #[error("Core courses must keep at least one objective.")]
    CoreKeepsObjective,

    #[error("Counts cannot exceed the enrolled total.")]
    CountsExceedEnrollment,

    #[error("Enrolled count cannot drop below counts already recorded for this section.")]
    EnrollmentBelowRecorded,

    #[error("Destination degree does not own this objective.")]
    DestinationLacksObjective,

    #[error("{entity} is still referenced by {dependents}.")]
    StillReferenced {
        entity: String,
        dependents: &'static str,
    },
}

/// A referenced row that does not exist
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Missing {
    #[error("Degree {0} not found.")]
    Degree(DegreeKey),

    #[error("Course {0} not found.")]
    Course(String),

    #[error("Instructor {0} not found.")]
    Instructor(String),

    #[error("Objective {0} not found.")]
    Objective(String),

    #[error("Semester {0} not found.")]
    Semester(Semester),

    #[error("Course {0} is not part of that degree.")]
    DegreeCourse(DegreeCourseKey),

    #[error("Objective {0} is not linked.")]
    DegreeCourseObjective(DcoKey),

    #[error("Section not found.")]
    Section(SectionKey),

    #[error("No evaluation exists to copy.")]
    Evaluation(EvaluationKey),
}

/// Why a guarded mutation was rejected; the store is unchanged in every case
#[derive(Debug, Error)]
pub enum MutationError {
    #[error(transparent)]
    Validation(#[from] FieldError),

    #[error(transparent)]
    ConstraintViolation(#[from] Rule),

    #[error(transparent)]
    NotFound(#[from] Missing),

    /// The evaluation's objective is not linked to its degree and course
    #[error("Objective is not valid for this degree/course.")]
    InvalidObjective(DcoKey),

    #[error("Database error: {0}")]
    Store(#[from] DbErr),

    #[error("Mutation timed out after {0:?} and was rolled back.")]
    Timeout(Duration),
}

impl MutationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            Self::NotFound(_) | Self::InvalidObjective(_) => ErrorKind::NotFound,
            Self::Store(_) | Self::Timeout(_) => ErrorKind::Store,
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Store(DbErr::ConnectionAcquire(_) | DbErr::Conn(_))
        )
    }

    pub fn rule(&self) -> Option<&Rule> {
        match self {
            Self::ConstraintViolation(rule) => Some(rule),
            _ => None,
        }
    }
}

/// Result type for guarded mutations.
pub type MutationResult<T> = Result<T, MutationError>;

/// Errors from the read-only report queries
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    InvalidFilter(#[from] FieldError),

    #[error("Database error: {0}")]
    Store(#[from] DbErr),
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFilter(_) => ErrorKind::Validation,
            Self::Store(_) => ErrorKind::Store,
        }
    }
}
