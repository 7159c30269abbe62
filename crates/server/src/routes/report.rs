use crate::{
    dtos::{
        error::ErrorResponse,
        report::{
            CatalogResponse, CourseLinkResponse, DegreeRosterResponse, NonFParams, NonFResponse,
            ObjectiveResponse, RangeParams, RosterParams, SectionResponse, SectionRollupResponse,
            SemesterParams, WorksheetParams, WorksheetRowResponse,
        },
    },
    error::ApiError,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use database::services::report::{ReportService, WorksheetFilter};
use models::{
    keys::{DegreeCourseKey, DegreeKey},
    term::{Semester, Term},
};

/// Degrees, courses, instructors, objectives and semesters
#[utoipa::path(
    get,
    path = "/catalog",
    responses(
        (status = 200, description = "Reference data", body = CatalogResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_catalog(State(state): State<AppState>) -> Result<Json<CatalogResponse>, ApiError> {
    let catalog = ReportService::catalog(&state.db).await?;
    Ok(Json(catalog.into()))
}

/// Courses, objectives and sections of one degree
#[utoipa::path(
    get,
    path = "/degrees/{name}/{level}/roster",
    params(
        ("name" = String, Path, description = "Degree name"),
        ("level" = String, Path, description = "Degree level"),
        RosterParams
    ),
    responses(
        (status = 200, description = "Degree roster", body = DegreeRosterResponse),
        (status = 400, description = "Invalid semester bounds", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_degree_roster(
    State(state): State<AppState>,
    Path((name, level)): Path<(String, String)>,
    Query(params): Query<RosterParams>,
) -> Result<Json<DegreeRosterResponse>, ApiError> {
    let range = params.range()?;
    let degree = DegreeKey::new(name, level);
    let roster =
        ReportService::degree_roster(&state.db, &degree, &range, &params.objective_codes())
            .await?;
    Ok(Json(roster.into()))
}

/// Every course, flagged with whether the degree links it and as core
#[utoipa::path(
    get,
    path = "/degrees/{name}/{level}/courses",
    params(
        ("name" = String, Path, description = "Degree name"),
        ("level" = String, Path, description = "Degree level")
    ),
    responses(
        (status = 200, description = "Course link state", body = [CourseLinkResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_degree_courses(
    State(state): State<AppState>,
    Path((name, level)): Path<(String, String)>,
) -> Result<Json<Vec<CourseLinkResponse>>, ApiError> {
    let degree = DegreeKey::new(name, level);
    let view = ReportService::degree_course_view(&state.db, &degree).await?;
    Ok(Json(view.into_iter().map(Into::into).collect()))
}

/// Objectives linked to a course within a degree
#[utoipa::path(
    get,
    path = "/degrees/{name}/{level}/courses/{course_no}/objectives",
    params(
        ("name" = String, Path, description = "Degree name"),
        ("level" = String, Path, description = "Degree level"),
        ("course_no" = String, Path, description = "Course number")
    ),
    responses(
        (status = 200, description = "Linked objectives", body = [ObjectiveResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_course_objectives(
    State(state): State<AppState>,
    Path((name, level, course_no)): Path<(String, String, String)>,
) -> Result<Json<Vec<ObjectiveResponse>>, ApiError> {
    let key = DegreeCourseKey::new(DegreeKey::new(name, level), course_no);
    let objectives = ReportService::course_objectives(&state.db, &key).await?;
    Ok(Json(objectives.into_iter().map(Into::into).collect()))
}

/// Sections of a course within a semester range
#[utoipa::path(
    get,
    path = "/courses/{course_no}/sections",
    params(
        ("course_no" = String, Path, description = "Course number"),
        RangeParams
    ),
    responses(
        (status = 200, description = "Sections ordered by semester", body = [SectionResponse]),
        (status = 400, description = "Invalid semester bounds", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_course_sections(
    State(state): State<AppState>,
    Path(course_no): Path<String>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<SectionResponse>>, ApiError> {
    let sections = ReportService::course_sections(&state.db, &course_no, &params.range()?).await?;
    Ok(Json(sections.into_iter().map(Into::into).collect()))
}

/// Sections taught by an instructor within a semester range
#[utoipa::path(
    get,
    path = "/instructors/{instructor_id}/sections",
    params(
        ("instructor_id" = String, Path, description = "Instructor ID"),
        RangeParams
    ),
    responses(
        (status = 200, description = "Sections ordered by semester", body = [SectionResponse]),
        (status = 400, description = "Invalid semester bounds", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_instructor_sections(
    State(state): State<AppState>,
    Path(instructor_id): Path<String>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<SectionResponse>>, ApiError> {
    let sections =
        ReportService::instructor_sections(&state.db, &instructor_id, &params.range()?).await?;
    Ok(Json(sections.into_iter().map(Into::into).collect()))
}

/// Evaluation status of every section in a semester
#[utoipa::path(
    get,
    path = "/reports/evaluation-status",
    params(SemesterParams),
    responses(
        (status = 200, description = "Per-section rollup", body = [SectionRollupResponse]),
        (status = 400, description = "Invalid term", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_evaluation_rollup(
    State(state): State<AppState>,
    Query(params): Query<SemesterParams>,
) -> Result<Json<Vec<SectionRollupResponse>>, ApiError> {
    let rollup = ReportService::evaluation_rollup(&state.db, params.semester()?).await?;
    Ok(Json(rollup.into_iter().map(Into::into).collect()))
}

/// Sections whose non-F ratio meets a threshold
#[utoipa::path(
    get,
    path = "/reports/non-f",
    params(NonFParams),
    responses(
        (status = 200, description = "Sections at or above the threshold", body = [NonFResponse]),
        (status = 400, description = "Invalid term or threshold", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_non_f_report(
    State(state): State<AppState>,
    Query(params): Query<NonFParams>,
) -> Result<Json<Vec<NonFResponse>>, ApiError> {
    let rows =
        ReportService::non_f_report(&state.db, params.semester()?, params.threshold).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// The (section, objective) pairs an instructor must assess for a degree
#[utoipa::path(
    get,
    path = "/reports/worksheet",
    params(WorksheetParams),
    responses(
        (status = 200, description = "Worksheet rows", body = [WorksheetRowResponse]),
        (status = 400, description = "Invalid term", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_worksheet(
    State(state): State<AppState>,
    Query(params): Query<WorksheetParams>,
) -> Result<Json<Vec<WorksheetRowResponse>>, ApiError> {
    let filter = WorksheetFilter {
        degree: DegreeKey::new(params.name, params.level),
        semester: Semester::new(params.year, Term::parse_field("term", &params.term)?),
        instructor_id: params.instructor_id,
    };
    let rows = ReportService::evaluation_worksheet(&state.db, &filter).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
