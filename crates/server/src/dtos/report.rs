use database::services::report::{
    Catalog, CourseLinkView, DegreeRoster, NonFRow, ObjectiveCourse, ObjectiveSummary,
    RosterCourse, SectionRollup, SectionSummary, WorksheetRow,
};
use models::{
    fields::FieldError,
    keys::DegreeKey,
    term::{Semester, SemesterRange, Term},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct DegreeRef {
    pub name: String,
    pub level: String,
}

impl From<DegreeKey> for DegreeRef {
    fn from(key: DegreeKey) -> Self {
        Self {
            name: key.name,
            level: key.level,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SectionResponse {
    pub course_no: String,
    pub section_no: String,
    /// `YEAR-Term`, e.g. `2024-Fall`
    pub semester: String,
    pub instructor_id: String,
    pub enrolled_count: i32,
}

impl From<SectionSummary> for SectionResponse {
    fn from(section: SectionSummary) -> Self {
        Self {
            course_no: section.course_no,
            section_no: section.section_no,
            semester: section.semester.to_string(),
            instructor_id: section.instructor_id,
            enrolled_count: section.enrolled_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RosterCourseResponse {
    pub course_no: String,
    pub title: String,
    pub is_core: bool,
}

impl From<RosterCourse> for RosterCourseResponse {
    fn from(course: RosterCourse) -> Self {
        Self {
            course_no: course.course_no,
            title: course.title,
            is_core: course.is_core,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ObjectiveResponse {
    pub code: String,
    pub title: String,
}

impl From<ObjectiveSummary> for ObjectiveResponse {
    fn from(objective: ObjectiveSummary) -> Self {
        Self {
            code: objective.code,
            title: objective.title,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ObjectiveCourseResponse {
    pub course_no: String,
    pub objective_code: String,
}

impl From<ObjectiveCourse> for ObjectiveCourseResponse {
    fn from(row: ObjectiveCourse) -> Self {
        Self {
            course_no: row.course_no,
            objective_code: row.objective_code,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DegreeRosterResponse {
    pub degree: DegreeRef,
    pub courses: Vec<RosterCourseResponse>,
    pub objectives: Vec<ObjectiveResponse>,
    pub sections: Vec<SectionResponse>,
    pub objective_courses: Vec<ObjectiveCourseResponse>,
}

impl From<DegreeRoster> for DegreeRosterResponse {
    fn from(roster: DegreeRoster) -> Self {
        Self {
            degree: roster.degree.into(),
            courses: roster.courses.into_iter().map(Into::into).collect(),
            objectives: roster.objectives.into_iter().map(Into::into).collect(),
            sections: roster.sections.into_iter().map(Into::into).collect(),
            objective_courses: roster
                .objective_courses
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseLinkResponse {
    pub course_no: String,
    pub title: String,
    pub linked: bool,
    pub is_core: bool,
}

impl From<CourseLinkView> for CourseLinkResponse {
    fn from(view: CourseLinkView) -> Self {
        Self {
            course_no: view.course_no,
            title: view.title,
            linked: view.linked,
            is_core: view.is_core,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SectionRollupResponse {
    pub course_no: String,
    pub section_no: String,
    pub title: String,
    pub total_rows: usize,
    pub complete_rows: usize,
    pub partial_rows: usize,
    pub improved_rows: usize,
    /// `No Evaluation`, `Partial` or `Complete`
    pub status: String,
}

impl From<SectionRollup> for SectionRollupResponse {
    fn from(rollup: SectionRollup) -> Self {
        Self {
            course_no: rollup.course_no,
            section_no: rollup.section_no,
            title: rollup.title,
            total_rows: rollup.total_rows,
            complete_rows: rollup.complete_rows,
            partial_rows: rollup.partial_rows,
            improved_rows: rollup.improved_rows,
            status: rollup.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NonFResponse {
    pub course_no: String,
    pub section_no: String,
    pub title: String,
    pub non_f: i64,
    pub total: i64,
    pub enrolled_count: i32,
    pub ratio: f64,
}

impl From<NonFRow> for NonFResponse {
    fn from(row: NonFRow) -> Self {
        Self {
            course_no: row.course_no,
            section_no: row.section_no,
            title: row.title,
            non_f: row.non_f,
            total: row.total,
            enrolled_count: row.enrolled_count,
            ratio: row.ratio,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorksheetRowResponse {
    pub section: SectionResponse,
    pub course_title: String,
    pub objective_code: String,
    pub objective_title: String,
    pub method_label: Option<String>,
    pub a_count: Option<i32>,
    pub b_count: Option<i32>,
    pub c_count: Option<i32>,
    pub f_count: Option<i32>,
    pub improvement_text: Option<String>,
    pub status: String,
    /// Degrees this evaluation can be copied to
    pub other_degrees: Vec<DegreeRef>,
}

impl From<WorksheetRow> for WorksheetRowResponse {
    fn from(row: WorksheetRow) -> Self {
        let counts = row.evaluation.counts;
        Self {
            section: row.section.into(),
            course_title: row.course_title,
            objective_code: row.objective_code,
            objective_title: row.objective_title,
            method_label: row.evaluation.method_label,
            a_count: counts.a,
            b_count: counts.b,
            c_count: counts.c,
            f_count: counts.f,
            improvement_text: row.evaluation.improvement_text,
            status: row.status.to_string(),
            other_degrees: row.other_degrees.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NamedResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    pub degrees: Vec<NamedResponse>,
    pub courses: Vec<NamedResponse>,
    pub instructors: Vec<NamedResponse>,
    pub objectives: Vec<NamedResponse>,
    pub semesters: Vec<String>,
}

impl From<Catalog> for CatalogResponse {
    fn from(catalog: Catalog) -> Self {
        Self {
            degrees: catalog
                .degrees
                .into_iter()
                .map(|degree| NamedResponse {
                    id: format!("{}|{}", degree.name, degree.level),
                    name: DegreeKey::new(degree.name, degree.level).to_string(),
                    description: degree.description,
                })
                .collect(),
            courses: catalog
                .courses
                .into_iter()
                .map(|course| NamedResponse {
                    id: course.course_no,
                    name: course.title,
                    description: course.description,
                })
                .collect(),
            instructors: catalog
                .instructors
                .into_iter()
                .map(|instructor| NamedResponse {
                    id: instructor.instructor_id,
                    name: instructor.name,
                    description: None,
                })
                .collect(),
            objectives: catalog
                .objectives
                .into_iter()
                .map(|objective| NamedResponse {
                    id: objective.code,
                    name: objective.title,
                    description: objective.description,
                })
                .collect(),
            semesters: catalog
                .semesters
                .iter()
                .map(Semester::to_string)
                .collect(),
        }
    }
}

/// Inclusive `YEAR-Term` bounds; either end may be left open
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct RangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeParams {
    pub fn range(&self) -> Result<SemesterRange, FieldError> {
        SemesterRange::from_labels(self.start.as_deref(), self.end.as_deref())
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct RosterParams {
    pub start: Option<String>,
    pub end: Option<String>,
    /// Comma-separated objective codes whose covering courses to list
    pub objectives: Option<String>,
}

impl RosterParams {
    pub fn range(&self) -> Result<SemesterRange, FieldError> {
        SemesterRange::from_labels(self.start.as_deref(), self.end.as_deref())
    }

    pub fn objective_codes(&self) -> Vec<String> {
        self.objectives
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct SemesterParams {
    pub year: i32,
    /// Spring, Summer or Fall
    pub term: String,
}

impl SemesterParams {
    pub fn semester(&self) -> Result<Semester, FieldError> {
        Ok(Semester::new(self.year, Term::parse_field("term", &self.term)?))
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct NonFParams {
    pub year: i32,
    pub term: String,
    /// Minimum non-F ratio, between 0 and 1
    #[serde(default)]
    pub threshold: f64,
}

impl NonFParams {
    pub fn semester(&self) -> Result<Semester, FieldError> {
        Ok(Semester::new(self.year, Term::parse_field("term", &self.term)?))
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct WorksheetParams {
    pub name: String,
    pub level: String,
    pub year: i32,
    pub term: String,
    pub instructor_id: String,
}
