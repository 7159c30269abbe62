use crate::{
    evaluation::{EvaluationFields, GradeCounts},
    fields::{FieldError, Fields},
    keys::{DcoKey, DegreeCourseKey, DegreeKey, EvaluationKey, SectionKey},
    term::{Semester, Term},
};
use serde::Serialize;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Names of the guarded mutations a caller can request.
///
/// Each variant parses from its snake_case name and from the action name the
/// legacy curriculum forms used.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display, AsRefStr, EnumIter,
)]
pub enum MutationKind {
    #[strum(serialize = "save_degree", to_string = "upsert_degree")]
    UpsertDegree,
    #[strum(serialize = "delete_degree")]
    DeleteDegree,
    #[strum(serialize = "save_course", to_string = "upsert_course")]
    UpsertCourse,
    #[strum(serialize = "delete_course")]
    DeleteCourse,
    #[strum(serialize = "save_instructor", to_string = "upsert_instructor")]
    UpsertInstructor,
    #[strum(serialize = "delete_instructor")]
    DeleteInstructor,
    #[strum(serialize = "save_semester", to_string = "upsert_semester")]
    UpsertSemester,
    #[strum(serialize = "delete_semester")]
    DeleteSemester,
    #[strum(serialize = "save_objective", to_string = "upsert_objective")]
    UpsertObjective,
    #[strum(serialize = "delete_objective")]
    DeleteObjective,
    #[strum(serialize = "assign_degree_course", to_string = "link_course_to_degree")]
    LinkCourseToDegree,
    #[strum(serialize = "remove_degree_course", to_string = "unlink_course_from_degree")]
    UnlinkCourseFromDegree,
    #[strum(serialize = "assign_dco", to_string = "link_objective_to_course")]
    LinkObjectiveToCourse,
    #[strum(serialize = "remove_dco", to_string = "unlink_objective_from_course")]
    UnlinkObjectiveFromCourse,
    #[strum(serialize = "add_section", to_string = "upsert_section")]
    UpsertSection,
    #[strum(serialize = "save_evaluation", to_string = "record_evaluation")]
    RecordEvaluation,
    #[strum(serialize = "copy_evaluation")]
    CopyEvaluation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegreeInput {
    pub key: DegreeKey,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseInput {
    pub course_no: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructorInput {
    pub instructor_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectiveInput {
    pub code: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseLink {
    pub key: DegreeCourseKey,
    pub is_core: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionInput {
    pub key: SectionKey,
    pub instructor_id: String,
    pub enrolled_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationInput {
    pub key: EvaluationKey,
    pub fields: EvaluationFields,
}

/// A fully parsed change to the curriculum graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Mutation {
    UpsertDegree(DegreeInput),
    DeleteDegree(DegreeKey),
    UpsertCourse(CourseInput),
    DeleteCourse { course_no: String },
    UpsertInstructor(InstructorInput),
    DeleteInstructor { instructor_id: String },
    UpsertSemester(Semester),
    DeleteSemester(Semester),
    UpsertObjective(ObjectiveInput),
    DeleteObjective { code: String },
    LinkCourseToDegree(CourseLink),
    UnlinkCourseFromDegree(DegreeCourseKey),
    LinkObjectiveToCourse(DcoKey),
    UnlinkObjectiveFromCourse(DcoKey),
    UpsertSection(SectionInput),
    RecordEvaluation(EvaluationInput),
    CopyEvaluation {
        source: EvaluationKey,
        destination: DegreeKey,
    },
}

impl Mutation {
    /// Parses a request made of an action name and its text fields
    pub fn parse(action: &str, fields: &Fields) -> Result<Self, FieldError> {
        let kind = MutationKind::from_str(action.trim()).map_err(|_| FieldError::UnknownAction {
            action: action.to_owned(),
        })?;

        Self::from_fields(kind, fields)
    }

    /// Applies the required-field contract of `kind` to `fields`
    pub fn from_fields(kind: MutationKind, fields: &Fields) -> Result<Self, FieldError> {
        let mutation = match kind {
            MutationKind::UpsertDegree => Self::UpsertDegree(DegreeInput {
                key: degree_key(fields)?,
                description: fields.optional("description"),
            }),
            MutationKind::DeleteDegree => Self::DeleteDegree(degree_key(fields)?),
            MutationKind::UpsertCourse => Self::UpsertCourse(CourseInput {
                course_no: fields.required("course_no")?,
                title: fields.required("title")?,
                description: fields.optional("description"),
            }),
            MutationKind::DeleteCourse => Self::DeleteCourse {
                course_no: fields.required("course_no")?,
            },
            MutationKind::UpsertInstructor => Self::UpsertInstructor(InstructorInput {
                instructor_id: fields.required("instructor_id")?,
                name: fields.required("name")?,
            }),
            MutationKind::DeleteInstructor => Self::DeleteInstructor {
                instructor_id: fields.required("instructor_id")?,
            },
            MutationKind::UpsertSemester => Self::UpsertSemester(semester(fields)?),
            MutationKind::DeleteSemester => Self::DeleteSemester(semester(fields)?),
            MutationKind::UpsertObjective => Self::UpsertObjective(ObjectiveInput {
                code: fields.required("code")?,
                title: fields.required("title")?,
                description: fields.optional("description"),
            }),
            MutationKind::DeleteObjective => Self::DeleteObjective {
                code: fields.required("code")?,
            },
            MutationKind::LinkCourseToDegree => Self::LinkCourseToDegree(CourseLink {
                key: degree_course_key(fields)?,
                is_core: fields.flag("is_core")?,
            }),
            MutationKind::UnlinkCourseFromDegree => {
                Self::UnlinkCourseFromDegree(degree_course_key(fields)?)
            }
            MutationKind::LinkObjectiveToCourse => Self::LinkObjectiveToCourse(dco_key(fields)?),
            MutationKind::UnlinkObjectiveFromCourse => {
                Self::UnlinkObjectiveFromCourse(dco_key(fields)?)
            }
            MutationKind::UpsertSection => Self::UpsertSection(SectionInput {
                key: section_key(fields)?,
                instructor_id: fields.required("instructor_id")?,
                enrolled_count: fields.required_count("enrolled_count")?,
            }),
            MutationKind::RecordEvaluation => Self::RecordEvaluation(EvaluationInput {
                key: evaluation_key(fields)?,
                fields: EvaluationFields {
                    method_label: fields.optional("method_label"),
                    counts: GradeCounts {
                        a: fields.optional_count("a_count")?,
                        b: fields.optional_count("b_count")?,
                        c: fields.optional_count("c_count")?,
                        f: fields.optional_count("f_count")?,
                    },
                    improvement_text: fields.optional("improvement_text"),
                },
            }),
            MutationKind::CopyEvaluation => Self::CopyEvaluation {
                source: evaluation_key(fields)?,
                destination: target_degree(fields)?,
            },
        };

        Ok(mutation)
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            Self::UpsertDegree(_) => MutationKind::UpsertDegree,
            Self::DeleteDegree(_) => MutationKind::DeleteDegree,
            Self::UpsertCourse(_) => MutationKind::UpsertCourse,
            Self::DeleteCourse { .. } => MutationKind::DeleteCourse,
            Self::UpsertInstructor(_) => MutationKind::UpsertInstructor,
            Self::DeleteInstructor { .. } => MutationKind::DeleteInstructor,
            Self::UpsertSemester(_) => MutationKind::UpsertSemester,
            Self::DeleteSemester(_) => MutationKind::DeleteSemester,
            Self::UpsertObjective(_) => MutationKind::UpsertObjective,
            Self::DeleteObjective { .. } => MutationKind::DeleteObjective,
            Self::LinkCourseToDegree(_) => MutationKind::LinkCourseToDegree,
            Self::UnlinkCourseFromDegree(_) => MutationKind::UnlinkCourseFromDegree,
            Self::LinkObjectiveToCourse(_) => MutationKind::LinkObjectiveToCourse,
            Self::UnlinkObjectiveFromCourse(_) => MutationKind::UnlinkObjectiveFromCourse,
            Self::UpsertSection(_) => MutationKind::UpsertSection,
            Self::RecordEvaluation(_) => MutationKind::RecordEvaluation,
            Self::CopyEvaluation { .. } => MutationKind::CopyEvaluation,
        }
    }

    /// The confirmation shown to the caller once the mutation commits
    pub fn success_message(&self) -> String {
        match self {
            Self::UpsertDegree(input) => format!("Degree saved for {}.", input.key),
            Self::DeleteDegree(key) => format!("Degree {key} deleted."),
            Self::UpsertCourse(input) => format!("Course {} saved.", input.course_no),
            Self::DeleteCourse { course_no } => format!("Course {course_no} deleted."),
            Self::UpsertInstructor(input) => format!("Instructor {} saved.", input.instructor_id),
            Self::DeleteInstructor { instructor_id } => {
                format!("Instructor {instructor_id} deleted.")
            }
            Self::UpsertSemester(semester) => {
                format!("Semester {} {} saved.", semester.year, semester.term)
            }
            Self::DeleteSemester(semester) => {
                format!("Semester {} {} deleted.", semester.year, semester.term)
            }
            Self::UpsertObjective(input) => format!("Objective {} saved.", input.code),
            Self::DeleteObjective { code } => format!("Objective {code} deleted."),
            Self::LinkCourseToDegree(_) => "Degree-course link saved.".to_owned(),
            Self::UnlinkCourseFromDegree(_) => "Degree-course link removed.".to_owned(),
            Self::LinkObjectiveToCourse(_) => "Objective linked to course.".to_owned(),
            Self::UnlinkObjectiveFromCourse(_) => "Objective removed from course.".to_owned(),
            Self::UpsertSection(_) => "Section saved.".to_owned(),
            Self::RecordEvaluation(_) => "Evaluation saved.".to_owned(),
            Self::CopyEvaluation { .. } => "Evaluation copied to the selected degree.".to_owned(),
        }
    }
}

fn degree_key(fields: &Fields) -> Result<DegreeKey, FieldError> {
    Ok(DegreeKey::new(
        fields.required("name")?,
        fields.required("level")?,
    ))
}

fn degree_course_key(fields: &Fields) -> Result<DegreeCourseKey, FieldError> {
    Ok(DegreeCourseKey::new(
        degree_key(fields)?,
        fields.required("course_no")?,
    ))
}

fn dco_key(fields: &Fields) -> Result<DcoKey, FieldError> {
    Ok(DcoKey::new(
        degree_course_key(fields)?,
        fields.required("objective_code")?,
    ))
}

fn semester(fields: &Fields) -> Result<Semester, FieldError> {
    Ok(Semester::new(fields.year("year")?, term(fields)?))
}

fn term(fields: &Fields) -> Result<Term, FieldError> {
    Term::parse_field("term", &fields.required("term")?)
}

fn section_key(fields: &Fields) -> Result<SectionKey, FieldError> {
    Ok(SectionKey::new(
        fields.required("course_no")?,
        fields.year("year")?,
        term(fields)?,
        fields.required("section_no")?,
    ))
}

fn evaluation_key(fields: &Fields) -> Result<EvaluationKey, FieldError> {
    Ok(EvaluationKey::new(
        section_key(fields)?,
        degree_key(fields)?,
        fields.required("objective_code")?,
    ))
}

/// The copy destination, given either as `target_name` + `target_level` or
/// as a single `target_degree` of the form `name|level`
fn target_degree(fields: &Fields) -> Result<DegreeKey, FieldError> {
    if let Some(reference) = fields.optional("target_degree") {
        let (name, level) = reference
            .split_once('|')
            .map(|(name, level)| (name.trim(), level.trim()))
            .filter(|(name, level)| !name.is_empty() && !level.is_empty())
            .ok_or_else(|| FieldError::InvalidDegreeRef {
                field: "target_degree",
                value: reference.clone(),
            })?;
        return Ok(DegreeKey::new(name, level));
    }

    Ok(DegreeKey::new(
        fields.required("target_name")?,
        fields.required("target_level")?,
    ))
}

#[cfg(test)]
mod test {
    use super::{Mutation, MutationKind};
    use crate::{
        fields::{FieldError, Fields},
        keys::DegreeKey,
        term::Term,
    };
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn evaluation_fields() -> Fields {
        Fields::new()
            .with("course_no", "CS101")
            .with("section_no", "01")
            .with("year", "2024")
            .with("term", "Fall")
            .with("name", "CS")
            .with("level", "BS")
            .with("objective_code", "O1")
    }

    #[test]
    fn test_every_kind_round_trips_its_name() {
        for kind in MutationKind::iter() {
            assert_eq!(MutationKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn test_legacy_action_names_are_accepted() {
        assert_eq!(
            MutationKind::from_str("assign_degree_course").unwrap(),
            MutationKind::LinkCourseToDegree
        );
        assert_eq!(
            MutationKind::from_str("remove_dco").unwrap(),
            MutationKind::UnlinkObjectiveFromCourse
        );
        assert_eq!(
            MutationKind::from_str("save_evaluation").unwrap(),
            MutationKind::RecordEvaluation
        );
        assert_eq!(
            MutationKind::RecordEvaluation.to_string(),
            "record_evaluation"
        );
    }

    #[test]
    fn test_unknown_action_is_a_validation_error() {
        let err = Mutation::parse("run_degree_query", &Fields::new()).unwrap_err();
        assert_eq!(
            err,
            FieldError::UnknownAction {
                action: "run_degree_query".to_owned()
            }
        );
    }

    #[test]
    fn test_upsert_degree_requires_name_and_level() {
        let fields = Fields::new().with("name", "CS");
        assert_eq!(
            Mutation::parse("upsert_degree", &fields),
            Err(FieldError::Missing { field: "level" })
        );

        let fields = fields.with("level", "BS").with("description", "  ");
        let Mutation::UpsertDegree(input) = Mutation::parse("upsert_degree", &fields).unwrap()
        else {
            panic!("expected an UpsertDegree");
        };
        assert_eq!(input.key, DegreeKey::new("CS", "BS"));
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_link_course_parses_core_flag() {
        let fields = Fields::new()
            .with("name", "CS")
            .with("level", "BS")
            .with("course_no", "CS101")
            .with("is_core", "on");

        let Mutation::LinkCourseToDegree(link) =
            Mutation::parse("link_course_to_degree", &fields).unwrap()
        else {
            panic!("expected a LinkCourseToDegree");
        };
        assert!(link.is_core);
        assert_eq!(link.key.course_no, "CS101");
    }

    #[test]
    fn test_section_rejects_negative_enrollment() {
        let fields = Fields::new()
            .with("course_no", "CS101")
            .with("year", "2024")
            .with("term", "fall")
            .with("section_no", "01")
            .with("instructor_id", "I1")
            .with("enrolled_count", "-3");

        assert_eq!(
            Mutation::parse("upsert_section", &fields),
            Err(FieldError::Negative {
                field: "enrolled_count",
                value: -3
            })
        );

        let fields = fields.with("enrolled_count", "30");
        let Mutation::UpsertSection(section) = Mutation::parse("upsert_section", &fields).unwrap()
        else {
            panic!("expected an UpsertSection");
        };
        assert_eq!(section.key.term, Term::Fall);
        assert_eq!(section.enrolled_count, 30);
    }

    #[test]
    fn test_record_evaluation_keeps_nulls_per_field() {
        let fields = evaluation_fields()
            .with("method_label", "Final exam")
            .with("a_count", "10")
            .with("c_count", "");

        let Mutation::RecordEvaluation(input) =
            Mutation::parse("record_evaluation", &fields).unwrap()
        else {
            panic!("expected a RecordEvaluation");
        };
        assert_eq!(input.fields.counts.a, Some(10));
        assert_eq!(input.fields.counts.b, None);
        assert_eq!(input.fields.counts.c, None);
        assert_eq!(input.fields.improvement_text, None);
        assert_eq!(input.key.dco().objective_code, "O1");
    }

    #[test]
    fn test_record_evaluation_requires_all_identifiers() {
        let mut fields = evaluation_fields();
        fields.insert("objective_code", "");

        assert_eq!(
            Mutation::parse("record_evaluation", &fields),
            Err(FieldError::Missing {
                field: "objective_code"
            })
        );
    }

    #[test]
    fn test_copy_destination_forms() {
        let fields = evaluation_fields().with("target_degree", "SE|BS");
        let Mutation::CopyEvaluation { destination, .. } =
            Mutation::parse("copy_evaluation", &fields).unwrap()
        else {
            panic!("expected a CopyEvaluation");
        };
        assert_eq!(destination, DegreeKey::new("SE", "BS"));

        let fields = evaluation_fields()
            .with("target_name", "SE")
            .with("target_level", "MS");
        let Mutation::CopyEvaluation { destination, .. } =
            Mutation::parse("copy_evaluation", &fields).unwrap()
        else {
            panic!("expected a CopyEvaluation");
        };
        assert_eq!(destination, DegreeKey::new("SE", "MS"));

        let fields = evaluation_fields().with("target_degree", "SE");
        assert!(matches!(
            Mutation::parse("copy_evaluation", &fields),
            Err(FieldError::InvalidDegreeRef { .. })
        ));
    }
}
