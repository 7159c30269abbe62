use crate::{
    entities::{
        courses, degree_course_objectives, degree_courses, degrees, evaluations, instructors,
        objectives, sections, semesters,
    },
    error::ReportError,
};
use futures::try_join;
use models::{
    evaluation::{
        EvaluationFields, EvaluationStatus, NonFTally, evaluation_status, non_f_ratio,
        section_status,
    },
    fields::FieldError,
    keys::{DegreeCourseKey, DegreeKey},
    term::{Semester, SemesterRange},
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// A section as listed in reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub course_no: String,
    pub section_no: String,
    pub semester: Semester,
    pub instructor_id: String,
    pub enrolled_count: i32,
}

impl SectionSummary {
    fn from_model(model: sections::Model) -> Option<Self> {
        let semester = model.semester()?;
        Some(Self {
            course_no: model.course_no,
            section_no: model.section_no,
            semester,
            instructor_id: model.instructor_id,
            enrolled_count: model.enrolled_count,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterCourse {
    pub course_no: String,
    pub title: String,
    pub is_core: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectiveSummary {
    pub code: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectiveCourse {
    pub course_no: String,
    pub objective_code: String,
}

/// Everything a reviewer needs to see about one degree's curriculum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegreeRoster {
    pub degree: DegreeKey,
    pub courses: Vec<RosterCourse>,
    pub objectives: Vec<ObjectiveSummary>,
    pub sections: Vec<SectionSummary>,
    /// Courses covering the objectives asked for, if any were
    pub objective_courses: Vec<ObjectiveCourse>,
}

/// One row of the degree-course editor: every course, with its link state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseLinkView {
    pub course_no: String,
    pub title: String,
    pub linked: bool,
    pub is_core: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRollup {
    pub course_no: String,
    pub section_no: String,
    pub title: String,
    pub total_rows: usize,
    pub complete_rows: usize,
    pub partial_rows: usize,
    pub improved_rows: usize,
    pub status: EvaluationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NonFRow {
    pub course_no: String,
    pub section_no: String,
    pub title: String,
    pub non_f: i64,
    pub total: i64,
    pub enrolled_count: i32,
    pub ratio: f64,
}

/// Which sections an instructor must assess, for one degree and semester
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorksheetFilter {
    pub degree: DegreeKey,
    pub semester: Semester,
    pub instructor_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorksheetRow {
    pub section: SectionSummary,
    pub course_title: String,
    pub objective_code: String,
    pub objective_title: String,
    pub evaluation: EvaluationFields,
    pub status: EvaluationStatus,
    /// Degrees that also assess this objective in this course, and can
    /// therefore receive a copy of the evaluation
    pub other_degrees: Vec<DegreeKey>,
}

/// Reference data for pickers and listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub degrees: Vec<degrees::Model>,
    pub courses: Vec<courses::Model>,
    pub instructors: Vec<instructors::Model>,
    pub semesters: Vec<Semester>,
    pub objectives: Vec<objectives::Model>,
}

/// Read-only queries. None of these open a transaction.
pub struct ReportService;

impl ReportService {
    pub async fn catalog(db: &DatabaseConnection) -> Result<Catalog, ReportError> {
        let (degrees, courses, instructors, semesters, objectives) = try_join!(
            degrees::Entity::find()
                .order_by_asc(degrees::Column::Name)
                .order_by_asc(degrees::Column::Level)
                .all(db),
            courses::Entity::find()
                .order_by_asc(courses::Column::CourseNo)
                .all(db),
            instructors::Entity::find()
                .order_by_asc(instructors::Column::Name)
                .all(db),
            semesters::Entity::find().all(db),
            objectives::Entity::find()
                .order_by_asc(objectives::Column::Code)
                .all(db),
        )?;

        let mut semesters: Vec<Semester> = semesters
            .iter()
            .filter_map(semesters::Model::semester)
            .collect();
        semesters.sort();

        Ok(Catalog {
            degrees,
            courses,
            instructors,
            semesters,
            objectives,
        })
    }

    /// Courses, objectives and sections of a degree, with sections limited to
    /// `range` and ordered by semester
    pub async fn degree_roster(
        db: &DatabaseConnection,
        degree: &DegreeKey,
        range: &SemesterRange,
        objective_codes: &[String],
    ) -> Result<DegreeRoster, ReportError> {
        let (links, dcos) = try_join!(
            degree_courses::Entity::find()
                .find_also_related(courses::Entity)
                .filter(degree_courses::Column::Name.eq(degree.name.as_str()))
                .filter(degree_courses::Column::Level.eq(degree.level.as_str()))
                .order_by_asc(degree_courses::Column::CourseNo)
                .all(db),
            degree_course_objectives::Entity::find()
                .filter(degree_course_objectives::Column::Name.eq(degree.name.as_str()))
                .filter(degree_course_objectives::Column::Level.eq(degree.level.as_str()))
                .order_by_asc(degree_course_objectives::Column::CourseNo)
                .order_by_asc(degree_course_objectives::Column::ObjectiveCode)
                .all(db),
        )?;

        if links.is_empty() {
            return Ok(DegreeRoster {
                degree: degree.clone(),
                courses: vec![],
                objectives: vec![],
                sections: vec![],
                objective_courses: vec![],
            });
        }

        let course_nos: Vec<String> = links.iter().map(|(link, _)| link.course_no.clone()).collect();
        let codes: BTreeSet<String> = dcos.iter().map(|dco| dco.objective_code.clone()).collect();

        let (objective_titles, sections) = try_join!(
            Self::objective_titles(db, codes.iter().cloned().collect()),
            sections::Entity::find()
                .filter(sections::Column::CourseNo.is_in(course_nos))
                .all(db),
        )?;

        let courses = links
            .into_iter()
            .map(|(link, course)| RosterCourse {
                title: course.map(|course| course.title).unwrap_or_default(),
                course_no: link.course_no,
                is_core: link.is_core,
            })
            .collect();

        let objectives = codes
            .into_iter()
            .map(|code| ObjectiveSummary {
                title: objective_titles.get(&code).cloned().unwrap_or_default(),
                code,
            })
            .collect();

        let mut sections = Self::in_range(sections, range);
        sections.sort_by(|a, b| {
            (a.semester, &a.course_no, &a.section_no).cmp(&(b.semester, &b.course_no, &b.section_no))
        });

        let objective_courses = dcos
            .into_iter()
            .filter(|dco| objective_codes.contains(&dco.objective_code))
            .map(|dco| ObjectiveCourse {
                course_no: dco.course_no,
                objective_code: dco.objective_code,
            })
            .collect();

        Ok(DegreeRoster {
            degree: degree.clone(),
            courses,
            objectives,
            sections,
            objective_courses,
        })
    }

    /// Every course, flagged with whether and how it is linked to `degree`
    pub async fn degree_course_view(
        db: &DatabaseConnection,
        degree: &DegreeKey,
    ) -> Result<Vec<CourseLinkView>, ReportError> {
        let (courses, links) = try_join!(
            courses::Entity::find()
                .order_by_asc(courses::Column::CourseNo)
                .all(db),
            degree_courses::Entity::find()
                .filter(degree_courses::Column::Name.eq(degree.name.as_str()))
                .filter(degree_courses::Column::Level.eq(degree.level.as_str()))
                .all(db),
        )?;

        let core_flags: HashMap<String, bool> = links
            .into_iter()
            .map(|link| (link.course_no, link.is_core))
            .collect();

        Ok(courses
            .into_iter()
            .map(|course| {
                let is_core = core_flags.get(&course.course_no).copied();
                CourseLinkView {
                    course_no: course.course_no,
                    title: course.title,
                    linked: is_core.is_some(),
                    is_core: is_core.unwrap_or(false),
                }
            })
            .collect())
    }

    /// Objectives assessed in one course of one degree
    pub async fn course_objectives(
        db: &DatabaseConnection,
        key: &DegreeCourseKey,
    ) -> Result<Vec<ObjectiveSummary>, ReportError> {
        let objectives = objectives::Entity::find()
            .inner_join(degree_course_objectives::Entity)
            .filter(degree_course_objectives::Column::Name.eq(key.degree.name.as_str()))
            .filter(degree_course_objectives::Column::Level.eq(key.degree.level.as_str()))
            .filter(degree_course_objectives::Column::CourseNo.eq(key.course_no.as_str()))
            .order_by_asc(objectives::Column::Code)
            .all(db)
            .await?;

        Ok(objectives
            .into_iter()
            .map(|objective| ObjectiveSummary {
                code: objective.code,
                title: objective.title,
            })
            .collect())
    }

    pub async fn course_sections(
        db: &DatabaseConnection,
        course_no: &str,
        range: &SemesterRange,
    ) -> Result<Vec<SectionSummary>, ReportError> {
        let sections = sections::Entity::find()
            .filter(sections::Column::CourseNo.eq(course_no))
            .all(db)
            .await?;

        let mut sections = Self::in_range(sections, range);
        sections.sort_by(|a, b| (a.semester, &a.section_no).cmp(&(b.semester, &b.section_no)));
        Ok(sections)
    }

    pub async fn instructor_sections(
        db: &DatabaseConnection,
        instructor_id: &str,
        range: &SemesterRange,
    ) -> Result<Vec<SectionSummary>, ReportError> {
        let sections = sections::Entity::find()
            .filter(sections::Column::InstructorId.eq(instructor_id))
            .all(db)
            .await?;

        let mut sections = Self::in_range(sections, range);
        sections.sort_by(|a, b| {
            (a.semester, &a.course_no, &a.section_no).cmp(&(b.semester, &b.course_no, &b.section_no))
        });
        Ok(sections)
    }

    /// Per-section evaluation progress for one semester
    pub async fn evaluation_rollup(
        db: &DatabaseConnection,
        semester: Semester,
    ) -> Result<Vec<SectionRollup>, ReportError> {
        let (sections, evaluations) = Self::semester_evaluations(db, semester).await?;
        let titles = Self::course_titles(db, course_nos(&sections)).await?;

        let mut by_section: HashMap<(String, String), Vec<EvaluationFields>> = HashMap::new();
        for evaluation in evaluations {
            by_section
                .entry((evaluation.course_no.clone(), evaluation.section_no.clone()))
                .or_default()
                .push(evaluation.fields());
        }

        Ok(sections
            .into_iter()
            .map(|section| {
                let rows = by_section
                    .remove(&(section.course_no.clone(), section.section_no.clone()))
                    .unwrap_or_default();

                let complete_rows = rows
                    .iter()
                    .filter(|row| evaluation_status(row) == EvaluationStatus::Complete)
                    .count();
                let improved_rows = rows
                    .iter()
                    .filter(|row| {
                        row.improvement_text
                            .as_deref()
                            .is_some_and(|text| !text.trim().is_empty())
                    })
                    .count();

                SectionRollup {
                    title: titles.get(&section.course_no).cloned().unwrap_or_default(),
                    total_rows: rows.len(),
                    complete_rows,
                    partial_rows: rows.len() - complete_rows,
                    improved_rows,
                    status: section_status(&rows),
                    course_no: section.course_no,
                    section_no: section.section_no,
                }
            })
            .collect())
    }

    /// Sections whose non-F ratio reaches `threshold`, skipping sections with
    /// nothing graded or with more graded students than enrolled
    pub async fn non_f_report(
        db: &DatabaseConnection,
        semester: Semester,
        threshold: f64,
    ) -> Result<Vec<NonFRow>, ReportError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(FieldError::OutOfRange {
                field: "threshold",
                value: threshold.to_string(),
            }
            .into());
        }

        let (sections, evaluations) = Self::semester_evaluations(db, semester).await?;
        let titles = Self::course_titles(db, course_nos(&sections)).await?;

        let mut by_section: HashMap<(String, String), Vec<_>> = HashMap::new();
        for evaluation in &evaluations {
            by_section
                .entry((evaluation.course_no.clone(), evaluation.section_no.clone()))
                .or_default()
                .push(evaluation.counts());
        }

        let mut rows = Vec::new();
        for section in sections {
            let Some(group) = by_section.get(&(section.course_no.clone(), section.section_no.clone()))
            else {
                continue;
            };

            let tally: NonFTally = non_f_ratio(group);
            let Some(ratio) = tally.ratio() else {
                continue;
            };
            if ratio < threshold || !tally.within_enrollment(section.enrolled_count) {
                continue;
            }

            rows.push(NonFRow {
                title: titles.get(&section.course_no).cloned().unwrap_or_default(),
                course_no: section.course_no,
                section_no: section.section_no,
                non_f: tally.non_f,
                total: tally.total,
                enrolled_count: section.enrolled_count,
                ratio,
            });
        }

        Ok(rows)
    }

    /// Every (section, objective) pair the instructor must assess for the
    /// filtered degree and semester, with its current evaluation if any
    pub async fn evaluation_worksheet(
        db: &DatabaseConnection,
        filter: &WorksheetFilter,
    ) -> Result<Vec<WorksheetRow>, ReportError> {
        let degree = &filter.degree;
        let sections = sections::Entity::find()
            .filter(sections::Column::Year.eq(filter.semester.year))
            .filter(sections::Column::Term.eq(filter.semester.term))
            .filter(sections::Column::InstructorId.eq(filter.instructor_id.as_str()))
            .order_by_asc(sections::Column::CourseNo)
            .order_by_asc(sections::Column::SectionNo)
            .all(db)
            .await?;

        if sections.is_empty() {
            return Ok(vec![]);
        }

        let course_nos = course_nos(&sections);

        let (dcos, evaluations) = try_join!(
            degree_course_objectives::Entity::find()
                .filter(degree_course_objectives::Column::CourseNo.is_in(course_nos.clone()))
                .order_by_asc(degree_course_objectives::Column::ObjectiveCode)
                .all(db),
            evaluations::Entity::find()
                .filter(evaluations::Column::Year.eq(filter.semester.year))
                .filter(evaluations::Column::Term.eq(filter.semester.term))
                .filter(evaluations::Column::Name.eq(degree.name.as_str()))
                .filter(evaluations::Column::Level.eq(degree.level.as_str()))
                .filter(evaluations::Column::CourseNo.is_in(course_nos.clone()))
                .all(db),
        )?;

        // Objectives this degree assesses per course, and the other degrees
        // that assess the same (course, objective)
        let mut assessed: HashMap<String, Vec<String>> = HashMap::new();
        let mut other_degrees: HashMap<(String, String), BTreeSet<DegreeKey>> = HashMap::new();
        for dco in dcos {
            if dco.name == degree.name && dco.level == degree.level {
                assessed
                    .entry(dco.course_no)
                    .or_default()
                    .push(dco.objective_code);
            } else {
                other_degrees
                    .entry((dco.course_no, dco.objective_code))
                    .or_default()
                    .insert(DegreeKey::new(dco.name, dco.level));
            }
        }

        let codes: Vec<String> = assessed
            .values()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let (course_titles, objective_titles) = try_join!(
            Self::course_titles(db, course_nos),
            Self::objective_titles(db, codes),
        )?;

        let recorded: HashMap<(String, String, String), EvaluationFields> = evaluations
            .into_iter()
            .map(|evaluation| {
                let fields = evaluation.fields();
                (
                    (
                        evaluation.course_no,
                        evaluation.section_no,
                        evaluation.objective_code,
                    ),
                    fields,
                )
            })
            .collect();

        let mut rows = Vec::new();
        for section in sections.into_iter().filter_map(SectionSummary::from_model) {
            let Some(codes) = assessed.get(&section.course_no) else {
                continue;
            };

            for code in codes {
                let evaluation = recorded
                    .get(&(
                        section.course_no.clone(),
                        section.section_no.clone(),
                        code.clone(),
                    ))
                    .cloned()
                    .unwrap_or_default();

                rows.push(WorksheetRow {
                    course_title: course_titles
                        .get(&section.course_no)
                        .cloned()
                        .unwrap_or_default(),
                    objective_code: code.clone(),
                    objective_title: objective_titles.get(code).cloned().unwrap_or_default(),
                    status: evaluation_status(&evaluation),
                    evaluation,
                    other_degrees: other_degrees
                        .get(&(section.course_no.clone(), code.clone()))
                        .map(|degrees| degrees.iter().cloned().collect())
                        .unwrap_or_default(),
                    section: section.clone(),
                });
            }
        }

        Ok(rows)
    }

    /// Sections of a semester in (course_no, section_no) order, with all of
    /// the semester's evaluations across degrees
    async fn semester_evaluations(
        db: &DatabaseConnection,
        semester: Semester,
    ) -> Result<(Vec<sections::Model>, Vec<evaluations::Model>), DbErr> {
        try_join!(
            sections::Entity::find()
                .filter(sections::Column::Year.eq(semester.year))
                .filter(sections::Column::Term.eq(semester.term))
                .order_by_asc(sections::Column::CourseNo)
                .order_by_asc(sections::Column::SectionNo)
                .all(db),
            evaluations::Entity::find()
                .filter(evaluations::Column::Year.eq(semester.year))
                .filter(evaluations::Column::Term.eq(semester.term))
                .all(db),
        )
    }

    async fn course_titles(
        db: &DatabaseConnection,
        course_nos: Vec<String>,
    ) -> Result<HashMap<String, String>, DbErr> {
        if course_nos.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(courses::Entity::find()
            .filter(courses::Column::CourseNo.is_in(course_nos))
            .all(db)
            .await?
            .into_iter()
            .map(|course| (course.course_no, course.title))
            .collect())
    }

    async fn objective_titles(
        db: &DatabaseConnection,
        codes: Vec<String>,
    ) -> Result<HashMap<String, String>, DbErr> {
        if codes.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(objectives::Entity::find()
            .filter(objectives::Column::Code.is_in(codes))
            .all(db)
            .await?
            .into_iter()
            .map(|objective| (objective.code, objective.title))
            .collect())
    }

    fn in_range(sections: Vec<sections::Model>, range: &SemesterRange) -> Vec<SectionSummary> {
        sections
            .into_iter()
            .filter_map(SectionSummary::from_model)
            .filter(|section| range.contains(section.semester))
            .collect()
    }
}

/// Distinct course numbers of `sections`
fn course_nos(sections: &[sections::Model]) -> Vec<String> {
    sections
        .iter()
        .map(|section| section.course_no.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
