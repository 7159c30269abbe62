//! Admissibility checks for guarded mutations.
//!
//! Every read here is a locking read (`SELECT ... FOR UPDATE`) and must run on
//! the transaction that performs the write. Locks are always taken in the
//! order degree courses, degree-course objectives, sections, evaluations.

use crate::{
    entities::{degree_course_objectives, degree_courses, evaluations, sections},
    error::{MutationResult, Rule},
};
use models::{
    evaluation::GradeCounts,
    keys::{DcoKey, DegreeKey, SectionKey},
};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};

/// A degree's course links and objective links, locked for the rest of the
/// transaction
#[derive(Debug, Clone)]
pub struct DegreeCurriculum {
    pub degree: DegreeKey,
    pub courses: Vec<degree_courses::Model>,
    pub objectives: Vec<degree_course_objectives::Model>,
}

impl DegreeCurriculum {
    /// Loads and locks every DegreeCourse and DCO row of `degree`
    pub async fn lock<C: ConnectionTrait>(conn: &C, degree: &DegreeKey) -> Result<Self, DbErr> {
        let courses = degree_courses::Entity::find()
            .filter(degree_courses::Column::Name.eq(degree.name.as_str()))
            .filter(degree_courses::Column::Level.eq(degree.level.as_str()))
            .lock_exclusive()
            .all(conn)
            .await?;

        let objectives = degree_course_objectives::Entity::find()
            .filter(degree_course_objectives::Column::Name.eq(degree.name.as_str()))
            .filter(degree_course_objectives::Column::Level.eq(degree.level.as_str()))
            .lock_exclusive()
            .all(conn)
            .await?;

        Ok(Self {
            degree: degree.clone(),
            courses,
            objectives,
        })
    }

    pub fn course(&self, course_no: &str) -> Option<&degree_courses::Model> {
        self.courses.iter().find(|link| link.course_no == course_no)
    }

    pub fn is_core(&self, course_no: &str) -> bool {
        self.course(course_no).is_some_and(|link| link.is_core)
    }

    pub fn has_objective_link(&self, key: &DcoKey) -> bool {
        self.objectives
            .iter()
            .any(|link| link.course_no == key.course_no() && link.objective_code == key.objective_code)
    }

    fn objectives_of<'a>(
        &'a self,
        course_no: &'a str,
    ) -> impl Iterator<Item = &'a degree_course_objectives::Model> {
        self.objectives
            .iter()
            .filter(move |link| link.course_no == course_no)
    }

    fn core_courses_other_than(&self, course_no: &str) -> usize {
        self.courses
            .iter()
            .filter(|link| link.is_core && link.course_no != course_no)
            .count()
    }

    /// Courses other than `course_no` that still assess `objective_code`
    fn anchors_other_than(&self, course_no: &str, objective_code: &str) -> usize {
        self.objectives
            .iter()
            .filter(|link| link.objective_code == objective_code && link.course_no != course_no)
            .count()
    }

    /// A course may only become core once it assesses an objective
    pub fn check_promotion(&self, course_no: &str) -> Result<(), Rule> {
        if self.objectives_of(course_no).next().is_none() {
            return Err(Rule::CoreRequiresObjective);
        }
        Ok(())
    }

    /// Demoting a core course must leave the degree another core course
    pub fn check_demotion(&self, course_no: &str) -> Result<(), Rule> {
        if self.is_core(course_no) && self.core_courses_other_than(course_no) == 0 {
            return Err(Rule::LastCoreDemoted);
        }
        Ok(())
    }

    /// Unlinking a course must keep a core course. Its objective links go
    /// with it, so no objective is left without a course.
    pub fn check_course_removal(&self, course_no: &str) -> Result<(), Rule> {
        if self.is_core(course_no) && self.core_courses_other_than(course_no) == 0 {
            return Err(Rule::LastCoreRemoved);
        }
        Ok(())
    }

    /// Removing one DCO row: a core course keeps an objective, then the
    /// objective keeps a course. The first violated rule is reported.
    pub fn check_objective_removal(&self, key: &DcoKey) -> Result<(), Rule> {
        let course_no = key.course_no();

        if self.is_core(course_no) {
            let remaining = self
                .objectives_of(course_no)
                .filter(|link| link.objective_code != key.objective_code)
                .count();
            if remaining == 0 {
                return Err(Rule::CoreKeepsObjective);
            }
        }

        if self.anchors_other_than(course_no, &key.objective_code) == 0 {
            return Err(Rule::ObjectiveStaysAnchored);
        }

        Ok(())
    }
}

/// Loads and locks a section row
pub async fn lock_section<C: ConnectionTrait>(
    conn: &C,
    key: &SectionKey,
) -> Result<Option<sections::Model>, DbErr> {
    sections::Entity::find_by_id((
        key.course_no.clone(),
        key.year,
        key.term.as_str().to_owned(),
        key.section_no.clone(),
    ))
    .lock_exclusive()
    .one(conn)
    .await
}

/// Loads and locks every evaluation recorded against a section, across degrees
pub async fn lock_section_evaluations<C: ConnectionTrait>(
    conn: &C,
    key: &SectionKey,
) -> Result<Vec<evaluations::Model>, DbErr> {
    evaluations::Entity::find()
        .filter(evaluations::Column::CourseNo.eq(key.course_no.as_str()))
        .filter(evaluations::Column::Year.eq(key.year))
        .filter(evaluations::Column::Term.eq(key.term))
        .filter(evaluations::Column::SectionNo.eq(key.section_no.as_str()))
        .lock_exclusive()
        .all(conn)
        .await
}

/// Recorded grade counts may never exceed the section's enrollment
pub fn check_capacity(counts: &GradeCounts, enrolled_count: i32) -> Result<(), Rule> {
    match counts.recorded_total() {
        Some(total) if total > i64::from(enrolled_count) => Err(Rule::CountsExceedEnrollment),
        _ => Ok(()),
    }
}

/// A section's enrollment may not shrink below any evaluation already
/// recorded against it
pub fn check_enrollment_change(
    recorded: &[evaluations::Model],
    enrolled_count: i32,
) -> Result<(), Rule> {
    let exceeds = recorded
        .iter()
        .any(|evaluation| check_capacity(&evaluation.counts(), enrolled_count).is_err());

    if exceeds {
        return Err(Rule::EnrollmentBelowRecorded);
    }
    Ok(())
}

/// Fails with [`Rule::StillReferenced`] when `dependents` rows exist
pub fn check_unreferenced(
    entity: impl FnOnce() -> String,
    dependents: &'static str,
    count: u64,
) -> MutationResult<()> {
    if count > 0 {
        return Err(Rule::StillReferenced {
            entity: entity(),
            dependents,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{DegreeCurriculum, check_capacity};
    use crate::{
        entities::{degree_course_objectives, degree_courses},
        error::Rule,
    };
    use models::{
        evaluation::GradeCounts,
        keys::{DcoKey, DegreeCourseKey, DegreeKey},
    };

    fn curriculum(courses: &[(&str, bool)], objectives: &[(&str, &str)]) -> DegreeCurriculum {
        DegreeCurriculum {
            degree: DegreeKey::new("CS", "BS"),
            courses: courses
                .iter()
                .map(|&(course_no, is_core)| degree_courses::Model {
                    name: "CS".to_owned(),
                    level: "BS".to_owned(),
                    course_no: course_no.to_owned(),
                    is_core,
                })
                .collect(),
            objectives: objectives
                .iter()
                .map(|&(course_no, code)| degree_course_objectives::Model {
                    name: "CS".to_owned(),
                    level: "BS".to_owned(),
                    course_no: course_no.to_owned(),
                    objective_code: code.to_owned(),
                })
                .collect(),
        }
    }

    fn dco(course_no: &str, code: &str) -> DcoKey {
        DcoKey::new(
            DegreeCourseKey::new(DegreeKey::new("CS", "BS"), course_no),
            code,
        )
    }

    #[test]
    fn test_promotion_needs_an_objective() {
        let degree = curriculum(&[("CS101", true), ("CS201", false)], &[("CS101", "O1")]);

        assert_eq!(degree.check_promotion("CS101"), Ok(()));
        assert_eq!(
            degree.check_promotion("CS201"),
            Err(Rule::CoreRequiresObjective)
        );
    }

    #[test]
    fn test_last_core_is_kept() {
        let degree = curriculum(&[("CS101", true), ("CS201", false)], &[("CS101", "O1")]);

        assert_eq!(degree.check_demotion("CS101"), Err(Rule::LastCoreDemoted));
        assert_eq!(
            degree.check_course_removal("CS101"),
            Err(Rule::LastCoreRemoved)
        );
        assert_eq!(degree.check_course_removal("CS201"), Ok(()));

        let two_cores = curriculum(&[("CS101", true), ("CS201", true)], &[]);
        assert_eq!(two_cores.check_demotion("CS101"), Ok(()));
    }

    #[test]
    fn test_degree_without_core_courses_is_allowed() {
        let degree = curriculum(&[("CS101", false)], &[]);
        assert_eq!(degree.check_demotion("CS101"), Ok(()));
        assert_eq!(degree.check_course_removal("CS101"), Ok(()));
    }

    #[test]
    fn test_elective_carrying_the_only_link_can_be_removed() {
        let degree = curriculum(
            &[("CS101", true), ("CS201", false)],
            &[("CS101", "O1"), ("CS201", "O2")],
        );

        assert_eq!(degree.check_course_removal("CS201"), Ok(()));
        assert_eq!(
            degree.check_objective_removal(&dco("CS201", "O2")),
            Err(Rule::ObjectiveStaysAnchored)
        );
    }

    #[test]
    fn test_objective_removal_rule_order() {
        // CS101 is core with a single objective that CS201 also carries:
        // only the core rule fails.
        let degree = curriculum(
            &[("CS101", true), ("CS201", false)],
            &[("CS101", "O1"), ("CS201", "O1"), ("CS201", "O2")],
        );
        assert_eq!(
            degree.check_objective_removal(&dco("CS101", "O1")),
            Err(Rule::CoreKeepsObjective)
        );

        // O2 exists only on the elective CS201
        assert_eq!(
            degree.check_objective_removal(&dco("CS201", "O2")),
            Err(Rule::ObjectiveStaysAnchored)
        );
        assert_eq!(degree.check_objective_removal(&dco("CS201", "O1")), Ok(()));
    }

    #[test]
    fn test_objective_removal_reports_core_rule_first() {
        let degree = curriculum(&[("CS101", true)], &[("CS101", "O1")]);
        assert_eq!(
            degree.check_objective_removal(&dco("CS101", "O1")),
            Err(Rule::CoreKeepsObjective)
        );
    }

    #[test]
    fn test_capacity_counts_only_recorded_bands() {
        let counts = GradeCounts::new(Some(10), Some(10), Some(5), Some(10));
        assert_eq!(
            check_capacity(&counts, 30),
            Err(Rule::CountsExceedEnrollment)
        );

        let counts = GradeCounts::new(Some(10), Some(10), Some(5), Some(5));
        assert_eq!(check_capacity(&counts, 30), Ok(()));

        let counts = GradeCounts::new(Some(25), None, None, None);
        assert_eq!(check_capacity(&counts, 30), Ok(()));
        assert_eq!(check_capacity(&GradeCounts::default(), 0), Ok(()));
    }
}
