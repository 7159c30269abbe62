//! Primary keys of the curriculum entities.
//!
//! Keys are plain owned values so they can be logged, compared, and moved into
//! queries without borrowing from a request.

use crate::term::{Semester, Term};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A degree program, identified by name and level (e.g. "CS", "BS")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DegreeKey {
    pub name: String,
    pub level: String,
}

impl DegreeKey {
    pub fn new(name: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: level.into(),
        }
    }
}

impl Display for DegreeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({})", self.name, self.level)
    }
}

/// A course placed in a degree's curriculum
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DegreeCourseKey {
    pub degree: DegreeKey,
    pub course_no: String,
}

impl DegreeCourseKey {
    pub fn new(degree: DegreeKey, course_no: impl Into<String>) -> Self {
        Self {
            degree,
            course_no: course_no.into(),
        }
    }
}

impl Display for DegreeCourseKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} in {}", self.course_no, self.degree)
    }
}

/// An objective assessed within a specific degree-course pairing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DcoKey {
    pub degree_course: DegreeCourseKey,
    pub objective_code: String,
}

impl DcoKey {
    pub fn new(degree_course: DegreeCourseKey, objective_code: impl Into<String>) -> Self {
        Self {
            degree_course,
            objective_code: objective_code.into(),
        }
    }

    pub fn degree(&self) -> &DegreeKey {
        &self.degree_course.degree
    }

    pub fn course_no(&self) -> &str {
        &self.degree_course.course_no
    }
}

impl Display for DcoKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} for {}", self.objective_code, self.degree_course)
    }
}

/// A taught offering of a course
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionKey {
    pub course_no: String,
    pub year: i32,
    pub term: Term,
    pub section_no: String,
}

impl SectionKey {
    pub fn new(
        course_no: impl Into<String>,
        year: i32,
        term: Term,
        section_no: impl Into<String>,
    ) -> Self {
        Self {
            course_no: course_no.into(),
            year,
            term,
            section_no: section_no.into(),
        }
    }

    pub fn semester(&self) -> Semester {
        Semester::new(self.year, self.term)
    }
}

impl Display for SectionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}-{} {}", self.course_no, self.section_no, self.semester())
    }
}

/// One section's measurement against one degree-scoped objective
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationKey {
    pub section: SectionKey,
    pub degree: DegreeKey,
    pub objective_code: String,
}

impl EvaluationKey {
    pub fn new(section: SectionKey, degree: DegreeKey, objective_code: impl Into<String>) -> Self {
        Self {
            section,
            degree,
            objective_code: objective_code.into(),
        }
    }

    /// The DCO row this evaluation must reference
    pub fn dco(&self) -> DcoKey {
        DcoKey::new(
            DegreeCourseKey::new(self.degree.clone(), self.section.course_no.clone()),
            self.objective_code.clone(),
        )
    }

    /// The same measurement re-keyed to another degree
    pub fn for_degree(&self, degree: DegreeKey) -> Self {
        Self {
            degree,
            ..self.clone()
        }
    }
}

impl Display for EvaluationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} / {} / {}",
            self.section, self.degree, self.objective_code
        )
    }
}
