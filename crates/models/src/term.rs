use crate::fields::FieldError;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::{Display as FmtDisplay, Formatter, Result as FmtResult},
    str::FromStr,
};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

#[cfg(feature = "database")]
use sea_orm::Value;

/// The academic term of a semester.
///
/// Variants are declared in calendar order, so the derived `Ord` matches the
/// term rank used when sorting semesters.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
    Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Term {
    Spring,
    Summer,
    Fall,
}

impl Term {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Rank within a year: Spring=1, Summer=2, Fall=3
    pub fn rank(self) -> u8 {
        match self {
            Self::Spring => 1,
            Self::Summer => 2,
            Self::Fall => 3,
        }
    }

    pub fn all() -> Vec<Term> {
        Term::iter().collect()
    }

    /// Parses a term, reporting the offending field on failure
    pub fn parse_field(field: &'static str, value: &str) -> Result<Self, FieldError> {
        Term::from_str(value.trim()).map_err(|_| FieldError::InvalidTerm {
            field,
            value: value.to_owned(),
        })
    }
}

#[cfg(feature = "database")]
impl From<Term> for Value {
    fn from(term: Term) -> Self {
        Value::String(Some(Box::new(term.as_str().to_owned())))
    }
}

/// A (year, term) pair, ordered by year then term rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Semester {
    pub year: i32,
    pub term: Term,
}

impl Semester {
    pub fn new(year: i32, term: Term) -> Self {
        Self { year, term }
    }
}

impl PartialOrd for Semester {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Semester {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| self.term.rank().cmp(&other.term.rank()))
    }
}

/// Parses labels of the form `2024-Fall`
impl FromStr for Semester {
    type Err = FieldError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let invalid = || FieldError::InvalidSemester {
            value: label.to_owned(),
        };

        let (year, term) = label.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.trim().parse::<i32>().map_err(|_| invalid())?;
        let term = Term::from_str(term.trim()).map_err(|_| invalid())?;

        Ok(Semester { year, term })
    }
}

impl FmtDisplay for Semester {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}-{}", self.year, self.term)
    }
}

/// An inclusive semester range; a missing bound is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterRange {
    pub start: Option<Semester>,
    pub end: Option<Semester>,
}

impl SemesterRange {
    pub fn new(start: Option<Semester>, end: Option<Semester>) -> Self {
        Self { start, end }
    }

    /// Builds a range from optional `YEAR-Term` labels, treating blank labels as open
    pub fn from_labels(start: Option<&str>, end: Option<&str>) -> Result<Self, FieldError> {
        let parse = |label: Option<&str>| -> Result<Option<Semester>, FieldError> {
            match label.map(str::trim) {
                None | Some("") => Ok(None),
                Some(label) => label.parse().map(Some),
            }
        };

        Ok(Self {
            start: parse(start)?,
            end: parse(end)?,
        })
    }

    pub fn contains(&self, semester: Semester) -> bool {
        self.start.is_none_or(|start| start <= semester)
            && self.end.is_none_or(|end| semester <= end)
    }
}
