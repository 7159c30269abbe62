use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// Why a submitted field was rejected
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum FieldError {
    Missing { field: &'static str },
    NotANumber { field: &'static str, value: String },
    Negative { field: &'static str, value: i64 },
    OutOfRange { field: &'static str, value: String },
    InvalidTerm { field: &'static str, value: String },
    InvalidSemester { value: String },
    InvalidFlag { field: &'static str, value: String },
    InvalidDegreeRef { field: &'static str, value: String },
    UnknownAction { action: String },
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Missing { field } => write!(f, "Field `{field}` is required."),
            Self::NotANumber { field, value } => {
                write!(f, "Field `{field}` must be a whole number, got `{value}`.")
            }
            Self::Negative { field, value } => {
                write!(f, "Field `{field}` must be non-negative, got {value}.")
            }
            Self::OutOfRange { field, value } => {
                write!(f, "Field `{field}` is out of range: `{value}`.")
            }
            Self::InvalidTerm { field, value } => write!(
                f,
                "Field `{field}` must be Spring, Summer, or Fall, got `{value}`."
            ),
            Self::InvalidSemester { value } => write!(
                f,
                "Semester must be in YEAR-Term format (e.g. 2024-Fall), got `{value}`."
            ),
            Self::InvalidFlag { field, value } => {
                write!(f, "Field `{field}` must be a yes/no flag, got `{value}`.")
            }
            Self::InvalidDegreeRef { field, value } => {
                write!(f, "Field `{field}` must be `name|level`, got `{value}`.")
            }
            Self::UnknownAction { action } => write!(f, "Unknown action `{action}`."),
        }
    }
}

impl Error for FieldError {}

/// The named text values submitted with a request.
///
/// Every value is trimmed on lookup; a blank value is treated the same as an
/// absent one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(HashMap<String, String>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and callers assembling requests
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// A trimmed, non-blank value
    pub fn optional(&self, field: &str) -> Option<String> {
        self.0
            .get(field)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }

    pub fn required(&self, field: &'static str) -> Result<String, FieldError> {
        self.optional(field).ok_or(FieldError::Missing { field })
    }

    /// A required integer; negative values are allowed here
    pub fn required_int(&self, field: &'static str) -> Result<i32, FieldError> {
        let raw = self.required(field)?;
        parse_int(field, &raw)
    }

    /// A required integer that must be `>= 0`
    pub fn required_count(&self, field: &'static str) -> Result<i32, FieldError> {
        let value = self.required_int(field)?;
        non_negative(field, value)
    }

    /// An optional non-negative integer; absent or blank means null
    pub fn optional_count(&self, field: &'static str) -> Result<Option<i32>, FieldError> {
        self.optional(field)
            .map(|raw| parse_int(field, &raw).and_then(|value| non_negative(field, value)))
            .transpose()
    }

    /// A positive year
    pub fn year(&self, field: &'static str) -> Result<i32, FieldError> {
        let year = self.required_int(field)?;
        if year <= 0 {
            return Err(FieldError::OutOfRange {
                field,
                value: year.to_string(),
            });
        }
        Ok(year)
    }

    /// A checkbox-style flag; absent means false
    pub fn flag(&self, field: &'static str) -> Result<bool, FieldError> {
        match self.optional(field) {
            None => Ok(false),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => Ok(true),
                "0" | "false" | "off" | "no" => Ok(false),
                _ => Err(FieldError::InvalidFlag { field, value }),
            },
        }
    }
}

impl From<HashMap<String, String>> for Fields {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

fn parse_int(field: &'static str, raw: &str) -> Result<i32, FieldError> {
    let value = raw.parse::<i64>().map_err(|_| FieldError::NotANumber {
        field,
        value: raw.to_owned(),
    })?;

    i32::try_from(value).map_err(|_| FieldError::OutOfRange {
        field,
        value: raw.to_owned(),
    })
}

fn non_negative(field: &'static str, value: i32) -> Result<i32, FieldError> {
    if value < 0 {
        return Err(FieldError::Negative {
            field,
            value: value.into(),
        });
    }
    Ok(value)
}
