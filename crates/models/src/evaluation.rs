use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// Per-grade-band student counts; `None` means "not yet measured"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCounts {
    pub a: Option<i32>,
    pub b: Option<i32>,
    pub c: Option<i32>,
    pub f: Option<i32>,
}

impl GradeCounts {
    pub fn new(a: Option<i32>, b: Option<i32>, c: Option<i32>, f: Option<i32>) -> Self {
        Self { a, b, c, f }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<i32>> {
        [self.a, self.b, self.c, self.f].into_iter()
    }

    /// Sum of the recorded (non-null) counts, or `None` if nothing is recorded
    pub fn recorded_total(&self) -> Option<i64> {
        self.iter()
            .flatten()
            .map(i64::from)
            .reduce(|acc, count| acc + count)
    }

    /// Students with a passing (non-F) grade, absent bands counted as zero
    pub fn non_f(&self) -> i64 {
        [self.a, self.b, self.c]
            .into_iter()
            .map(|count| i64::from(count.unwrap_or(0)))
            .sum()
    }

    /// All graded students, absent bands counted as zero
    pub fn graded(&self) -> i64 {
        self.non_f() + i64::from(self.f.unwrap_or(0))
    }

    pub fn is_complete(&self) -> bool {
        self.iter().all(|count| count.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|count| count.is_none())
    }
}

/// The measurable content of an evaluation row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationFields {
    pub method_label: Option<String>,
    pub counts: GradeCounts,
    pub improvement_text: Option<String>,
}

impl EvaluationFields {
    fn has_method(&self) -> bool {
        self.method_label
            .as_deref()
            .is_some_and(|label| !label.trim().is_empty())
    }
}

/// Completeness of a single evaluation row
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
pub enum EvaluationStatus {
    #[strum(serialize = "No Evaluation")]
    #[serde(rename = "No Evaluation")]
    NoEvaluation,
    Partial,
    Complete,
}

/// Classifies an evaluation by which of its five measured fields are present.
///
/// A blank method label counts as absent. Improvement text never affects the
/// status.
pub fn evaluation_status(fields: &EvaluationFields) -> EvaluationStatus {
    let has_method = fields.has_method();

    if !has_method && fields.counts.is_empty() {
        EvaluationStatus::NoEvaluation
    } else if has_method && fields.counts.is_complete() {
        EvaluationStatus::Complete
    } else {
        EvaluationStatus::Partial
    }
}

/// Rolls a section's evaluation rows up into one status: no rows means
/// "No Evaluation", any incomplete row makes the section "Partial".
pub fn section_status<'a>(rows: impl IntoIterator<Item = &'a EvaluationFields>) -> EvaluationStatus {
    let mut seen_any = false;

    for row in rows {
        seen_any = true;
        if evaluation_status(row) != EvaluationStatus::Complete {
            return EvaluationStatus::Partial;
        }
    }

    if seen_any {
        EvaluationStatus::Complete
    } else {
        EvaluationStatus::NoEvaluation
    }
}

/// Non-F and total graded students across a group of evaluation rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NonFTally {
    pub non_f: i64,
    pub total: i64,
}

impl NonFTally {
    /// `non_f / total`, undefined when nobody was graded
    pub fn ratio(&self) -> Option<f64> {
        (self.total > 0).then(|| self.non_f as f64 / self.total as f64)
    }

    /// Reports only trust tallies that fit inside the section's enrollment
    pub fn within_enrollment(&self, enrolled_count: i32) -> bool {
        self.total <= i64::from(enrolled_count)
    }
}

/// Tallies the non-F ratio for rows sharing one section
pub fn non_f_ratio<'a>(group: impl IntoIterator<Item = &'a GradeCounts>) -> NonFTally {
    group
        .into_iter()
        .fold(NonFTally::default(), |tally, counts| NonFTally {
            non_f: tally.non_f + counts.non_f(),
            total: tally.total + counts.graded(),
        })
}

#[cfg(test)]
mod test {
    use super::{
        EvaluationFields, EvaluationStatus, GradeCounts, evaluation_status, non_f_ratio,
        section_status,
    };

    fn fields(method: Option<&str>, counts: [Option<i32>; 4]) -> EvaluationFields {
        EvaluationFields {
            method_label: method.map(str::to_owned),
            counts: GradeCounts::new(counts[0], counts[1], counts[2], counts[3]),
            improvement_text: None,
        }
    }

    #[test]
    fn test_status_is_total_and_exclusive() {
        // Walk all 2^5 presence combinations of the five measured fields
        for mask in 0u8..32 {
            let method = (mask & 1 != 0).then_some("Exam");
            let count = |bit: u8| (mask & (1 << bit) != 0).then_some(1);
            let row = fields(method, [count(1), count(2), count(3), count(4)]);

            let expected = match mask {
                0 => EvaluationStatus::NoEvaluation,
                31 => EvaluationStatus::Complete,
                _ => EvaluationStatus::Partial,
            };
            assert_eq!(evaluation_status(&row), expected, "mask {mask:05b}");
        }
    }

    #[test]
    fn test_blank_method_is_absent() {
        let row = fields(Some("  "), [None; 4]);
        assert_eq!(evaluation_status(&row), EvaluationStatus::NoEvaluation);

        let row = fields(Some(""), [Some(1); 4]);
        assert_eq!(evaluation_status(&row), EvaluationStatus::Partial);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(EvaluationStatus::NoEvaluation.to_string(), "No Evaluation");
        assert_eq!(EvaluationStatus::Partial.to_string(), "Partial");
        assert_eq!(EvaluationStatus::Complete.to_string(), "Complete");
    }

    #[test]
    fn test_section_status_rollup() {
        let complete = fields(Some("Exam"), [Some(1); 4]);
        let partial = fields(Some("Exam"), [Some(1), None, Some(1), Some(1)]);

        assert_eq!(section_status([]), EvaluationStatus::NoEvaluation);
        assert_eq!(section_status([&complete]), EvaluationStatus::Complete);
        assert_eq!(
            section_status([&complete, &partial]),
            EvaluationStatus::Partial
        );
    }

    #[test]
    fn test_recorded_total_ignores_nulls() {
        assert_eq!(GradeCounts::default().recorded_total(), None);
        assert_eq!(
            GradeCounts::new(Some(10), None, Some(5), None).recorded_total(),
            Some(15)
        );
        assert_eq!(
            GradeCounts::new(Some(i32::MAX), Some(i32::MAX), None, None).recorded_total(),
            Some(2 * i64::from(i32::MAX))
        );
    }

    #[test]
    fn test_non_f_ratio_over_group() {
        let rows = [
            GradeCounts::new(Some(10), Some(10), Some(5), Some(5)),
            GradeCounts::new(Some(4), None, Some(1), Some(5)),
        ];

        let tally = non_f_ratio(&rows);
        assert_eq!(tally.non_f, 30);
        assert_eq!(tally.total, 40);
        assert_eq!(tally.ratio(), Some(0.75));
        assert!(tally.within_enrollment(40));
        assert!(!tally.within_enrollment(39));
    }

    #[test]
    fn test_non_f_ratio_undefined_without_grades() {
        let rows = [GradeCounts::default()];
        assert_eq!(non_f_ratio(&rows).ratio(), None);
        assert_eq!(non_f_ratio(&[]).ratio(), None);
    }
}
