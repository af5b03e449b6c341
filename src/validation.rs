//! Input and layout integrity checks.
//!
//! The engine tolerates malformed input (degenerate spans are clamped,
//! bad hints are ignored); these checks let a host find out about it.
//! Detects:
//! - Duplicate and empty IDs
//! - Inverted or zero-length date ranges
//! - Negative row hints
//! - Overlapping intervals sharing a row (layout invariant)

use crate::models::{Interval, RowAssignment};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two intervals share the same ID.
    DuplicateId,
    /// An interval has an empty ID.
    EmptyId,
    /// `end <= start`; the engine will render it as one day.
    InvertedRange,
    /// A row hint is negative; the engine will ignore it.
    NegativeRowHint,
    /// Two intervals on the same row overlap.
    RowOverlap,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates interval input.
///
/// Checks:
/// 1. No empty IDs
/// 2. No duplicate IDs
/// 3. `end > start` for every interval
/// 4. No negative row hints
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_intervals(intervals: &[Interval]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for interval in intervals {
        if interval.id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                format!("Interval starting {} has an empty ID", interval.start),
            ));
        } else if !ids.insert(interval.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate interval ID: {}", interval.id),
            ));
        }

        if !interval.is_well_formed() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvertedRange,
                format!(
                    "Interval '{}' ends ({}) on or before it starts ({})",
                    interval.id, interval.end, interval.start
                ),
            ));
        }

        if let Some(row) = interval.row.filter(|r| *r < 0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeRowHint,
                format!("Interval '{}' has negative row hint {}", interval.id, row),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that no two intervals on the same row overlap.
///
/// Touching intervals (`a.end == b.start`) are allowed.
pub fn check_no_overlap(assignment: &RowAssignment) -> ValidationResult {
    let mut errors = Vec::new();

    for (row, entries) in assignment.rows().iter().enumerate() {
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                if a.span.overlaps(&b.span) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::RowOverlap,
                        format!(
                            "Row {}: '{}' [{}, {}) overlaps '{}' [{}, {})",
                            row, a.id, a.span.start, a.span.end, b.id, b.span.start, b.span.end
                        ),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RowAssigner;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_valid_input() {
        let ivs = vec![
            Interval::new("A", d(1), d(5)),
            Interval::new("B", d(3), d(9)).with_row(2),
        ];
        assert!(validate_intervals(&ivs).is_ok());
    }

    #[test]
    fn test_duplicate_and_empty_ids() {
        let ivs = vec![
            Interval::new("A", d(1), d(5)),
            Interval::new("A", d(6), d(8)),
            Interval::new("", d(6), d(8)),
        ];
        let errs = validate_intervals(&ivs).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
        assert!(errs.iter().any(|e| e.kind == ValidationErrorKind::EmptyId));
    }

    #[test]
    fn test_inverted_and_zero_length() {
        let ivs = vec![
            Interval::new("Z", d(4), d(4)),
            Interval::new("I", d(9), d(2)),
        ];
        let errs = validate_intervals(&ivs).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert!(errs
            .iter()
            .all(|e| e.kind == ValidationErrorKind::InvertedRange));
    }

    #[test]
    fn test_negative_row_hint() {
        let ivs = vec![Interval::new("A", d(1), d(5)).with_row(-1)];
        let errs = validate_intervals(&ivs).unwrap_err();
        assert_eq!(errs[0].kind, ValidationErrorKind::NegativeRowHint);
    }

    #[test]
    fn test_assigned_layout_has_no_overlap() {
        let ivs = vec![
            Interval::new("A", d(1), d(10)),
            Interval::new("B", d(5), d(15)),
            Interval::new("C", d(10), d(20)),
            Interval::new("D", d(2), d(3)),
        ];
        let a = RowAssigner::new().assign(&ivs, None);
        assert!(check_no_overlap(&a).is_ok());
    }

    #[test]
    fn test_overlap_detected() {
        use crate::models::{DateSpan, RowEntry};

        let mut a = RowAssignment::new(5);
        a.insert(0, RowEntry::new("A", DateSpan::new(d(1), d(10))));
        a.insert(0, RowEntry::new("B", DateSpan::new(d(10), d(12))));
        a.insert(0, RowEntry::new("C", DateSpan::new(d(11), d(14))));
        let errs = check_no_overlap(&a).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, ValidationErrorKind::RowOverlap);
        assert!(errs[0].message.contains("'B'"));
    }
}
