//! Time Ranges
//!
//! `TimeRange` is the caller-supplied `[start, end)` selection in seconds. It
//! is not required to be valid: bounds may be missing, negative, inverted or
//! past the end of the recording. The extractor resolves it against the
//! recording's duration.
//!
//! `RangeInput` validates the raw text of a start/end form as the user types,
//! before any audio is touched.

use std::fmt;

/// A requested `[start, end)` selection in seconds
///
/// A bound counts as present only when it is `Some` and finite.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeRange {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl TimeRange {
    /// Create a range from optional bounds
    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self { start, end }
    }

    /// Create a range with both bounds present
    ///
    /// # Example
    /// ```
    /// use samplecut::engine::TimeRange;
    /// let range = TimeRange::between(1.0, 3.0);
    /// assert_eq!(range.resolve(4.0), (1.0, 3.0));
    /// ```
    pub fn between(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// The whole recording
    pub fn full() -> Self {
        Self::default()
    }

    /// Resolve the bounds against a recording duration
    ///
    /// Returns `(start_secs, end_secs)` where `start_secs = max(0, start)`
    /// (or 0 if absent) and `end_secs = min(end, duration)` (or `duration` if
    /// absent). The result may still be empty or inverted.
    pub fn resolve(&self, duration_secs: f64) -> (f64, f64) {
        let start_secs = present(self.start).map_or(0.0, |s| s.max(0.0));
        let end_secs = present(self.end)
            .unwrap_or(duration_secs)
            .min(duration_secs);
        (start_secs, end_secs)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match present(self.start) {
            Some(s) => write!(f, "[{:.3}s, ", s)?,
            None => write!(f, "[start, ")?,
        }
        match present(self.end) {
            Some(e) => write!(f, "{:.3}s)", e),
            None => write!(f, "end)"),
        }
    }
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

// ============================================================================
// Range Input Validation
// ============================================================================

/// Outcome of validating raw start/end text
#[derive(Debug, Clone, PartialEq)]
pub enum RangeCheck {
    /// Nothing to complain about (empty fields are allowed)
    Ok,
    /// Both fields are numbers and `end <= start`
    EndNotAfterStart { start: f64, end: f64 },
    /// A non-empty field is not a number
    Unparsable { field: RangeField, text: String },
}

impl RangeCheck {
    /// Whether an error should be shown to the user
    pub fn is_error(&self) -> bool {
        !matches!(self, RangeCheck::Ok)
    }
}

/// Which field of the range form a problem refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    Start,
    End,
}

impl fmt::Display for RangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeField::Start => write!(f, "start"),
            RangeField::End => write!(f, "end"),
        }
    }
}

/// Raw text of a start/end form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeInput {
    pub start: String,
    pub end: String,
}

impl RangeInput {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Validate the current text of both fields
    ///
    /// Only reports an inverted range once both fields hold numbers, so a
    /// half-filled form is never flagged.
    pub fn check(&self) -> RangeCheck {
        let start = match parse_field(&self.start, RangeField::Start) {
            Ok(v) => v,
            Err(check) => return check,
        };
        let end = match parse_field(&self.end, RangeField::End) {
            Ok(v) => v,
            Err(check) => return check,
        };

        match (start, end) {
            (Some(start), Some(end)) if end <= start => {
                RangeCheck::EndNotAfterStart { start, end }
            }
            _ => RangeCheck::Ok,
        }
    }

    /// Convert to a `TimeRange`, treating empty or unparsable fields as absent
    pub fn to_time_range(&self) -> TimeRange {
        TimeRange {
            start: parse_field(&self.start, RangeField::Start).ok().flatten(),
            end: parse_field(&self.end, RangeField::End).ok().flatten(),
        }
    }
}

fn parse_field(text: &str, field: RangeField) -> std::result::Result<Option<f64>, RangeCheck> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(RangeCheck::Unparsable {
            field,
            text: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_resolve_defaults() {
        assert_eq!(TimeRange::full().resolve(4.0), (0.0, 4.0));
    }

    #[test]
    fn test_resolve_clamps() {
        assert_eq!(TimeRange::between(-5.0, 1e9).resolve(4.0), (0.0, 4.0));
    }

    #[test]
    fn test_resolve_non_finite_is_absent() {
        let range = TimeRange::new(Some(f64::NAN), Some(f64::INFINITY));
        assert_eq!(range.resolve(2.5), (0.0, 2.5));
    }

    #[test]
    fn test_resolve_keeps_inverted() {
        assert_eq!(TimeRange::between(3.0, 1.0).resolve(4.0), (3.0, 1.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeRange::between(1.0, 2.5).to_string(), "[1.000s, 2.500s)");
        assert_eq!(TimeRange::full().to_string(), "[start, end)");
    }

    #[test_case("", "" ; "both empty")]
    #[test_case("2", "" ; "end empty")]
    #[test_case("", "2" ; "start empty")]
    #[test_case("1", "2" ; "ordered")]
    #[test_case(" 0.5 ", "0.75" ; "whitespace")]
    fn test_check_ok(start: &str, end: &str) {
        assert_eq!(RangeInput::new(start, end).check(), RangeCheck::Ok);
    }

    #[test_case("2", "1" ; "inverted")]
    #[test_case("2", "2" ; "zero width")]
    fn test_check_end_not_after_start(start: &str, end: &str) {
        let check = RangeInput::new(start, end).check();
        assert!(matches!(check, RangeCheck::EndNotAfterStart { .. }));
        assert!(check.is_error());
    }

    #[test]
    fn test_check_unparsable() {
        let check = RangeInput::new("abc", "2").check();
        assert_eq!(
            check,
            RangeCheck::Unparsable {
                field: RangeField::Start,
                text: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_to_time_range() {
        let range = RangeInput::new("1.5", "").to_time_range();
        assert_eq!(range, TimeRange::new(Some(1.5), None));
    }
}
