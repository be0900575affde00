//! Declarative geometric invariants

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};
use crate::geometry::{Axis, Rectangle};

/// How a violated invariant is reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Violation fails the check
    #[default]
    Failure,
    /// Violation is reported but does not fail the check
    Warning,
}

/// A named predicate over captured rectangles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invariant {
    /// Human-readable description, printed in the report
    pub description: String,

    #[serde(default)]
    pub severity: Severity,

    #[serde(flatten)]
    pub kind: InvariantKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvariantKind {
    /// `extent(subject) <= extent(reference) * factor` along `axis`
    SizeRatio {
        subject: String,
        reference: String,
        factor: f64,
        #[serde(default)]
        axis: Axis,
    },

    /// `subject` must start at or below the bottom edge of `above`
    NonOverlap { subject: String, above: String },
}

impl Invariant {
    pub fn size_ratio(
        description: impl Into<String>,
        subject: impl Into<String>,
        reference: impl Into<String>,
        factor: f64,
    ) -> Self {
        Self {
            description: description.into(),
            severity: Severity::Failure,
            kind: InvariantKind::SizeRatio {
                subject: subject.into(),
                reference: reference.into(),
                factor,
                axis: Axis::Height,
            },
        }
    }

    pub fn non_overlap(
        description: impl Into<String>,
        subject: impl Into<String>,
        above: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            severity: Severity::Failure,
            kind: InvariantKind::NonOverlap {
                subject: subject.into(),
                above: above.into(),
            },
        }
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_axis(mut self, new_axis: Axis) -> Self {
        if let InvariantKind::SizeRatio { axis, .. } = &mut self.kind {
            *axis = new_axis;
        }
        self
    }

    /// Element names this invariant reads, in argument order
    pub fn referenced_names(&self) -> [&str; 2] {
        match &self.kind {
            InvariantKind::SizeRatio {
                subject, reference, ..
            } => [subject.as_str(), reference.as_str()],
            InvariantKind::NonOverlap { subject, above } => [subject.as_str(), above.as_str()],
        }
    }

    /// Reject parameters no measurement could satisfy meaningfully
    pub fn validate(&self) -> LayoutResult<()> {
        if let InvariantKind::SizeRatio { factor, .. } = &self.kind {
            if !factor.is_finite() || *factor <= 0.0 {
                return Err(LayoutError::InvalidInvariant {
                    invariant: self.description.clone(),
                    reason: format!("factor must be a positive number, got {}", factor),
                });
            }
        }
        Ok(())
    }

    /// Decide the predicate for the two rectangles named by
    /// [`referenced_names`](Self::referenced_names). Returns whether it holds
    /// and a line explaining the numbers behind the decision.
    pub fn assess(&self, first: &Rectangle, second: &Rectangle) -> (bool, String) {
        match &self.kind {
            InvariantKind::SizeRatio {
                subject,
                reference,
                factor,
                axis,
            } => {
                let actual = first.extent(*axis);
                let limit = second.extent(*axis) * factor;
                let passed = actual <= limit;
                let op = if passed { "<=" } else { ">" };
                let details = format!(
                    "{axis}({subject})={actual} {op} {axis}({reference})*{factor}={limit}",
                    axis = axis.as_str(),
                );
                (passed, details)
            }
            InvariantKind::NonOverlap { subject, above } => {
                let top = first.y;
                let edge = second.bottom();
                let passed = top >= edge;
                let op = if passed { ">=" } else { "<" };
                let details = format!("{subject}.y={top} {op} {above}.y+{above}.height={edge}");
                (passed, details)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_size_ratio() {
        let json = r#"{
            "description": "input fits drop zone",
            "kind": "size_ratio",
            "subject": "input",
            "reference": "drop_zone",
            "factor": 1.5
        }"#;
        let inv: Invariant = serde_json::from_str(json).unwrap();
        assert_eq!(inv.severity, Severity::Failure);
        assert_eq!(inv, Invariant::size_ratio("input fits drop zone", "input", "drop_zone", 1.5));
    }

    #[test]
    fn test_deserialize_warning_width() {
        let json = r#"{
            "description": "w",
            "severity": "warning",
            "kind": "size_ratio",
            "subject": "a",
            "reference": "b",
            "factor": 2,
            "axis": "width"
        }"#;
        let inv: Invariant = serde_json::from_str(json).unwrap();
        assert_eq!(inv.severity, Severity::Warning);
        assert!(matches!(inv.kind, InvariantKind::SizeRatio { axis: Axis::Width, .. }));
    }

    #[test]
    fn test_referenced_names() {
        let inv = Invariant::non_overlap("x", "input", "header");
        assert_eq!(inv.referenced_names(), ["input", "header"]);
    }

    #[test]
    fn test_validate_rejects_bad_factor() {
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let inv = Invariant::size_ratio("bad", "a", "b", factor);
            assert!(matches!(
                inv.validate(),
                Err(LayoutError::InvalidInvariant { .. })
            ));
        }
        assert!(Invariant::size_ratio("ok", "a", "b", 0.5).validate().is_ok());
    }

    #[test]
    fn test_width_axis() {
        let inv = Invariant::size_ratio("w", "a", "b", 1.0).with_axis(Axis::Width);
        let a = Rectangle::new(0.0, 0.0, 50.0, 900.0);
        let b = Rectangle::new(0.0, 0.0, 60.0, 10.0);
        let (passed, details) = inv.assess(&a, &b);
        assert!(passed);
        assert!(details.starts_with("width(a)=50"));
    }

    #[test]
    fn test_non_overlap_details() {
        let inv = Invariant::non_overlap("n", "input", "header");
        let input = Rectangle::new(0.0, 0.0, 100.0, 600.0);
        let header = Rectangle::new(0.0, 0.0, 500.0, 40.0);
        let (passed, details) = inv.assess(&input, &header);
        assert!(!passed);
        assert_eq!(details, "input.y=0 < header.y+header.height=40");
    }
}
