//! Evaluating invariants against one batch of measurements

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capture::Measurements;
use crate::error::{LayoutError, LayoutResult};
use crate::geometry::Rectangle;
use crate::invariant::{Invariant, Severity};

/// Outcome of evaluating one invariant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub invariant_description: String,
    pub passed: bool,
    pub details: String,
    #[serde(default)]
    pub severity: Severity,
}

impl CheckResult {
    pub fn pass(description: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            invariant_description: description.into(),
            passed: true,
            details: details.into(),
            severity: Severity::Failure,
        }
    }

    pub fn fail(description: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            invariant_description: description.into(),
            passed: false,
            details: details.into(),
            severity: Severity::Failure,
        }
    }

    /// A violated invariant whose severity fails the check
    pub fn is_failure(&self) -> bool {
        !self.passed && self.severity == Severity::Failure
    }

    /// A violated invariant reported only as a warning
    pub fn is_warning(&self) -> bool {
        !self.passed && self.severity == Severity::Warning
    }
}

/// Evaluate `invariants` in declaration order.
///
/// Every invariant is validated and every referenced name resolved before
/// anything is decided, so a mis-specified batch yields an error and no
/// partial results. Violations are results, not errors.
pub fn evaluate(
    invariants: &[Invariant],
    measurements: &Measurements,
) -> LayoutResult<Vec<CheckResult>> {
    let resolved = invariants
        .iter()
        .map(|invariant| -> LayoutResult<_> {
            invariant.validate()?;
            let [first, second] = invariant.referenced_names();
            Ok((
                invariant,
                lookup(invariant, measurements, first)?,
                lookup(invariant, measurements, second)?,
            ))
        })
        .collect::<LayoutResult<Vec<_>>>()?;

    Ok(resolved
        .into_iter()
        .map(|(invariant, first, second)| {
            let (passed, details) = invariant.assess(first, second);
            debug!(
                "{} '{}': {}",
                if passed { "held" } else { "violated" },
                invariant.description,
                details
            );
            CheckResult {
                invariant_description: invariant.description.clone(),
                passed,
                details,
                severity: invariant.severity,
            }
        })
        .collect())
}

fn lookup<'m>(
    invariant: &Invariant,
    measurements: &'m Measurements,
    name: &str,
) -> LayoutResult<&'m Rectangle> {
    measurements
        .get(name)
        .ok_or_else(|| LayoutError::MissingMeasurement {
            invariant: invariant.description.clone(),
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurements() -> Measurements {
        Measurements::from([
            ("input".to_string(), Rectangle::new(0.0, 0.0, 100.0, 600.0)),
            ("drop_zone".to_string(), Rectangle::new(0.0, 50.0, 100.0, 200.0)),
        ])
    }

    #[test]
    fn test_warning_severity_carried() {
        let invariants = vec![Invariant::size_ratio("ratio", "input", "drop_zone", 1.5)
            .with_severity(Severity::Warning)];
        let results = evaluate(&invariants, &measurements()).unwrap();
        assert!(results[0].is_warning());
        assert!(!results[0].is_failure());
    }

    #[test]
    fn test_invalid_invariant_aborts_batch() {
        let invariants = vec![
            Invariant::size_ratio("fine", "input", "drop_zone", 4.0),
            Invariant::size_ratio("broken", "input", "drop_zone", 0.0),
        ];
        let err = evaluate(&invariants, &measurements()).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidInvariant { ref invariant, .. } if invariant == "broken"));
    }

    #[test]
    fn test_empty_batch() {
        assert!(evaluate(&[], &measurements()).unwrap().is_empty());
    }
}
