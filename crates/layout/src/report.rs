//! Plain-text rendering of check results

use std::fmt;

use serde::Serialize;

use crate::check::CheckResult;

pub const PASS: &str = "PASS";
pub const FAIL: &str = "FAIL";
pub const WARN: &str = "WARN";

/// Tallied results of one check batch
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub results: Vec<CheckResult>,
}

impl Report {
    pub fn new(results: Vec<CheckResult>) -> Self {
        let failed = results.iter().filter(|r| r.is_failure()).count();
        let warnings = results.iter().filter(|r| r.is_warning()).count();
        Self {
            passed: results.len() - failed - warnings,
            failed,
            warnings,
            results,
        }
    }

    /// True when no line of the report is a `FAIL`
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            writeln!(f, "{}", line(result))?;
        }
        Ok(())
    }
}

fn token(result: &CheckResult) -> &'static str {
    if result.passed {
        PASS
    } else if result.is_warning() {
        WARN
    } else {
        FAIL
    }
}

/// Render one result as `TOKEN description: details`
pub fn line(result: &CheckResult) -> String {
    if result.details.is_empty() {
        format!("{} {}", token(result), result.invariant_description)
    } else {
        format!(
            "{} {}: {}",
            token(result),
            result.invariant_description,
            result.details
        )
    }
}

/// Render results as ordered lines, one per invariant
pub fn report(results: &[CheckResult]) -> String {
    results.iter().map(|r| line(r) + "\n").collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariant::Severity;

    #[test]
    fn test_report_lines_in_order() {
        let results = vec![
            CheckResult::pass("first", "a"),
            CheckResult::fail("second", "b"),
            CheckResult::pass("third", ""),
        ];
        let text = report(&results);
        assert_eq!(text, "PASS first: a\nFAIL second: b\nPASS third\n");
    }

    #[test]
    fn test_warning_line_is_not_failure() {
        let mut warned = CheckResult::fail("soft", "x");
        warned.severity = Severity::Warning;

        let report = Report::new(vec![CheckResult::pass("ok", ""), warned]);
        assert_eq!(report.warnings, 1);
        assert_eq!(report.failed, 0);
        assert!(report.is_success());
        assert!(report.to_string().contains("WARN soft: x"));
    }

    #[test]
    fn test_fail_count() {
        let report = Report::new(vec![
            CheckResult::fail("a", ""),
            CheckResult::fail("b", ""),
            CheckResult::pass("c", ""),
        ]);
        assert_eq!((report.passed, report.failed), (1, 2));
        assert!(!report.is_success());
        assert_eq!(report.to_string().lines().filter(|l| l.starts_with(FAIL)).count(), 2);
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(report(&[]), "");
        assert!(Report::new(vec![]).is_success());
    }
}
