//! Error types for layout checks
//!
//! These errors mean the check itself could not be carried out: the page
//! structure changed or the invariant is mis-specified. A violated invariant
//! is never an error, it is a failed [`CheckResult`](crate::CheckResult).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Element not found: {name} ({reason})")]
    ElementNotFound { name: String, reason: String },

    #[error("Ambiguous element: {name} matched {count} elements, expected exactly one")]
    AmbiguousElement { name: String, count: usize },

    #[error("Missing measurement: invariant '{invariant}' references '{name}' which was not captured")]
    MissingMeasurement { invariant: String, name: String },

    #[error("Invalid invariant '{invariant}': {reason}")]
    InvalidInvariant { invariant: String, reason: String },
}

pub type LayoutResult<T> = Result<T, LayoutError>;
