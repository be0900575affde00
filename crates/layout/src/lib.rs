//! Toolbox layout checker
//!
//! Decides, from bounding boxes captured in one render frame, whether a set of
//! declared geometric invariants hold:
//!
//! ```text
//!   FrameCapture ──capture_all──▶ Measurements ──evaluate──▶ [CheckResult] ──report──▶ text
//!   (all matches per name)       (one rect per name)        (declaration order)     PASS/FAIL lines
//! ```
//!
//! Locating elements on a live page is left to the browser driver; this crate
//! never performs I/O.

pub mod capture;
pub mod check;
pub mod error;
pub mod geometry;
pub mod invariant;
pub mod report;

pub use capture::{measurements, FrameCapture, Measurements};
pub use check::{evaluate, CheckResult};
pub use error::{LayoutError, LayoutResult};
pub use geometry::{Axis, NamedElementMeasurement, Rectangle};
pub use invariant::{Invariant, InvariantKind, Severity};
pub use report::{report, Report};
