//! Resolving logical element names against one captured render frame

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LayoutError, LayoutResult};
use crate::geometry::{NamedElementMeasurement, Rectangle};

/// Rectangles keyed by logical element name, input to [`evaluate`](crate::evaluate)
pub type Measurements = BTreeMap<String, Rectangle>;

/// Every match of every named element, read from a single page state.
///
/// A match with no bounding box (`None`) is attached to the DOM but not
/// rendered. Nothing outside the frame is ever consulted, so all rectangles
/// resolved from one `FrameCapture` belong to the same render frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameCapture {
    #[serde(default)]
    pub elements: BTreeMap<String, Vec<Option<Rectangle>>>,
}

impl FrameCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the matches found for `name`, replacing earlier ones
    pub fn insert(&mut self, name: impl Into<String>, matches: Vec<Option<Rectangle>>) {
        self.elements.insert(name.into(), matches);
    }

    /// Resolve `name` to exactly one rendered rectangle.
    ///
    /// Picking the first of several matches would hide regressions that
    /// duplicate an element, so more than one match is an error.
    pub fn capture(&self, name: &str) -> LayoutResult<Rectangle> {
        let matches = self.elements.get(name).map(Vec::as_slice).unwrap_or(&[]);

        match matches {
            [] => Err(LayoutError::ElementNotFound {
                name: name.to_string(),
                reason: "no matching element".to_string(),
            }),
            [Some(rect)] => Ok(*rect),
            [None] => Err(LayoutError::ElementNotFound {
                name: name.to_string(),
                reason: "element is not rendered".to_string(),
            }),
            _ => Err(LayoutError::AmbiguousElement {
                name: name.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// Resolve a batch of names, stopping at the first that fails
    pub fn capture_all<I, S>(&self, names: I) -> LayoutResult<Vec<NamedElementMeasurement>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| -> LayoutResult<NamedElementMeasurement> {
                let name = name.as_ref();
                let rect = self.capture(name)?;
                debug!(
                    "Captured '{}' at ({}, {}) {}x{}",
                    name, rect.x, rect.y, rect.width, rect.height
                );
                Ok(NamedElementMeasurement {
                    name: name.to_string(),
                    rect,
                })
            })
            .collect()
    }
}

/// Key captured measurements by name
pub fn measurements(captured: &[NamedElementMeasurement]) -> Measurements {
    captured
        .iter()
        .map(|m| (m.name.clone(), m.rect))
        .collect()
}
