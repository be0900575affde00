//! Rectangles as reported by the rendering engine

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in logical pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Y coordinate of the bottom edge
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// X coordinate of the right edge
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Height => self.height,
            Axis::Width => self.width,
        }
    }
}

/// Which dimension a size comparison looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    Height,
    Width,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Height => "height",
            Axis::Width => "width",
        }
    }
}

/// A rectangle tagged with the logical element it was measured from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedElementMeasurement {
    pub name: String,
    pub rect: Rectangle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rectangle::new(10.0, 20.0, 100.0, 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.extent(Axis::Height), 40.0);
        assert_eq!(r.extent(Axis::Width), 100.0);
    }

    #[test]
    fn test_deserialize_playwright_box() {
        // boundingBox() returns exactly these four keys
        let r: Rectangle =
            serde_json::from_str(r#"{"x":0,"y":50.5,"width":100,"height":200}"#).unwrap();
        assert_eq!(r, Rectangle::new(0.0, 50.5, 100.0, 200.0));
    }
}
