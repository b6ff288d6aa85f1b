//! Screen-space geometry.
//!
//! Coordinates are y-down with the origin at the top left of the
//! virtual desktop, matching what GUI hosts hand over for screen
//! bounds. All values are f64 because screen rectangles arrive that way
//! from display servers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Screen bounds (or any rectangle) in desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

/// Screen corner a free window currently occupies.
///
/// Interaction advances clockwise from the top left; a window placed in
/// any corner therefore never overlaps the pointer that just chased it
/// out of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Orientation {
    /// The corner an interaction moves the window to.
    pub fn next(self) -> Self {
        match self {
            Self::TopLeft => Self::TopRight,
            Self::TopRight => Self::BottomRight,
            Self::BottomRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopLeft,
        }
    }

    /// 0..4 in cycle order; the top corners are `< 2`.
    pub fn corner_index(self) -> u8 {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomRight => 2,
            Self::BottomLeft => 3,
        }
    }

    /// Whether this corner sits along the top edge of the screen.
    pub fn is_top(self) -> bool {
        self.corner_index() < 2
    }

    /// Origin for a window of `size` placed in this corner of `screen`,
    /// inset by the paddings from both edges of the corner.
    pub(crate) fn corner_origin(self, screen: Rect, size: Size, xpadding: f64, ypadding: f64) -> Point {
        let x = match self {
            Self::TopLeft | Self::BottomLeft => screen.x + xpadding,
            Self::TopRight | Self::BottomRight => {
                screen.x + screen.width - size.width - xpadding
            }
        };
        let y = match self {
            Self::TopLeft | Self::TopRight => screen.y + ypadding,
            Self::BottomRight | Self::BottomLeft => {
                screen.y + screen.height - size.height - ypadding
            }
        };
        Point { x, y }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::BottomRight
    }
}
