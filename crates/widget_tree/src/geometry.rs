//! Geometry value types shared by the tree and the layout engine

use serde::{Deserialize, Serialize};

/// Layout axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Columns, widths, x coordinates
    Horizontal,
    /// Rows, heights, y coordinates
    Vertical,
}

impl Axis {
    /// Both axes, horizontal first
    pub const ALL: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];
}

/// A width/height pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    /// Available size that places no limit on either axis
    pub const UNCONSTRAINED: Size = Size {
        width: f32::INFINITY,
        height: f32::INFINITY,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Component along an axis
    pub fn main(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    pub fn set_main(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Horizontal => self.width = value,
            Axis::Vertical => self.height = value,
        }
    }

    /// Shrink by insets, never below zero. Infinite axes stay infinite.
    pub fn deflate(&self, insets: Insets) -> Self {
        Self {
            width: (self.width - insets.horizontal()).max(0.0),
            height: (self.height - insets.vertical()).max(0.0),
        }
    }

    /// Clamp each axis into `[min, max]`. When the bounds cross, `max` wins.
    pub fn clamp(&self, min: Size, max: Size) -> Self {
        Self {
            width: self.width.max(min.width).min(max.width),
            height: self.height.max(min.height).min(max.height),
        }
    }
}

/// A position in the coordinate space of the parent container
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in layout coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Padding around the content box of a container
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Same inset on all four edges
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Total inset along an axis
    pub fn total(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.horizontal(),
            Axis::Vertical => self.vertical(),
        }
    }

    /// Inset at the leading edge of an axis (left or top)
    pub fn leading(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.left,
            Axis::Vertical => self.top,
        }
    }

    pub fn is_non_negative(&self) -> bool {
        self.left >= 0.0 && self.top >= 0.0 && self.right >= 0.0 && self.bottom >= 0.0
    }
}

/// Gap inserted between adjacent tracks
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Spacing {
    pub const ZERO: Spacing = Spacing {
        horizontal: 0.0,
        vertical: 0.0,
    };

    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn main(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }

    /// Total gap consumed by `tracks` tracks on an axis
    pub fn total(&self, axis: Axis, tracks: usize) -> f32 {
        self.main(axis) * tracks.saturating_sub(1) as f32
    }
}

/// Explicit size override; `None` on an axis means auto
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSize {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl UserSize {
    pub const AUTO: UserSize = UserSize {
        width: None,
        height: None,
    };

    pub fn new(width: Option<f32>, height: Option<f32>) -> Self {
        Self { width, height }
    }

    pub fn fixed(width: f32, height: f32) -> Self {
        Self::new(Some(width), Some(height))
    }

    pub fn main(&self, axis: Axis) -> Option<f32> {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Replace auto axes of `measured` with explicit values where set
    pub fn apply(&self, measured: Size) -> Size {
        Size {
            width: self.width.unwrap_or(measured.width),
            height: self.height.unwrap_or(measured.height),
        }
    }
}
