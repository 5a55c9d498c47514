use serde::{Deserialize, Serialize};

use crate::utils::{HasBBox, Rect, get_bound};

/// Axis-aligned box in normalized `[0, 1]` page coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl NormBox {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Builds a box from its `(x0, y0, x1, y1)` corners.
    pub fn from_rect((x0, y0, x1, y1): Rect) -> Self {
        Self {
            x: x0,
            y: y0,
            w: x1 - x0,
            h: y1 - y0,
        }
    }

    /// Finite, with strictly positive width and height.
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.w, self.h].iter().all(|v| v.is_finite()) && self.w > 0.0 && self.h > 0.0
    }

    /// Smallest box containing every box in `boxes`.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a NormBox>) -> Option<NormBox> {
        get_bound(boxes).map(Self::from_rect)
    }
}

impl HasBBox for NormBox {
    fn x0(&self) -> f64 {
        self.x
    }
    fn y0(&self) -> f64 {
        self.y
    }
    fn x1(&self) -> f64 {
        self.x + self.w
    }
    fn y1(&self) -> f64 {
        self.y + self.h
    }
}
