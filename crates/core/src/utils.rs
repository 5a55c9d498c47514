//! Geometric helpers shared by the pipeline stages.
//!
//! All boxes handled here live in normalized page space: `(0, 0)` is the
//! top-left corner of the page and `(1, 1)` the bottom-right, so `y0` is the
//! top edge and `y1` the bottom edge.

use std::cmp::Ordering;

/// Small epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1e-9;

/// A rectangle defined by (x0, y0, x1, y1), top-left to bottom-right.
pub type Rect = (f64, f64, f64, f64);

/// Compares two floats for approximate equality.
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Total order on f64 for sort keys; NaN sorts last.
#[inline]
pub fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Trait for objects that have a bounding box.
pub trait HasBBox {
    fn x0(&self) -> f64;
    fn y0(&self) -> f64;
    fn x1(&self) -> f64;
    fn y1(&self) -> f64;

    fn bbox(&self) -> Rect {
        (self.x0(), self.y0(), self.x1(), self.y1())
    }

    fn width(&self) -> f64 {
        self.x1() - self.x0()
    }

    fn height(&self) -> f64 {
        self.y1() - self.y0()
    }

    fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Returns true if there is horizontal overlap with another box.
    fn is_hoverlap(&self, other: &impl HasBBox) -> bool {
        other.x0() <= self.x1() && self.x0() <= other.x1()
    }

    /// Returns the amount of horizontal overlap with another box.
    fn hoverlap(&self, other: &impl HasBBox) -> f64 {
        (self.x1().min(other.x1()) - self.x0().max(other.x0())).max(0.0)
    }

    /// Returns the horizontal distance to another box.
    /// Returns 0 if they overlap.
    fn hdistance(&self, other: &impl HasBBox) -> f64 {
        if self.is_hoverlap(other) {
            0.0
        } else {
            (self.x0() - other.x1()).abs().min((self.x1() - other.x0()).abs())
        }
    }

    /// Returns the amount of vertical overlap with another box.
    fn voverlap(&self, other: &impl HasBBox) -> f64 {
        (self.y1().min(other.y1()) - self.y0().max(other.y0())).max(0.0)
    }

    /// Area shared with another box.
    fn intersection_area(&self, other: &impl HasBBox) -> f64 {
        self.hoverlap(other) * self.voverlap(other)
    }

    /// Intersection area divided by this box's own area.
    fn intersection_over_self(&self, other: &impl HasBBox) -> f64 {
        let area = self.area();
        if area > 0.0 {
            self.intersection_area(other) / area
        } else {
            0.0
        }
    }

    /// Intersection over union.
    fn iou(&self, other: &impl HasBBox) -> f64 {
        let inter = self.intersection_area(other);
        let union = self.area() + other.area() - inter;
        if union > 0.0 { inter / union } else { 0.0 }
    }
}

impl HasBBox for Rect {
    fn x0(&self) -> f64 {
        self.0
    }
    fn y0(&self) -> f64 {
        self.1
    }
    fn x1(&self) -> f64 {
        self.2
    }
    fn y1(&self) -> f64 {
        self.3
    }
}

/// Returns the tight bounding rectangle of a sequence of boxes, or `None`
/// for an empty sequence.
pub fn get_bound<'a, B, I>(boxes: I) -> Option<Rect>
where
    B: HasBBox + 'a,
    I: IntoIterator<Item = &'a B>,
{
    boxes.into_iter().fold(None, |acc, b| {
        let (x0, y0, x1, y1) = acc.unwrap_or((f64::MAX, f64::MAX, f64::MIN, f64::MIN));
        Some((
            x0.min(b.x0()),
            y0.min(b.y0()),
            x1.max(b.x1()),
            y1.max(b.y1()),
        ))
    })
}
