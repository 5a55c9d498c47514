//! Conversions between PDF points, millimetres and normalized page space.

use crate::error::{Result, UnredactError};

/// 1 PDF point = 1/72 inch = 0.352778 mm.
pub const PT_TO_MM: f64 = 25.4 / 72.0;

/// Converts PDF points to millimetres.
#[inline]
pub fn pts_to_mm(pts: f64) -> f64 {
    pts * PT_TO_MM
}

/// Normalizes `value` by `page_extent` (same unit), clamped to `[0, 1]`.
pub fn normalise(value: f64, page_extent: f64) -> Result<f64> {
    if page_extent.is_nan() || page_extent <= 0.0 {
        return Err(UnredactError::InvalidInput(format!(
            "page extent must be positive, got {page_extent}"
        )));
    }
    Ok((value / page_extent).clamp(0.0, 1.0))
}

/// Converts a normalized `[0, 1]` value back to millimetres.
#[inline]
pub fn denormalise_to_mm(norm: f64, page_extent_mm: f64) -> f64 {
    norm * page_extent_mm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::approx_eq;

    #[test]
    fn test_pts_to_mm_inch() {
        assert!(approx_eq(pts_to_mm(72.0), 25.4, 1e-12));
        assert_eq!(pts_to_mm(0.0), 0.0);
    }

    #[test]
    fn test_normalise_clamps() {
        assert!(approx_eq(normalise(50.0, 100.0).unwrap(), 0.5, 1e-12));
        assert_eq!(normalise(-10.0, 100.0).unwrap(), 0.0);
        assert_eq!(normalise(150.0, 100.0).unwrap(), 1.0);
    }

    #[test]
    fn test_normalise_rejects_non_positive_extent() {
        let err = normalise(50.0, 0.0).unwrap_err();
        assert!(err.to_string().contains("positive"));
        assert!(normalise(50.0, -210.0).is_err());
        assert!(normalise(50.0, f64::NAN).is_err());
    }

    #[test]
    fn test_denormalise_gap_on_a4() {
        assert!(approx_eq(denormalise_to_mm(0.20, 210.0), 42.0, 1e-9));
        assert!(approx_eq(denormalise_to_mm(1.0, 210.0), 210.0, 1e-12));
    }
}
