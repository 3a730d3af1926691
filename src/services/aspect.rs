use crate::models::media::{Classification, Geometry};

/// Allowed deviation from the target ratio, in percent.
const TOLERANCE_PERCENT: u64 = 1;

/// Buckets a frame size into the namespace used for stored objects.
///
/// Ratios are compared by cross-multiplication in `u64`, so `w:h` matches
/// `p:q` when `|w*q - h*p| * 100 <= max(w*q, h*p) * TOLERANCE_PERCENT`.
/// Using the larger product keeps the rule symmetric under rotation.
pub fn classify(geometry: Geometry) -> Classification {
    let Geometry { width, height } = geometry;
    if width == 0 || height == 0 {
        return Classification::Other;
    }

    if matches_ratio(width, height, 16, 9) {
        Classification::Landscape
    } else if matches_ratio(width, height, 9, 16) {
        Classification::Portrait
    } else {
        Classification::Other
    }
}

fn matches_ratio(width: u32, height: u32, p: u64, q: u64) -> bool {
    let lhs = u64::from(width) * q;
    let rhs = u64::from(height) * p;
    lhs.abs_diff(rhs) * 100 <= lhs.max(rhs) * TOLERANCE_PERCENT
}
