use geo::{EuclideanLength, MinimumRotatedRect, Polygon};

/// Side lengths of the minimum-area rotated rectangle enclosing a polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcrossDimensions {
    pub short: f64,
    pub long: f64,
}

/// Measure a polygon by its minimum-area rotated bounding rectangle.
///
/// Returns `None` for empty input.
pub fn across_dimensions(polygon: &Polygon<f64>) -> Option<AcrossDimensions> {
    let rect = polygon.minimum_rotated_rect()?;
    let (short, long) = rect
        .exterior()
        .lines()
        .map(|edge| edge.euclidean_length())
        .filter(|length| length.is_finite())
        .fold((f64::INFINITY, 0.0_f64), |(short, long), length| {
            (short.min(length), long.max(length))
        });
    if !short.is_finite() {
        return None;
    }
    Some(AcrossDimensions { short, long })
}
