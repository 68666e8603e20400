use crate::geometry::offset::{normalize, zero_buffer};
use crate::geometry::validate::is_valid;
use geo::{Area, MultiPolygon};
use tracing::debug;

/// Return a topologically valid version of `multi`.
///
/// Valid input is returned untouched. Otherwise a boolean self-normalization
/// is tried first, then a zero-width buffer. If the buffer swallows a region
/// that had area, the original is handed back so callers can still decide
/// from its emptiness and area. Never fails.
pub fn repair(multi: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if multi.0.is_empty() || is_valid(multi) {
        return multi.clone();
    }

    let normalized = normalize(multi);
    if !normalized.0.is_empty() && is_valid(&normalized) {
        debug!(
            "Repaired invalid geometry by normalization ({} -> {} polygons)",
            multi.0.len(),
            normalized.0.len()
        );
        return normalized;
    }

    let buffered = zero_buffer(multi);
    if buffered.0.is_empty() && multi.unsigned_area() > 0.0 {
        debug!("Zero-width buffer collapsed geometry; keeping original");
        return multi.clone();
    }
    debug!("Repaired invalid geometry with zero-width buffer");
    buffered
}
