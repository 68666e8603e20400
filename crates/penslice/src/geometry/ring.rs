use crate::geometry::validate::ring_is_simple;
use crate::types::Polyline;
use geo::{LineString, Simplify, SimplifyVwPreserve};

/// Simplify a closed ring to within `tolerance` and return it as a closed
/// polyline.
///
/// Simplification must not make the ring cross itself; if Douglas-Peucker
/// does, a topology-preserving Visvalingam pass is used instead. When fewer
/// than three points survive, the original ring is returned. The result
/// always repeats its first point at the end.
pub fn ring_to_polyline(ring: &LineString<f64>, tolerance: f64) -> Polyline {
    if ring.0.len() < 2 {
        return Vec::new();
    }
    let original: Polyline = ring.0.iter().map(|c| (c.x, c.y)).collect();

    let mut points = if tolerance > 0.0 {
        simplify_ring(ring, tolerance).unwrap_or_else(|| original.clone())
    } else {
        original.clone()
    };
    if points.len() < 3 {
        points = original;
    }
    close_loop(&mut points);
    points
}

fn simplify_ring(ring: &LineString<f64>, tolerance: f64) -> Option<Polyline> {
    let candidates = [
        ring.simplify(&tolerance),
        ring.simplify_vw_preserve(&(tolerance * tolerance)),
    ];
    candidates
        .into_iter()
        .find(|candidate| candidate.0.len() >= 4 && ring_is_simple(candidate))
        .map(|candidate| candidate.0.iter().map(|c| (c.x, c.y)).collect())
}

/// Append the first point if the polyline is not already closed.
pub fn close_loop(points: &mut Polyline) {
    if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
        if first != last {
            points.push(first);
        }
    }
}

pub fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Sum of the Euclidean lengths of consecutive segments.
pub fn polyline_length(points: &[(f64, f64)]) -> f64 {
    points
        .windows(2)
        .map(|pair| point_distance(pair[0], pair[1]))
        .sum()
}
