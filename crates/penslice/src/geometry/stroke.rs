use crate::geometry::offset::{assemble_rings, offset, union};
use crate::geometry::repair::repair;
use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};
use geo::{BooleanOps, MultiPolygon, Polygon};
use std::f64::consts::PI;
use tracing::debug;

/// Largest angle spanned by one chord when flattening offset arcs.
const ARC_STEP: f64 = PI / 16.0;

/// Outline the band swept by a pen of `width` along `points`.
///
/// Closed input (first point repeated at the end) yields a ring-shaped band
/// between the outward and inward offsets. Open input yields a band with flat
/// caps built from the two one-sided cavalier offsets. Degenerate input
/// yields an empty result.
pub fn stroke_outline(points: &[(f64, f64)], width: f64) -> MultiPolygon<f64> {
    let radius = width / 2.0;
    let points = dedupe(points);
    if radius <= 0.0 || points.len() < 2 {
        return MultiPolygon(Vec::new());
    }

    let is_closed = points.len() >= 4 && points.first() == points.last();
    if is_closed {
        return closed_band(&points, radius);
    }
    open_band(&points, radius)
}

fn closed_band(points: &[(f64, f64)], radius: f64) -> MultiPolygon<f64> {
    let ring = repair(&MultiPolygon(vec![Polygon::new(points.to_vec().into(), vec![])]));
    let outer = offset(&ring, radius);
    let inner = offset(&ring, -radius);
    if inner.0.is_empty() {
        return outer;
    }
    outer.difference(&inner)
}

fn open_band(points: &[(f64, f64)], radius: f64) -> MultiPolygon<f64> {
    let pline = create_polyline(points);
    let left = pline.parallel_offset(radius);
    let right = pline.parallel_offset(-radius);

    if let ([left], [right]) = (left.as_slice(), right.as_slice()) {
        let mut ring = extract_points(left);
        let mut back = extract_points(right);
        back.reverse();
        ring.extend(back);
        let band = repair(&assemble_rings(vec![ring]));
        if !band.0.is_empty() {
            return band;
        }
    }

    debug!(
        "Offset of open stroke split into {} + {} pieces; using segment union",
        left.len(),
        right.len()
    );
    segment_union(points, radius)
}

/// Union of one flat-capped rectangle per segment.
fn segment_union(points: &[(f64, f64)], radius: f64) -> MultiPolygon<f64> {
    let mut band = MultiPolygon(Vec::new());
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = (b.0 - a.0).hypot(b.1 - a.1);
        if length <= f64::EPSILON {
            continue;
        }
        let (nx, ny) = (-(b.1 - a.1) / length * radius, (b.0 - a.0) / length * radius);
        let quad = Polygon::new(
            vec![
                (a.0 + nx, a.1 + ny),
                (b.0 + nx, b.1 + ny),
                (b.0 - nx, b.1 - ny),
                (a.0 - nx, a.1 - ny),
                (a.0 + nx, a.1 + ny),
            ]
            .into(),
            vec![],
        );
        band = union(&band, &MultiPolygon(vec![quad]));
    }
    band
}

fn dedupe(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut clean: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    for &point in points {
        let keep = clean
            .last()
            .map_or(true, |prev| (prev.0 - point.0).abs() > 1e-9 || (prev.1 - point.1).abs() > 1e-9);
        if keep {
            clean.push(point);
        }
    }
    clean
}

fn create_polyline(points: &[(f64, f64)]) -> Polyline {
    let mut pline = Polyline::new();
    for &(x, y) in points {
        pline.add_vertex(PlineVertex::new(x, y, 0.0));
    }
    pline.set_is_closed(false);
    pline
}

fn extract_points(pline: &Polyline) -> Vec<(f64, f64)> {
    let count = pline.vertex_count();
    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let v = pline.at(i);
        points.push((v.x, v.y));
        let is_last = i + 1 == count;
        if is_last && !pline.is_closed() {
            break;
        }
        if v.bulge.abs() > 1e-9 {
            let next = pline.at((i + 1) % count);
            points.extend(tessellate_arc((v.x, v.y), (next.x, next.y), v.bulge));
        }
    }
    points
}

/// Interior points of the arc from `start` to `end` described by `bulge`.
fn tessellate_arc(start: (f64, f64), end: (f64, f64), bulge: f64) -> Vec<(f64, f64)> {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let chord = dx.hypot(dy);
    if chord < 1e-9 {
        return Vec::new();
    }
    let sweep = 4.0 * bulge.atan();
    let (mx, my) = ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0);
    let (nx, ny) = (-dy / chord, dx / chord);
    let center_offset = (chord / 2.0) / (sweep / 2.0).tan();
    let center = (mx + nx * center_offset, my + ny * center_offset);
    let radius = (start.0 - center.0).hypot(start.1 - center.1);
    let start_angle = (start.1 - center.1).atan2(start.0 - center.0);

    let steps = (sweep.abs() / ARC_STEP).ceil().max(1.0) as usize;
    (1..steps)
        .map(|k| {
            let angle = start_angle + sweep * k as f64 / steps as f64;
            (center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, BoundingRect};

    #[test]
    fn test_straight_stroke_is_rectangle() {
        let band = stroke_outline(&[(0.0, 0.0), (10.0, 0.0)], 2.0);
        assert_eq!(band.0.len(), 1);
        assert!((band.unsigned_area() - 20.0).abs() < 1e-6);
        let bounds = band.bounding_rect().expect("bounds");
        assert!((bounds.min().y + 1.0).abs() < 1e-9);
        assert!((bounds.max().y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bent_stroke_covers_both_legs() {
        let band = stroke_outline(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)], 1.0);
        assert!(!band.0.is_empty());
        // two 10 x 1 legs, overlapping near the corner
        let area = band.unsigned_area();
        assert!(area > 19.0 && area < 21.5, "unexpected area {area}");
    }

    #[test]
    fn test_closed_stroke_has_hole() {
        let ring = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)];
        let band = stroke_outline(&ring, 1.0);
        assert_eq!(band.0.len(), 1);
        assert_eq!(band.0[0].interiors().len(), 1);
    }

    #[test]
    fn test_zero_width_is_empty() {
        assert!(stroke_outline(&[(0.0, 0.0), (1.0, 0.0)], 0.0).0.is_empty());
        assert!(stroke_outline(&[(0.0, 0.0)], 1.0).0.is_empty());
    }

    #[test]
    fn test_quarter_arc_tessellation() {
        // bulge of tan(pi/8) is a quarter circle
        let points = tessellate_arc((1.0, 0.0), (0.0, 1.0), (PI / 8.0).tan());
        assert!(!points.is_empty());
        for (x, y) in points {
            assert!((x.hypot(y) - 1.0).abs() < 1e-9);
        }
    }
}
