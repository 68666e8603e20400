use crate::geometry::offset::{point_in_ring, signed_area};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line, LineString, MultiPolygon, Polygon};

/// Report whether `multi` is a topologically valid set of polygons.
///
/// Rings must be closed, finite and free of self-intersections; rings of one
/// polygon may only touch at isolated points; holes must sit inside their
/// shell and outside each other; distinct polygons must not overlap.
pub fn is_valid(multi: &MultiPolygon<f64>) -> bool {
    if !multi.0.iter().all(is_valid_polygon) {
        return false;
    }
    for (i, a) in multi.0.iter().enumerate() {
        for b in multi.0.iter().skip(i + 1) {
            if polygons_overlap(a, b) {
                return false;
            }
        }
    }
    true
}

pub fn is_valid_polygon(polygon: &Polygon<f64>) -> bool {
    let rings: Vec<&LineString<f64>> = std::iter::once(polygon.exterior())
        .chain(polygon.interiors().iter())
        .collect();
    if !rings.iter().all(|ring| ring_is_well_formed(ring)) {
        return false;
    }
    if signed_area(&ring_points(polygon.exterior())).abs() <= f64::EPSILON {
        return false;
    }

    let edges = collect_edges(&rings);
    if edges_conflict(&edges) {
        return false;
    }

    let shell = ring_points(polygon.exterior());
    let holes: Vec<Vec<(f64, f64)>> = polygon.interiors().iter().map(ring_points).collect();
    for (i, hole) in holes.iter().enumerate() {
        let Some(probe) = interior_probe(hole, &shell) else {
            continue;
        };
        if !point_in_ring(probe, &shell) {
            return false;
        }
        for (j, other) in holes.iter().enumerate() {
            if i != j && point_in_ring(probe, other) {
                return false;
            }
        }
    }
    true
}

/// True if the ring, viewed on its own, does not cross or touch itself.
pub fn ring_is_simple(ring: &LineString<f64>) -> bool {
    ring_is_well_formed(ring) && !edges_conflict(&collect_edges(&[ring]))
}

fn ring_is_well_formed(ring: &LineString<f64>) -> bool {
    let coords = &ring.0;
    coords.len() >= 4
        && coords.first() == coords.last()
        && coords.iter().all(|c| c.x.is_finite() && c.y.is_finite())
}

fn ring_points(ring: &LineString<f64>) -> Vec<(f64, f64)> {
    let mut points: Vec<(f64, f64)> = ring.0.iter().map(|c| (c.x, c.y)).collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// A vertex of `ring` that does not lie on `other`, used for containment tests.
fn interior_probe(ring: &[(f64, f64)], other: &[(f64, f64)]) -> Option<(f64, f64)> {
    ring.iter()
        .copied()
        .find(|p| !point_on_ring(*p, other))
        .or_else(|| ring.first().copied())
}

fn point_on_ring(point: (f64, f64), ring: &[(f64, f64)]) -> bool {
    let n = ring.len();
    (0..n).any(|i| {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        segment_distance(point, a, b) < 1e-12
    })
}

pub(crate) fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

#[derive(Clone, Copy)]
struct Edge {
    line: Line<f64>,
    ring: usize,
    index: usize,
    ring_len: usize,
    min_x: f64,
    max_x: f64,
}

fn collect_edges(rings: &[&LineString<f64>]) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (ring_index, ring) in rings.iter().enumerate() {
        let ring_len = ring.0.len().saturating_sub(1);
        for (index, line) in ring.lines().enumerate() {
            if line.start == line.end {
                continue;
            }
            edges.push(Edge {
                line,
                ring: ring_index,
                index,
                ring_len,
                min_x: line.start.x.min(line.end.x),
                max_x: line.start.x.max(line.end.x),
            });
        }
    }
    edges.sort_by(|a, b| a.min_x.total_cmp(&b.min_x));
    edges
}

/// Sort-and-sweep over x extents; reports the first forbidden contact.
fn edges_conflict(edges: &[Edge]) -> bool {
    for (i, a) in edges.iter().enumerate() {
        for b in &edges[i + 1..] {
            if b.min_x > a.max_x {
                break;
            }
            if edge_pair_conflicts(a, b) {
                return true;
            }
        }
    }
    false
}

fn edge_pair_conflicts(a: &Edge, b: &Edge) -> bool {
    let Some(hit) = line_intersection(a.line, b.line) else {
        return false;
    };
    match hit {
        LineIntersection::Collinear { .. } => true,
        LineIntersection::SinglePoint {
            intersection,
            is_proper,
        } => {
            if is_proper {
                return true;
            }
            if a.ring != b.ring {
                // rings of one polygon may touch at a point
                return false;
            }
            !(adjacent(a, b) && is_shared_vertex(a, b, intersection))
        }
    }
}

fn adjacent(a: &Edge, b: &Edge) -> bool {
    let n = a.ring_len;
    n > 0 && ((a.index + 1) % n == b.index || (b.index + 1) % n == a.index)
}

fn is_shared_vertex(a: &Edge, b: &Edge, point: Coord<f64>) -> bool {
    let ends = [a.line.start, a.line.end];
    ends.contains(&point) && (b.line.start == point || b.line.end == point)
}

fn polygons_overlap(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    let shell_a = ring_points(a.exterior());
    let shell_b = ring_points(b.exterior());
    let edges_a = collect_edges(&[a.exterior()]);
    let edges_b = collect_edges(&[b.exterior()]);
    for ea in &edges_a {
        for eb in &edges_b {
            if ea.max_x < eb.min_x || eb.max_x < ea.min_x {
                continue;
            }
            match line_intersection(ea.line, eb.line) {
                Some(LineIntersection::SinglePoint { is_proper: true, .. }) => return true,
                Some(LineIntersection::Collinear { .. }) => return true,
                _ => {}
            }
        }
    }
    let inside_hole = |probe: (f64, f64), polygon: &Polygon<f64>| {
        polygon
            .interiors()
            .iter()
            .any(|hole| point_in_ring(probe, &ring_points(hole)))
    };
    if let Some(probe) = interior_probe(&shell_a, &shell_b) {
        if point_in_ring(probe, &shell_b) && !inside_hole(probe, b) {
            return true;
        }
    }
    if let Some(probe) = interior_probe(&shell_b, &shell_a) {
        if point_in_ring(probe, &shell_a) && !inside_hole(probe, a) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::square;

    fn polygon(points: Vec<(f64, f64)>) -> Polygon<f64> {
        Polygon::new(points.into(), vec![])
    }

    #[test]
    fn test_square_is_valid() {
        assert!(is_valid_polygon(&square(0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_bowtie_is_invalid() {
        let bowtie = polygon(vec![
            (0.0, 0.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        assert!(!is_valid_polygon(&bowtie));
    }

    #[test]
    fn test_hole_outside_shell_is_invalid() {
        let shell = square(0.0, 0.0, 10.0);
        let hole = square(20.0, 20.0, 2.0);
        let polygon = Polygon::new(shell.exterior().clone(), vec![hole.exterior().clone()]);
        assert!(!is_valid_polygon(&polygon));
    }

    #[test]
    fn test_hole_inside_shell_is_valid() {
        let shell = square(0.0, 0.0, 10.0);
        let hole = square(2.0, 2.0, 2.0);
        let polygon = Polygon::new(shell.exterior().clone(), vec![hole.exterior().clone()]);
        assert!(is_valid_polygon(&polygon));
    }

    #[test]
    fn test_zero_area_is_invalid() {
        let flat = polygon(vec![(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (0.0, 0.0)]);
        assert!(!is_valid_polygon(&flat));
    }

    #[test]
    fn test_overlapping_multipolygon_is_invalid() {
        let multi = MultiPolygon(vec![square(0.0, 0.0, 10.0), square(5.0, 5.0, 10.0)]);
        assert!(!is_valid(&multi));
        let apart = MultiPolygon(vec![square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)]);
        assert!(is_valid(&apart));
    }

    #[test]
    fn test_segment_distance() {
        assert!((segment_distance((5.0, 3.0), (0.0, 0.0), (10.0, 0.0)) - 3.0).abs() < 1e-12);
        assert!((segment_distance((13.0, 4.0), (0.0, 0.0), (10.0, 0.0)) - 5.0).abs() < 1e-12);
    }
}
