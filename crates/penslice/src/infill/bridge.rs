use crate::geometry::offset::point_in_ring;
use crate::geometry::validate::segment_distance;
use crate::geometry::{point_distance, polyline_length};
use crate::types::Polyline;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{
    Coord, EuclideanLength, Line, LineInterpolatePoint, LineLocatePoint, LineString, Point,
};

/// A closed boundary ring parameterized by arc length.
#[derive(Debug, Clone)]
pub struct LoopPath {
    ring: LineString<f64>,
    length: f64,
    /// `cumulative[i]` is the distance along the loop to vertex `i`.
    cumulative: Vec<f64>,
}

impl LoopPath {
    /// Returns `None` for rings with fewer than two distinct points.
    pub fn new(ring: &[(f64, f64)]) -> Option<Self> {
        let mut points: Vec<(f64, f64)> = Vec::with_capacity(ring.len() + 1);
        for &point in ring {
            if points.last() != Some(&point) {
                points.push(point);
            }
        }
        if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
            if first != last {
                points.push(first);
            }
        }
        if points.len() < 3 {
            return None;
        }
        let ring = LineString::from(points);
        let length = ring.euclidean_length();
        if length <= 0.0 || !length.is_finite() {
            return None;
        }
        let mut cumulative = Vec::with_capacity(ring.0.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for edge in ring.lines() {
            total += edge.euclidean_length();
            cumulative.push(total);
        }
        Some(Self {
            ring,
            length,
            cumulative,
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Distance along the loop of the point closest to `p`, and the distance
    /// from `p` to that point.
    pub fn project(&self, p: (f64, f64)) -> (f64, f64) {
        let Some(fraction) = self.ring.line_locate_point(&Point::new(p.0, p.1)) else {
            return (0.0, f64::INFINITY);
        };
        let along = fraction * self.length;
        (along, point_distance(p, self.interpolate(along)))
    }

    /// Point at distance `along` from the loop start, clamped to the loop.
    pub fn interpolate(&self, along: f64) -> (f64, f64) {
        let fraction = (along / self.length).clamp(0.0, 1.0);
        self.ring
            .line_interpolate_point(fraction)
            .map(|point| (point.x(), point.y()))
            .unwrap_or_else(|| self.vertex(0))
    }

    fn vertex(&self, index: usize) -> (f64, f64) {
        let coord = self.ring.0[index];
        (coord.x, coord.y)
    }

    /// Walk the loop forward from `start` to `end`, wrapping past the seam
    /// when `start > end`.
    pub fn section(&self, start: f64, end: f64) -> Polyline {
        if (start - end).abs() <= 1e-9 {
            return vec![self.interpolate(start)];
        }
        let length = self.length();
        let start = start.clamp(0.0, length);
        let end = end.clamp(0.0, length);
        let mut points = vec![self.interpolate(start)];
        if start <= end {
            self.push_vertices_between(start, end, &mut points);
        } else {
            self.push_vertices_between(start, length, &mut points);
            points.push(self.vertex(0));
            self.push_vertices_between(0.0, end, &mut points);
        }
        points.push(self.interpolate(end));
        points
    }

    fn push_vertices_between(&self, from: f64, to: f64, points: &mut Polyline) {
        for (i, &along) in self.cumulative.iter().enumerate() {
            if along > from && along < to {
                points.push(self.vertex(i));
            }
        }
    }
}

/// Shortest path along one of `loops` from `start` to `end`.
///
/// Both points must lie within `2 * snap_tolerance` of the same loop. Both
/// walking directions are tried; the result begins at `start` and ends at
/// `end` exactly.
pub fn perimeter_glide_path(
    start: (f64, f64),
    end: (f64, f64),
    loops: &[LoopPath],
    snap_tolerance: f64,
) -> Option<Polyline> {
    let check = (snap_tolerance * 2.0).max(1e-6);
    let mut best: Option<(f64, Polyline)> = None;

    for path_loop in loops {
        let (start_along, start_off) = path_loop.project(start);
        if start_off > check {
            continue;
        }
        let (end_along, end_off) = path_loop.project(end);
        if end_off > check {
            continue;
        }
        let forward = path_loop.section(start_along, end_along);
        let mut backward = path_loop.section(end_along, start_along);
        backward.reverse();

        for candidate in [forward, backward] {
            let Some(path) = pin_endpoints(candidate, start, end) else {
                continue;
            };
            let length = polyline_length(&path);
            if best.as_ref().map_or(true, |(best_len, _)| length < best_len - 1e-9) {
                best = Some((length, path));
            }
        }
    }
    best.map(|(_, path)| path)
}

fn pin_endpoints(mut path: Polyline, start: (f64, f64), end: (f64, f64)) -> Option<Polyline> {
    if path.is_empty() {
        return None;
    }
    path[0] = start;
    let last = path.len() - 1;
    path[last] = end;

    let mut deduped: Polyline = Vec::with_capacity(path.len());
    for point in path {
        if deduped.last().map_or(true, |prev| point_distance(*prev, point) > 1e-9) {
            deduped.push(point);
        }
    }
    (deduped.len() >= 2).then_some(deduped)
}

/// Whether the straight segment `a`-`b` stays inside the region bounded by
/// `rings` (boundary included).
pub fn segment_inside(a: (f64, f64), b: (f64, f64), rings: &[Vec<(f64, f64)>]) -> bool {
    let probe = Line::new(Coord { x: a.0, y: a.1 }, Coord { x: b.0, y: b.1 });
    for ring in rings {
        for edge in ring.windows(2) {
            let edge = Line::new(
                Coord {
                    x: edge[0].0,
                    y: edge[0].1,
                },
                Coord {
                    x: edge[1].0,
                    y: edge[1].1,
                },
            );
            if let Some(LineIntersection::SinglePoint {
                is_proper: true, ..
            }) = line_intersection(probe, edge)
            {
                return false;
            }
        }
    }
    let mid = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    let on_boundary = rings.iter().any(|ring| {
        ring.windows(2)
            .any(|e| segment_distance(mid, e[0], e[1]) <= 1e-9)
    });
    on_boundary || rings.iter().filter(|ring| point_in_ring(mid, ring)).count() % 2 == 1
}
