use clipper2::{
    difference as clip_difference, inflate, EndType, JoinType, Path, PathType,
    Polygon as ClipPolygon, Polygons, Vertex,
};
use geo::algorithm::orient::{Direction, Orient};
use geo::{BooleanOps, LineString, MultiPolygon, Polygon};

/// Maximum deviation of rounded offset corners from the true arc, in mm.
const ARC_TOLERANCE: f64 = 0.01;
/// Miter limit handed to clipper; unused for round joins.
const MITER_LIMIT: f64 = 2.0;
/// Rings with less area than this are treated as collapsed.
const MIN_RING_AREA: f64 = 1e-12;

/// Offset every ring of `multi` by `delta`.
///
/// Positive deltas dilate the region and negative deltas erode it. Holes are
/// handled by clipper2 from ring orientation, so the input is re-oriented
/// (exterior CCW, holes CW) before offsetting.
pub fn offset(multi: &MultiPolygon<f64>, delta: f64) -> MultiPolygon<f64> {
    if multi.0.is_empty() {
        return MultiPolygon(Vec::new());
    }
    let result = inflate(
        to_clipper(multi),
        delta,
        JoinType::Round,
        EndType::ClosedPolygon,
        MITER_LIMIT,
        ARC_TOLERANCE,
    );
    from_clipper(&result)
}

/// Rebuild `multi` through a boolean pass, resolving self-intersections and
/// overlapping rings under clipper's fill rule.
pub fn normalize(multi: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if multi.0.is_empty() {
        return MultiPolygon(Vec::new());
    }
    let result = clip_difference(to_clipper(multi), Polygons::new(Vec::new()));
    from_clipper(&result)
}

/// Offset by zero, the classic "buffer(0)" cleanup.
pub fn zero_buffer(multi: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    offset(multi, 0.0)
}

pub fn union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    a.union(b)
}

pub fn intersection(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    a.intersection(b)
}

pub fn difference(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    a.difference(b)
}

fn to_clipper(multi: &MultiPolygon<f64>) -> Polygons {
    let polygons = multi
        .0
        .iter()
        .map(|polygon| {
            let oriented = polygon.orient(Direction::Default);
            let mut paths = vec![ring_to_path(oriented.exterior())];
            paths.extend(oriented.interiors().iter().map(ring_to_path));
            ClipPolygon::new(paths, PathType::Subject)
        })
        .collect();
    Polygons::new(polygons)
}

fn ring_to_path(ring: &LineString<f64>) -> Path {
    let mut coords = ring.0.as_slice();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords = &coords[..coords.len() - 1];
    }
    let vertices = coords.iter().map(|c| Vertex::new(c.x, c.y)).collect();
    Path::new(vertices, true)
}

fn from_clipper(polygons: &Polygons) -> MultiPolygon<f64> {
    let mut rings = Vec::new();
    for polygon in polygons.polygons() {
        for path in polygon.paths() {
            let points: Vec<(f64, f64)> =
                path.vertices().iter().map(|v| (v.x(), v.y())).collect();
            rings.push(points);
        }
    }
    assemble_rings(rings)
}

struct RingInfo {
    points: Vec<(f64, f64)>,
    area: f64,
    probe: (f64, f64),
}

/// Group loose rings into polygons-with-holes by containment depth.
///
/// Rings at even depth become shells, rings at odd depth become holes of the
/// smallest ring containing them. Orientation of the input is ignored.
pub(crate) fn assemble_rings(rings: Vec<Vec<(f64, f64)>>) -> MultiPolygon<f64> {
    let mut infos: Vec<RingInfo> = rings
        .into_iter()
        .filter_map(|ring| {
            let points = dedupe_ring(ring);
            if points.len() < 3 {
                return None;
            }
            let area = signed_area(&points).abs();
            if area <= MIN_RING_AREA {
                return None;
            }
            let probe = (
                (points[0].0 + points[1].0) / 2.0,
                (points[0].1 + points[1].1) / 2.0,
            );
            Some(RingInfo {
                points,
                area,
                probe,
            })
        })
        .collect();
    infos.sort_by(|a, b| b.area.total_cmp(&a.area));

    let mut depth = vec![0usize; infos.len()];
    let mut parent = vec![None; infos.len()];
    for i in 0..infos.len() {
        for j in (0..i).rev() {
            if point_in_ring(infos[i].probe, &infos[j].points) {
                parent[i] = Some(j);
                depth[i] = depth[j] + 1;
                break;
            }
        }
    }

    let mut shells: Vec<(usize, Vec<LineString<f64>>)> = Vec::new();
    let mut shell_slot = vec![None; infos.len()];
    for i in 0..infos.len() {
        if depth[i] % 2 == 0 {
            shell_slot[i] = Some(shells.len());
            shells.push((i, Vec::new()));
        }
    }
    for i in 0..infos.len() {
        if depth[i] % 2 == 1 {
            if let Some(slot) = parent[i].and_then(|p| shell_slot[p]) {
                shells[slot].1.push(closed_line_string(&infos[i].points));
            }
        }
    }

    let polygons = shells
        .into_iter()
        .map(|(index, holes)| {
            Polygon::new(closed_line_string(&infos[index].points), holes)
                .orient(Direction::Default)
        })
        .collect();
    MultiPolygon(polygons)
}

fn dedupe_ring(ring: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(ring.len());
    for point in ring {
        if !point.0.is_finite() || !point.1.is_finite() {
            continue;
        }
        if points.last().map_or(true, |last| !same_point(*last, point)) {
            points.push(point);
        }
    }
    while points.len() > 1 && same_point(points[0], points[points.len() - 1]) {
        points.pop();
    }
    points
}

fn same_point(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
}

fn closed_line_string(points: &[(f64, f64)]) -> LineString<f64> {
    let mut coords = points.to_vec();
    if let Some(first) = coords.first().copied() {
        coords.push(first);
    }
    coords.into()
}

pub(crate) fn signed_area(points: &[(f64, f64)]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % n];
        sum += x1 * y2 - x2 * y1;
    }
    sum / 2.0
}

/// Even-odd point-in-ring test; the ring may be open or closed.
pub(crate) fn point_in_ring(point: (f64, f64), ring: &[(f64, f64)]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let (x, y) = point;
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
