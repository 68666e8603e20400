//! Angled rectilinear infill with boustrophedon chaining.

pub mod bridge;
pub mod scanline;
pub mod stitch;

use crate::config::InfillConfig;
use crate::types::Polyline;
use geo::{Area, Centroid, Polygon};
use kurbo::{Affine, Point};
use tracing::{debug, warn};

use scanline::{clip_scanline, scan_rows};

pub use stitch::{GreedyNearest, RunBuilder, StitchContext, StitchStrategy};

const MIN_BASE_SPACING: f64 = 0.01;
const MIN_DENSITY: f64 = 1e-3;
const MIN_SNAP_TOLERANCE: f64 = 1e-4;

/// Fill density for a shape of the given brightness: black maps to
/// `max_density`, white to `min_density`.
pub fn brightness_to_density(brightness: f64, config: &InfillConfig) -> f64 {
    let brightness = if brightness.is_finite() {
        brightness.clamp(0.0, 1.0)
    } else {
        0.0
    };
    config.min_density + (1.0 - brightness) * (config.max_density - config.min_density)
}

/// Distance between neighbouring scan lines at `density`.
pub fn line_spacing(density: f64, base_spacing: f64) -> f64 {
    base_spacing.max(MIN_BASE_SPACING) / density.max(MIN_DENSITY)
}

/// Fill `polygon` with scan lines at every configured angle, chained with
/// the default greedy strategy.
pub fn generate_rectilinear_infill(
    polygon: &Polygon<f64>,
    density: f64,
    config: &InfillConfig,
) -> Vec<Polyline> {
    generate_rectilinear_infill_with(polygon, density, config, &GreedyNearest)
}

pub fn generate_rectilinear_infill_with(
    polygon: &Polygon<f64>,
    density: f64,
    config: &InfillConfig,
    strategy: &dyn StitchStrategy,
) -> Vec<Polyline> {
    if polygon.exterior().0.len() < 4 || polygon.unsigned_area() <= 0.0 {
        return Vec::new();
    }
    let density = density.max(config.min_density).min(config.max_density);
    if density <= 0.0 {
        return Vec::new();
    }
    let Some(centroid) = polygon.centroid() else {
        return Vec::new();
    };

    let base_spacing = config.base_line_spacing_mm.max(MIN_BASE_SPACING);
    let spacing = line_spacing(density, config.base_line_spacing_mm);
    let snap_tolerance = (spacing.min(base_spacing) / 4.0).max(MIN_SNAP_TOLERANCE);
    let link_gap = spacing * config.link_gap_factor.max(0.0);
    if config.link_gap_factor < 0.0 {
        warn!("Negative link gap factor {} clamped to 0", config.link_gap_factor);
    }

    let rings = polygon_rings(polygon);
    let ctx = StitchContext::new(rings.clone(), link_gap, snap_tolerance);
    let origin = Point::new(centroid.x(), centroid.y());

    let mut passes = Vec::with_capacity(config.angles_degrees.len());
    for (index, angle) in config.angles_degrees.iter().enumerate() {
        let mut segments = sweep(&rings, angle.to_radians(), origin, spacing);
        if index % 2 == 1 {
            segments.reverse();
        }
        let runs = strategy.merge(segments, &ctx);
        debug!("Infill pass at {}° produced {} runs", angle, runs.len());
        passes.push(runs);
    }

    let ordered = strategy.interleave(passes);
    strategy.glue(ordered, &ctx)
}

/// Scan segments for one angle in row order, every other segment reversed.
fn sweep(rings: &[Vec<(f64, f64)>], angle: f64, origin: Point, spacing: f64) -> Vec<Polyline> {
    let to_scan = Affine::rotate_about(-angle, origin);
    let from_scan = Affine::rotate_about(angle, origin);

    let rotated: Vec<Vec<(f64, f64)>> = rings
        .iter()
        .map(|ring| transform_points(to_scan, ring))
        .collect();
    let (min_y, max_y) = rotated
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.1), hi.max(p.1))
        });
    if !min_y.is_finite() || !max_y.is_finite() {
        return Vec::new();
    }

    scan_rows(min_y, max_y, spacing)
        .into_iter()
        .flat_map(|y| clip_scanline(&rotated, y))
        .enumerate()
        .map(|(index, span)| {
            let mut segment = transform_points(from_scan, &span);
            if index % 2 == 1 {
                segment.reverse();
            }
            segment
        })
        .collect()
}

fn transform_points(affine: Affine, points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|&(x, y)| {
            let p = affine * Point::new(x, y);
            (p.x, p.y)
        })
        .collect()
}

/// Exterior and hole rings as closed point lists.
fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Vec<(f64, f64)>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .filter(|ring| ring.0.len() >= 4)
        .map(|ring| ring.0.iter().map(|c| (c.x, c.y)).collect())
        .collect()
}
