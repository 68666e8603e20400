use crate::config::SlicerConfig;
use crate::geometry::{decompose, offset, repair, ring_to_polyline};
use crate::types::{toolpaths_from_polylines, Polyline, Shape, Toolpath, ToolpathKind};
use geo::{Area, MultiPolygon, Polygon};
use tracing::debug;

const MIN_STEP: f64 = 1e-6;

/// Generate concentric outline loops by repeatedly shrinking the polygon
/// inward by `step`.
///
/// At most `ceil(target_width / step)` passes run; shrinking stops early once
/// the region vanishes. Each pass emits every outer ring followed by its
/// holes, simplified to `tolerance` and closed.
pub fn generate_perimeter_loops(
    polygon: &Polygon<f64>,
    step: f64,
    target_width: f64,
    tolerance: f64,
) -> Vec<Polyline> {
    let step = step.max(MIN_STEP);
    let target_width = target_width.max(step);
    let passes = ((target_width / step).ceil() as usize).max(1);

    let mut loops = Vec::new();
    let mut current = MultiPolygon(vec![polygon.clone()]);
    for pass in 0..passes {
        current = repair(&current);
        if current.0.is_empty() || current.unsigned_area() <= 0.0 {
            debug!("Perimeter region vanished after {} passes", pass);
            break;
        }
        for poly in &current.0 {
            loops.push(ring_to_polyline(poly.exterior(), tolerance));
            for hole in poly.interiors() {
                loops.push(ring_to_polyline(hole, tolerance));
            }
        }
        current = offset(&current, -step);
    }

    loops.retain(|points| points.len() >= 2);
    loops
}

/// Outline loops filling the band of a stroked shape. Filled shapes yield
/// nothing.
pub fn build_stroke_toolpaths(shape: &Shape, config: &SlicerConfig) -> Vec<Toolpath> {
    let Some(stroke_width) = shape.stroke_width else {
        return Vec::new();
    };
    // without a perimeter width the band is traced once
    let step = if config.perimeter.thickness_mm > 0.0 {
        config.perimeter.thickness_mm
    } else {
        stroke_width
    };

    let loops: Vec<Polyline> = decompose(&shape.geometry)
        .iter()
        .flat_map(|polygon| {
            generate_perimeter_loops(
                polygon,
                step,
                stroke_width,
                config.sampling.outline_simplify_tolerance_mm,
            )
        })
        .collect();
    toolpaths_from_polylines(loops, ToolpathKind::Outline, shape.color, shape.brightness)
}

/// Perimeter loops of a filled polygon plus the interior left for infill.
#[derive(Debug, Clone)]
pub struct FillPerimeters {
    pub loops: Vec<Polyline>,
    pub interior: MultiPolygon<f64>,
}

/// Trace `count` perimeters of `thickness` around `polygon`.
///
/// The interior is only eroded by `count - 1` perimeter widths so infill
/// meets the innermost loop.
pub fn generate_fill_perimeters(polygon: &Polygon<f64>, config: &SlicerConfig) -> FillPerimeters {
    let repaired = repair(&MultiPolygon(vec![polygon.clone()]));
    let thickness = config.perimeter.thickness_mm;
    if thickness.is_nan() || thickness <= 0.0 {
        return FillPerimeters {
            loops: Vec::new(),
            interior: repaired,
        };
    }

    let count = config.perimeter.count.max(1);
    let loops = generate_perimeter_loops(
        polygon,
        thickness,
        thickness * count as f64,
        config.sampling.outline_simplify_tolerance_mm,
    );
    let interior_offset = thickness * (count - 1) as f64;
    let interior = if interior_offset > 0.0 {
        repair(&offset(&repaired, -interior_offset))
    } else {
        repaired
    };
    FillPerimeters { loops, interior }
}
