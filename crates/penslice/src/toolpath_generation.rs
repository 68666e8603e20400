use crate::color::{plan_color_sequence, ColorPlan};
use crate::config::SlicerConfig;
use crate::error::SliceError;
use crate::geometry::{decompose, repair, Geometry};
use crate::infill::{brightness_to_density, generate_rectilinear_infill};
use crate::perimeter::{build_stroke_toolpaths, generate_fill_perimeters};
use crate::regions::select_infill_regions;
use crate::types::{toolpaths_from_polylines, Shape, Toolpath, ToolpathKind};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of a slicing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SliceOutput {
    /// Toolpaths in drawing order. In color mode this follows the color plan
    /// and every toolpath carries its assigned color.
    pub toolpaths: Vec<Toolpath>,
    pub color_plan: Option<ColorPlan>,
}

impl SliceOutput {
    pub fn total_length(&self) -> f64 {
        self.toolpaths.iter().map(Toolpath::length).sum()
    }

    pub fn count(&self, kind: ToolpathKind) -> usize {
        self.toolpaths.iter().filter(|t| t.kind == kind).count()
    }
}

/// Slice shapes into ordered toolpaths, planning colors when color mode is on.
pub fn slice_shapes(shapes: &[Shape], config: &SlicerConfig) -> Result<SliceOutput, SliceError> {
    slice_shapes_with_progress(shapes, config, &mut |_: &str| {})
}

/// [`slice_shapes`] reporting human-readable progress messages.
pub fn slice_shapes_with_progress(
    shapes: &[Shape],
    config: &SlicerConfig,
    progress: &mut dyn FnMut(&str),
) -> Result<SliceOutput, SliceError> {
    config.validate()?;
    let toolpaths = generate_toolpaths_for_shapes(shapes, config, progress)?;

    let printer = &config.printer;
    if !printer.color_mode {
        return Ok(SliceOutput {
            toolpaths,
            color_plan: None,
        });
    }
    let palette = printer.palette()?;
    if palette.is_empty() {
        return Ok(SliceOutput {
            toolpaths,
            color_plan: None,
        });
    }

    progress("Planning color order…");
    let plan = plan_color_sequence(toolpaths, &palette, printer.gray_saturation_threshold);
    info!(
        "Color plan: {}",
        plan.ordered_colors()
            .iter()
            .map(|c| c.to_hex())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(SliceOutput {
        toolpaths: plan.toolpaths().cloned().collect(),
        color_plan: Some(plan),
    })
}

/// Generate toolpaths for every shape, failing when there is nothing to draw.
pub fn generate_toolpaths_for_shapes(
    shapes: &[Shape],
    config: &SlicerConfig,
    progress: &mut dyn FnMut(&str),
) -> Result<Vec<Toolpath>, SliceError> {
    if shapes.is_empty() {
        return Err(SliceError::NoDrawableShapes);
    }
    progress("Generating toolpaths…");
    let toolpaths = build_toolpaths(shapes, config, progress);
    if toolpaths.is_empty() {
        return Err(SliceError::NoToolpaths);
    }
    info!(
        "Generated {} toolpaths ({} outline, {} infill) from {} shapes",
        toolpaths.len(),
        toolpaths.iter().filter(|t| t.kind == ToolpathKind::Outline).count(),
        toolpaths.iter().filter(|t| t.kind == ToolpathKind::Infill).count(),
        shapes.len()
    );
    progress("Toolpaths ready.");
    Ok(toolpaths)
}

/// Outline and infill toolpaths for every shape, in input order.
///
/// Stroked shapes only receive outline loops. Filled shapes receive
/// perimeters followed by infill of every region wide enough to fill.
pub fn build_toolpaths(
    shapes: &[Shape],
    config: &SlicerConfig,
    progress: &mut dyn FnMut(&str),
) -> Vec<Toolpath> {
    let total = shapes.len();
    let mut toolpaths = Vec::new();

    for (index, shape) in shapes.iter().enumerate() {
        let position = index + 1;
        if shape.is_stroke() {
            progress(&format!("Generating stroke outlines ({position}/{total})…"));
            toolpaths.extend(build_stroke_toolpaths(shape, config));
            continue;
        }

        progress(&format!("Preparing fill geometry ({position}/{total})…"));
        let polygons = decompose(&Geometry::from_multi(repair(&shape.geometry.to_multi())));
        if polygons.is_empty() {
            debug!("Shape {} has no areal geometry; skipped", position);
            continue;
        }
        let density = brightness_to_density(shape.brightness, &config.infill);

        for polygon in polygons {
            let perimeters = generate_fill_perimeters(&polygon, config);
            if !perimeters.loops.is_empty() {
                progress(&format!("Generating perimeters ({position}/{total})…"));
            }
            toolpaths.extend(toolpaths_from_polylines(
                perimeters.loops,
                ToolpathKind::Outline,
                shape.color,
                shape.brightness,
            ));

            if perimeters.interior.0.is_empty() {
                continue;
            }
            progress(&format!("Generating infill ({position}/{total})…"));
            toolpaths.extend(infill_toolpaths(&perimeters.interior, shape, density, config));
        }
    }
    toolpaths
}

fn infill_toolpaths(
    interior: &MultiPolygon<f64>,
    shape: &Shape,
    density: f64,
    config: &SlicerConfig,
) -> Vec<Toolpath> {
    let mut toolpaths = Vec::new();
    let interior = Geometry::from_multi(repair(interior));
    for part in decompose(&interior) {
        for region in select_infill_regions(
            &part,
            config.perimeter.min_fill_width_mm.max(0.0),
            config.perimeter.min_fill_mode,
        ) {
            let polylines = generate_rectilinear_infill(&region, density, &config.infill);
            toolpaths.extend(toolpaths_from_polylines(
                polylines,
                ToolpathKind::Infill,
                shape.color,
                shape.brightness,
            ));
        }
    }
    toolpaths
}
