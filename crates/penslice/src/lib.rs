mod color;
mod config;
mod error;
mod geometry;
mod infill;
mod perimeter;
mod postprocessor;
mod regions;
mod toolpath_generation;
mod types;

pub use color::*;
pub use config::*;
pub use error::*;
pub use geometry::*;
pub use infill::{
    brightness_to_density, generate_rectilinear_infill, generate_rectilinear_infill_with,
    line_spacing, GreedyNearest, RunBuilder, StitchContext, StitchStrategy,
};
pub use perimeter::*;
pub use postprocessor::{post_process_plotter, GCode};
pub use regions::select_infill_regions;
pub use toolpath_generation::*;
pub use types::*;

/// High-level function: shapes → toolpaths → G-code
pub fn slice_to_gcode(shapes: &[Shape], config: &SlicerConfig) -> Result<GCode, SliceError> {
    let output = slice_shapes(shapes, config)?;
    Ok(post_process_plotter(&output, &config.printer))
}

/// Install a `tracing` subscriber writing to stderr, filtered by `RUST_LOG`
/// (default level `info`).
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}
