use anyhow::{Context, Result};
use penslice::*;
use std::path::PathBuf;

fn main() -> Result<()> {
    init_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let demo = args.first().map(|s| s.as_str()).unwrap_or("square");
    let config = load_config(&args)?;

    let shapes = match demo {
        "square" => demo_square(),
        "donut" => demo_donut(),
        "stroke" => demo_stroke(),
        "colors" => demo_colors(),
        _ => {
            println!("Usage: penslice [square|donut|stroke|colors] [--config <path>]");
            println!("  square  - Filled 40mm square at mid gray (default)");
            println!("  donut   - Black square with a square hole");
            println!("  stroke  - Open zig-zag stroke, outline only");
            println!("  colors  - Three colored shapes, grouped by pen");
            return Ok(());
        }
    };

    let config = if demo == "colors" && !config.printer.color_mode {
        with_demo_palette(config)
    } else {
        config
    };

    require_palette(&config)?;
    let gcode = slice_to_gcode(&shapes, &config).context("slicing demo shapes")?;
    for line in &gcode.lines {
        println!("{}", line);
    }
    Ok(())
}

fn load_config(args: &[String]) -> Result<SlicerConfig> {
    let explicit = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);
    match explicit {
        Some(path) => SlicerConfig::load_from_path(&path),
        None => {
            let path = SlicerConfig::default_config_path()?;
            if path.exists() {
                SlicerConfig::load_from_path(&path)
            } else {
                Ok(SlicerConfig::default())
            }
        }
    }
}

/// Color mode is only useful with pens to switch between.
fn require_palette(config: &SlicerConfig) -> Result<()> {
    if config.printer.color_mode && config.printer.available_colors.is_empty() {
        return Err(ConfigError::MissingPalette(config.printer.name.clone()).into());
    }
    Ok(())
}

fn demo_square() -> Vec<Shape> {
    vec![Shape::filled(square(0.0, 0.0, 40.0), 0.5)]
}

fn demo_donut() -> Vec<Shape> {
    let outer = square(0.0, 0.0, 40.0);
    let hole = square(12.0, 12.0, 16.0);
    let donut = geo::Polygon::new(outer.exterior().clone(), vec![hole.exterior().clone()]);
    vec![Shape::filled(donut, 0.0)]
}

fn demo_stroke() -> Vec<Shape> {
    let zigzag = [(0.0, 0.0), (10.0, 10.0), (20.0, 0.0), (30.0, 10.0)];
    vec![Shape::from_stroke_curve(&zigzag, 1.5, 0.0)]
}

fn demo_colors() -> Vec<Shape> {
    vec![
        Shape::filled(square(0.0, 0.0, 30.0), 0.3).with_color(Rgb::new(220, 30, 30)),
        Shape::filled(square(40.0, 0.0, 15.0), 0.3).with_color(Rgb::new(20, 40, 210)),
        Shape::filled(rectangle(0.0, 40.0, 55.0, 8.0), 0.0),
    ]
}

fn with_demo_palette(mut config: SlicerConfig) -> SlicerConfig {
    config.printer.color_mode = true;
    config.printer.available_colors = ["#000000", "#FF0000", "#0000FF"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    config
}
