use crate::config::PrinterConfig;
use crate::toolpath_generation::SliceOutput;
use crate::types::Toolpath;
use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use tracing::info;

/// Generated motion program, one command per line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GCode {
    pub lines: Vec<String>,
}

impl GCode {
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_string())
            .with_context(|| format!("write G-code {}", path.display()))?;
        info!("Wrote {} G-code lines to {}", self.lines.len(), path.display());
        Ok(())
    }
}

impl fmt::Display for GCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Convert sliced toolpaths into pen plotter G-code.
///
/// With a color plan, groups are drawn least-used first with a pause between
/// consecutive groups; otherwise toolpaths are drawn in order.
pub fn post_process_plotter(output: &SliceOutput, printer: &PrinterConfig) -> GCode {
    let mut writer = PlotterWriter::new(printer);
    writer.emit_all(&printer.start_gcode);

    match output.color_plan.as_ref().filter(|plan| !plan.groups.is_empty()) {
        Some(plan) => {
            let summary = plan
                .ordered_colors()
                .iter()
                .map(|c| c.to_hex())
                .collect::<Vec<_>>()
                .join(" -> ");
            writer.comment(&format!("COLOR ORDER (least usage first): {summary}"));
            let total = plan.groups.len();
            for (index, group) in plan.groups.iter().enumerate() {
                writer.comment(&format!(
                    "COLOR {}/{}: {} ({:.1} mm of drawing)",
                    index + 1,
                    total,
                    group.color.to_hex(),
                    group.total_length
                ));
                for toolpath in &group.toolpaths {
                    writer.draw(toolpath);
                }
                if index + 1 < total {
                    writer.comment("Pen change before next color");
                    if printer.pause_gcode.is_empty() {
                        writer.emit("M600");
                    } else {
                        writer.emit_all(&printer.pause_gcode);
                    }
                }
            }
        }
        None => {
            for toolpath in &output.toolpaths {
                writer.draw(toolpath);
            }
        }
    }

    let estimate = format_duration(writer.elapsed_s);
    writer.comment(&format!("Estimated plot time: {estimate}"));
    writer.emit_all(&printer.end_gcode);
    info!("Estimated plot time: {} (motion only)", estimate);

    GCode {
        lines: writer.lines,
    }
}

/// Tracks machine state so redundant moves and feed words are skipped.
struct PlotterWriter<'a> {
    printer: &'a PrinterConfig,
    lines: Vec<String>,
    position: Option<(f64, f64)>,
    z: f64,
    feed: Option<f64>,
    elapsed_s: f64,
}

impl<'a> PlotterWriter<'a> {
    fn new(printer: &'a PrinterConfig) -> Self {
        Self {
            printer,
            lines: Vec::new(),
            position: None,
            z: printer.z_travel,
            feed: None,
            elapsed_s: 0.0,
        }
    }

    fn emit(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn emit_all(&mut self, lines: &[String]) {
        self.lines.extend(lines.iter().cloned());
    }

    fn comment(&mut self, text: &str) {
        self.lines.push(format!("; {text}"));
    }

    fn feed_word(&mut self, feed: f64) -> String {
        if self.feed == Some(feed) {
            String::new()
        } else {
            self.feed = Some(feed);
            format!(" F{feed:.0}")
        }
    }

    fn set_z(&mut self, z: f64) {
        if (self.z - z).abs() < 1e-6 {
            return;
        }
        let feed = self.printer.feedrates.z_per_min();
        let word = self.feed_word(feed);
        self.lines.push(format!("G1 Z{z:.3}{word}"));
        self.add_time((self.z - z).abs(), self.printer.feedrates.z_mm_s);
        self.z = z;
    }

    fn move_to(&mut self, command: &str, point: (f64, f64), feed_mm_s: f64) {
        if self.position == Some(point) {
            return;
        }
        let word = self.feed_word(feed_mm_s * 60.0);
        self.lines
            .push(format!("{command} X{:.3} Y{:.3}{word}", point.0, point.1));
        if let Some(from) = self.position {
            self.add_time((point.0 - from.0).hypot(point.1 - from.1), feed_mm_s);
        }
        self.position = Some(point);
    }

    fn add_time(&mut self, distance: f64, feed_mm_s: f64) {
        if feed_mm_s > 0.0 {
            self.elapsed_s += distance / feed_mm_s;
        }
    }

    fn draw(&mut self, toolpath: &Toolpath) {
        let Some((&start, rest)) = toolpath.points.split_first() else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        let feeds = &self.printer.feedrates;
        let (travel, draw) = (feeds.travel_mm_s, feeds.draw_mm_s);
        self.set_z(self.printer.z_travel);
        self.move_to("G0", start, travel);
        self.set_z(self.printer.z_draw);
        for &point in rest {
            self.move_to("G1", point, draw);
        }
        self.set_z(self.printer.z_travel);
    }
}

fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}
