use crate::color::Rgb;
use crate::error::ConfigError;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything the slicer reads while turning shapes into toolpaths.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SlicerConfig {
    pub printer: PrinterConfig,
    pub perimeter: PerimeterConfig,
    pub infill: InfillConfig,
    pub sampling: SamplingConfig,
}

/// Pen plotter geometry and motion settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrinterConfig {
    pub name: String,
    /// Pen-down height in mm.
    pub z_draw: f64,
    /// Pen-up height in mm.
    pub z_travel: f64,
    pub feedrates: Feedrates,
    pub start_gcode: Vec<String>,
    pub end_gcode: Vec<String>,
    /// Group toolpaths by palette color and pause between groups.
    pub color_mode: bool,
    /// Palette as `#RRGGBB` strings, in declaration order.
    pub available_colors: Vec<String>,
    /// Commands emitted between color groups.
    pub pause_gcode: Vec<String>,
    /// Sources at or below this saturation are matched by brightness against
    /// the gray palette entries.
    pub gray_saturation_threshold: f64,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            name: "PenPlotter".to_string(),
            z_draw: 0.0,
            z_travel: 5.0,
            feedrates: Feedrates::default(),
            start_gcode: vec!["G21".to_string(), "G90".to_string()],
            end_gcode: Vec::new(),
            color_mode: false,
            available_colors: Vec::new(),
            pause_gcode: vec!["M600".to_string()],
            gray_saturation_threshold: 0.08,
        }
    }
}

impl PrinterConfig {
    /// Parse the palette, in declaration order.
    pub fn palette(&self) -> Result<Vec<Rgb>, ConfigError> {
        self.available_colors
            .iter()
            .map(|hex| Rgb::from_hex(hex).ok_or_else(|| ConfigError::InvalidColor(hex.clone())))
            .collect()
    }
}

/// Feed rates in mm/s.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Feedrates {
    pub draw_mm_s: f64,
    pub travel_mm_s: f64,
    pub z_mm_s: f64,
}

impl Default for Feedrates {
    fn default() -> Self {
        Self {
            draw_mm_s: 25.0,
            travel_mm_s: 80.0,
            z_mm_s: 10.0,
        }
    }
}

impl Feedrates {
    /// G-code feed rates are per minute.
    pub fn draw_per_min(&self) -> f64 {
        self.draw_mm_s * 60.0
    }

    pub fn travel_per_min(&self) -> f64 {
        self.travel_mm_s * 60.0
    }

    pub fn z_per_min(&self) -> f64 {
        self.z_mm_s * 60.0
    }
}

/// How the minimum fill width is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MinFillMode {
    /// Morphological opening: only locally wide sub-regions are filled.
    #[default]
    Min,
    /// The whole region is filled when its longest extent is wide enough.
    Max,
}

impl From<&str> for MinFillMode {
    /// Unrecognized strings fall back to [`MinFillMode::Min`].
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "max" => MinFillMode::Max,
            _ => MinFillMode::Min,
        }
    }
}

impl From<String> for MinFillMode {
    fn from(value: String) -> Self {
        MinFillMode::from(value.as_str())
    }
}

impl From<MinFillMode> for String {
    fn from(mode: MinFillMode) -> Self {
        match mode {
            MinFillMode::Min => "min".to_string(),
            MinFillMode::Max => "max".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerimeterConfig {
    /// Width of one perimeter pass in mm.
    pub thickness_mm: f64,
    /// Number of perimeter passes around filled shapes.
    pub count: u32,
    pub min_fill_width_mm: f64,
    pub min_fill_mode: MinFillMode,
}

impl Default for PerimeterConfig {
    fn default() -> Self {
        Self {
            thickness_mm: 0.45,
            count: 1,
            min_fill_width_mm: 0.8,
            min_fill_mode: MinFillMode::Min,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InfillConfig {
    /// Line spacing in mm at density 1.0.
    pub base_line_spacing_mm: f64,
    pub min_density: f64,
    pub max_density: f64,
    /// One sweep per angle, in list order.
    pub angles_degrees: Vec<f64>,
    /// Runs whose endpoints are closer than `spacing * link_gap_factor` are
    /// joined into one pen-down motion.
    pub link_gap_factor: f64,
}

impl Default for InfillConfig {
    fn default() -> Self {
        Self {
            base_line_spacing_mm: 1.0,
            min_density: 0.05,
            max_density: 1.0,
            angles_degrees: vec![45.0, 135.0],
            link_gap_factor: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SamplingConfig {
    /// Maximum deviation allowed when simplifying outline loops.
    pub outline_simplify_tolerance_mm: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            outline_simplify_tolerance_mm: 0.05,
        }
    }
}

impl SlicerConfig {
    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(anyhow!("configuration file not found: {}", path.display()));
        }
        let data = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
        let config: SlicerConfig =
            serde_json::from_slice(&data).context("deserialize slicer config")?;
        Ok(config)
    }

    /// Persist the configuration as prettified JSON, creating the directory.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config directory {}", parent.display()))?;
        }
        let data = serde_json::to_vec_pretty(self).context("serialize slicer config")?;
        fs::write(path, data).with_context(|| format!("write config {}", path.display()))
    }

    /// Resolve the default config path (`<config dir>/penslice/config.json`).
    pub fn default_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| anyhow!("could not determine config directory"))?;
        Ok(base.join("penslice").join("config.json"))
    }

    /// Check values the pipeline cannot clamp into something meaningful.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("perimeter.thickness_mm", self.perimeter.thickness_mm),
            ("perimeter.min_fill_width_mm", self.perimeter.min_fill_width_mm),
            ("infill.base_line_spacing_mm", self.infill.base_line_spacing_mm),
            ("infill.min_density", self.infill.min_density),
            ("infill.max_density", self.infill.max_density),
            ("infill.link_gap_factor", self.infill.link_gap_factor),
            (
                "sampling.outline_simplify_tolerance_mm",
                self.sampling.outline_simplify_tolerance_mm,
            ),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(invalid(name, "must be a finite number"));
            }
        }
        if let Some(angle) = self.infill.angles_degrees.iter().find(|a| !a.is_finite()) {
            return Err(invalid(
                "infill.angles_degrees",
                &format!("contains non-finite angle {angle}"),
            ));
        }
        if self.infill.min_density > self.infill.max_density {
            return Err(invalid(
                "infill.min_density",
                &format!(
                    "{} exceeds max_density {}",
                    self.infill.min_density, self.infill.max_density
                ),
            ));
        }
        if self.infill.link_gap_factor < 0.0 {
            return Err(invalid("infill.link_gap_factor", "must not be negative"));
        }
        self.printer.palette()?;
        Ok(())
    }
}

fn invalid(name: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SlicerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_min_fill_mode_fallback() {
        assert_eq!(MinFillMode::from("max"), MinFillMode::Max);
        assert_eq!(MinFillMode::from(" MAX "), MinFillMode::Max);
        assert_eq!(MinFillMode::from("min"), MinFillMode::Min);
        assert_eq!(MinFillMode::from("widest"), MinFillMode::Min);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let json = r#"{
            "perimeter": { "count": 3, "min_fill_mode": "bogus" },
            "infill": { "angles_degrees": [0.0] }
        }"#;
        let config: SlicerConfig = serde_json::from_str(json).expect("deserialize");
        assert_eq!(config.perimeter.count, 3);
        assert_eq!(config.perimeter.thickness_mm, 0.45);
        assert_eq!(config.perimeter.min_fill_mode, MinFillMode::Min);
        assert_eq!(config.infill.angles_degrees, vec![0.0]);
        assert_eq!(config.infill.base_line_spacing_mm, 1.0);
    }

    #[test]
    fn test_inverted_density_rejected() {
        let mut config = SlicerConfig::default();
        config.infill.min_density = 0.9;
        config.infill.max_density = 0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_palette_entries_are_checked() {
        let mut config = SlicerConfig::default();
        config.printer.color_mode = true;
        assert_eq!(config.validate(), Ok(()));
        config.printer.available_colors = vec!["#zz0000".to_string()];
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidColor("#zz0000".to_string()))
        );
        config.printer.available_colors = vec!["#ff0000".to_string()];
        assert_eq!(config.validate(), Ok(()));
    }
}
