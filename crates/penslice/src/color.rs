use crate::types::Toolpath;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// HSV saturation in [0, 1]; black is fully unsaturated.
    pub fn saturation(&self) -> f64 {
        let max = self.r.max(self.g).max(self.b) as f64;
        let min = self.r.min(self.g).min(self.b) as f64;
        if max == 0.0 {
            0.0
        } else {
            (max - min) / max
        }
    }

    /// Perceived brightness in [0, 1].
    pub fn brightness(&self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }

    fn distance(&self, other: &Rgb) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Choose the palette entry that best represents `source`.
///
/// Near-gray sources are matched by brightness against the gray palette
/// entries when there are any; everything else by RGB distance. Ties go to
/// the earliest palette entry. Returns `None` only for an empty palette.
pub fn nearest_palette_color(source: Rgb, palette: &[Rgb], gray_threshold: f64) -> Option<Rgb> {
    if source.saturation() <= gray_threshold {
        let grays = palette.iter().filter(|c| c.saturation() <= gray_threshold);
        let target = source.brightness();
        if let Some(color) = first_min_by(grays, |c| (c.brightness() - target).abs()) {
            return Some(color);
        }
    }
    first_min_by(palette.iter(), |c| c.distance(&source))
}

fn first_min_by<'a>(
    colors: impl Iterator<Item = &'a Rgb>,
    key: impl Fn(&Rgb) -> f64,
) -> Option<Rgb> {
    let mut best: Option<(f64, Rgb)> = None;
    for color in colors {
        let value = key(color);
        if best.map_or(true, |(best_value, _)| value < best_value) {
            best = Some((value, *color));
        }
    }
    best.map(|(_, color)| color)
}

/// Set `assigned_color` on every toolpath. Toolpaths without a source color
/// are treated as black.
pub fn assign_colors(toolpaths: &mut [Toolpath], palette: &[Rgb], gray_threshold: f64) {
    for toolpath in toolpaths.iter_mut() {
        let source = toolpath.source_color.unwrap_or(Rgb::BLACK);
        toolpath.assigned_color = nearest_palette_color(source, palette, gray_threshold);
    }
}

/// Toolpaths drawn with one pen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorGroup {
    pub color: Rgb,
    pub toolpaths: Vec<Toolpath>,
    /// Sum of drawn lengths in mm.
    pub total_length: f64,
}

/// Color groups in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorPlan {
    pub groups: Vec<ColorGroup>,
}

impl ColorPlan {
    pub fn ordered_colors(&self) -> Vec<Rgb> {
        self.groups.iter().map(|g| g.color).collect()
    }

    /// All toolpaths, group after group.
    pub fn toolpaths(&self) -> impl Iterator<Item = &Toolpath> {
        self.groups.iter().flat_map(|g| g.toolpaths.iter())
    }
}

/// Assign palette colors and group the toolpaths per color, least drawn
/// length first. Equal lengths keep palette order.
pub fn plan_color_sequence(
    mut toolpaths: Vec<Toolpath>,
    palette: &[Rgb],
    gray_threshold: f64,
) -> ColorPlan {
    if palette.is_empty() {
        return ColorPlan::default();
    }
    assign_colors(&mut toolpaths, palette, gray_threshold);

    let mut groups: Vec<(usize, ColorGroup)> = Vec::new();
    for toolpath in toolpaths {
        let Some(color) = toolpath.assigned_color else {
            continue;
        };
        let length = toolpath.length();
        match groups.iter_mut().find(|(_, g)| g.color == color) {
            Some((_, group)) => {
                group.total_length += length;
                group.toolpaths.push(toolpath);
            }
            None => {
                let index = palette.iter().position(|c| *c == color).unwrap_or(usize::MAX);
                groups.push((
                    index,
                    ColorGroup {
                        color,
                        toolpaths: vec![toolpath],
                        total_length: length,
                    },
                ));
            }
        }
    }

    groups.sort_by(|(ia, a), (ib, b)| {
        a.total_length
            .total_cmp(&b.total_length)
            .then_with(|| ia.cmp(ib))
    });
    for (_, group) in &groups {
        debug!(
            "Color {}: {} toolpaths, {:.1} mm",
            group.color,
            group.toolpaths.len(),
            group.total_length
        );
    }
    ColorPlan {
        groups: groups.into_iter().map(|(_, g)| g).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolpathKind;

    fn line(length: f64, color: Option<Rgb>) -> Toolpath {
        Toolpath {
            points: vec![(0.0, 0.0), (length, 0.0)],
            kind: ToolpathKind::Infill,
            source_color: color,
            brightness: 0.0,
            assigned_color: None,
        }
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgb::from_hex("#FF8000"), Some(Rgb::new(255, 128, 0)));
        assert_eq!(Rgb::from_hex("00ff00"), Some(Rgb::new(0, 255, 0)));
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
        assert_eq!(Rgb::new(1, 2, 255).to_hex(), "#0102FF");
    }

    #[test]
    fn test_saturation_and_brightness() {
        assert_eq!(Rgb::BLACK.saturation(), 0.0);
        assert_eq!(Rgb::new(255, 0, 0).saturation(), 1.0);
        assert!((Rgb::new(255, 255, 255).brightness() - 1.0).abs() < 1e-9);
        assert!((Rgb::new(255, 0, 0).brightness() - 0.299).abs() < 1e-9);
    }

    #[test]
    fn test_gray_source_matches_by_brightness() {
        let palette = [Rgb::new(0, 0, 0), Rgb::new(128, 128, 128), Rgb::new(200, 40, 40)];
        // dark gray sits closer to black by brightness
        let chosen = nearest_palette_color(Rgb::new(50, 50, 50), &palette, 0.08);
        assert_eq!(chosen, Some(Rgb::new(0, 0, 0)));
        let chosen = nearest_palette_color(Rgb::new(110, 110, 110), &palette, 0.08);
        assert_eq!(chosen, Some(Rgb::new(128, 128, 128)));
    }

    #[test]
    fn test_saturated_source_matches_by_distance() {
        let palette = [Rgb::new(0, 0, 0), Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)];
        let chosen = nearest_palette_color(Rgb::new(220, 30, 30), &palette, 0.08);
        assert_eq!(chosen, Some(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn test_gray_source_without_gray_palette_uses_distance() {
        let palette = [Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)];
        let chosen = nearest_palette_color(Rgb::new(20, 20, 20), &palette, 0.08);
        assert!(chosen.is_some());
    }

    #[test]
    fn test_ties_resolve_to_palette_order() {
        let palette = [Rgb::new(0, 0, 100), Rgb::new(0, 0, 200)];
        let chosen = nearest_palette_color(Rgb::new(0, 0, 150), &palette, 0.08);
        assert_eq!(chosen, Some(Rgb::new(0, 0, 100)));
    }

    #[test]
    fn test_missing_color_is_black() {
        let palette = [Rgb::new(255, 0, 0), Rgb::new(0, 0, 0)];
        let mut toolpaths = vec![line(1.0, None)];
        assign_colors(&mut toolpaths, &palette, 0.08);
        assert_eq!(toolpaths[0].assigned_color, Some(Rgb::BLACK));
    }

    #[test]
    fn test_groups_sorted_by_length_then_palette() {
        let red = Rgb::new(255, 0, 0);
        let blue = Rgb::new(0, 0, 255);
        let black = Rgb::BLACK;
        let palette = [red, blue, black];
        let toolpaths = vec![
            line(10.0, Some(red)),
            line(3.0, Some(blue)),
            line(2.0, None),
            line(1.0, Some(black)),
            line(5.0, Some(red)),
        ];
        let plan = plan_color_sequence(toolpaths, &palette, 0.08);
        assert_eq!(plan.ordered_colors(), vec![blue, black, red]);
        assert_eq!(plan.groups[2].toolpaths.len(), 2);
        assert!((plan.groups[2].total_length - 15.0).abs() < 1e-9);

        // equal totals fall back to palette order
        let toolpaths = vec![line(4.0, Some(blue)), line(4.0, Some(red))];
        let plan = plan_color_sequence(toolpaths, &palette, 0.08);
        assert_eq!(plan.ordered_colors(), vec![red, blue]);
    }

    #[test]
    fn test_empty_palette_yields_empty_plan() {
        let plan = plan_color_sequence(vec![line(1.0, None)], &[], 0.08);
        assert!(plan.groups.is_empty());
    }
}
