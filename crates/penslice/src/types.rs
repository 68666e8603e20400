use crate::color::Rgb;
use crate::geometry::{polyline_length, stroke_outline, Geometry};
use serde::{Deserialize, Serialize};

/// An open or closed sequence of planar points, in mm.
pub type Polyline = Vec<(f64, f64)>;

/// A filled or stroked planar region handed over by the artwork parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    /// Areal boundary of the shape. For stroked shapes this is the band
    /// covered by the stroke.
    pub geometry: Geometry,
    /// 0.0 is black (densest fill), 1.0 is white (no fill).
    pub brightness: f64,
    /// Present for outline-only shapes; such shapes never receive infill.
    pub stroke_width: Option<f64>,
    /// Color of the source paint, if known.
    pub color: Option<Rgb>,
}

impl Shape {
    /// A filled shape with no source color.
    pub fn filled(geometry: impl Into<Geometry>, brightness: f64) -> Self {
        Self {
            geometry: geometry.into(),
            brightness,
            stroke_width: None,
            color: None,
        }
    }

    /// A stroked shape whose band geometry has already been outlined.
    pub fn stroked(geometry: impl Into<Geometry>, stroke_width: f64, brightness: f64) -> Self {
        Self {
            geometry: geometry.into(),
            brightness,
            stroke_width: Some(stroke_width),
            color: None,
        }
    }

    /// A stroked shape built from a centerline curve.
    pub fn from_stroke_curve(points: &[(f64, f64)], stroke_width: f64, brightness: f64) -> Self {
        let band = stroke_outline(points, stroke_width);
        Self::stroked(Geometry::from_multi(band), stroke_width, brightness)
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub fn is_stroke(&self) -> bool {
        self.stroke_width.is_some()
    }
}

/// What a toolpath draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolpathKind {
    Outline,
    Infill,
}

/// One continuous pen-down motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toolpath {
    /// At least two points.
    pub points: Polyline,
    pub kind: ToolpathKind,
    pub source_color: Option<Rgb>,
    pub brightness: f64,
    /// Palette color chosen during color planning.
    pub assigned_color: Option<Rgb>,
}

impl Toolpath {
    /// Drawn length in mm.
    pub fn length(&self) -> f64 {
        polyline_length(&self.points)
    }

    pub fn start(&self) -> Option<(f64, f64)> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<(f64, f64)> {
        self.points.last().copied()
    }
}

/// Wrap polylines into toolpaths, silently dropping those with fewer than
/// two points.
pub fn toolpaths_from_polylines(
    polylines: Vec<Polyline>,
    kind: ToolpathKind,
    source_color: Option<Rgb>,
    brightness: f64,
) -> Vec<Toolpath> {
    polylines
        .into_iter()
        .filter(|points| points.len() >= 2)
        .map(|points| Toolpath {
            points,
            kind,
            source_color,
            brightness,
            assigned_color: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::square;

    #[test]
    fn test_degenerate_polylines_dropped() {
        let toolpaths = toolpaths_from_polylines(
            vec![vec![], vec![(0.0, 0.0)], vec![(0.0, 0.0), (1.0, 0.0)]],
            ToolpathKind::Infill,
            None,
            0.5,
        );
        assert_eq!(toolpaths.len(), 1);
        assert_eq!(toolpaths[0].kind, ToolpathKind::Infill);
        assert_eq!(toolpaths[0].length(), 1.0);
        assert!(toolpaths[0].assigned_color.is_none());
    }

    #[test]
    fn test_shape_constructors() {
        let filled = Shape::filled(square(0.0, 0.0, 1.0), 0.2).with_color(Rgb::new(255, 0, 0));
        assert!(!filled.is_stroke());
        assert_eq!(filled.color, Some(Rgb::new(255, 0, 0)));

        let stroke = Shape::from_stroke_curve(&[(0.0, 0.0), (5.0, 0.0)], 1.0, 0.0);
        assert!(stroke.is_stroke());
        assert!((stroke.geometry.area() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_toolpath_serialization() {
        let toolpath = Toolpath {
            points: vec![(0.0, 0.0), (1.0, 1.0)],
            kind: ToolpathKind::Outline,
            source_color: Some(Rgb::new(1, 2, 3)),
            brightness: 0.0,
            assigned_color: None,
        };
        let serialized = serde_json::to_string(&toolpath).expect("serialize");
        assert!(serialized.contains("\"outline\""));
        let deserialized: Toolpath = serde_json::from_str(&serialized).expect("deserialize");
        assert_eq!(toolpath, deserialized);
    }
}
