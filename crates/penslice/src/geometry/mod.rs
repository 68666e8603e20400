use geo::{Area, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod measure;
pub mod offset;
pub mod repair;
pub mod ring;
pub mod stroke;
pub mod validate;

pub use measure::{across_dimensions, AcrossDimensions};
pub use offset::{difference, intersection, offset, union};
pub use repair::repair;
pub use ring::{close_loop, point_distance, polyline_length, ring_to_polyline};
pub use stroke::stroke_outline;
pub use validate::is_valid;

/// Planar areal geometry flowing through the slicing pipeline.
///
/// Only areal kinds are represented; anything else collapses to `Empty`
/// when converted from a general `geo::Geometry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Empty,
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    Collection(Vec<Geometry>),
}

impl Geometry {
    /// Wrap a multipolygon, collapsing the trivial cases.
    pub fn from_multi(multi: MultiPolygon<f64>) -> Self {
        let mut polygons = multi.0;
        match polygons.len() {
            0 => Geometry::Empty,
            1 => Geometry::Polygon(polygons.remove(0)),
            _ => Geometry::MultiPolygon(MultiPolygon(polygons)),
        }
    }

    /// Convert a general geo geometry, dropping non-areal parts.
    pub fn from_geo(geometry: geo::Geometry<f64>) -> Self {
        match geometry {
            geo::Geometry::Polygon(polygon) => Geometry::Polygon(polygon),
            geo::Geometry::MultiPolygon(multi) => Geometry::MultiPolygon(multi),
            geo::Geometry::Rect(rect) => Geometry::Polygon(rect.to_polygon()),
            geo::Geometry::Triangle(triangle) => Geometry::Polygon(triangle.to_polygon()),
            geo::Geometry::GeometryCollection(collection) => Geometry::Collection(
                collection.0.into_iter().map(Geometry::from_geo).collect(),
            ),
            other => {
                debug!("Skipping non-areal geometry: {:?}", geometry_kind(&other));
                Geometry::Empty
            }
        }
    }

    /// All polygons of this geometry collected into one multipolygon.
    pub fn to_multi(&self) -> MultiPolygon<f64> {
        MultiPolygon(decompose(self))
    }

    pub fn is_empty(&self) -> bool {
        decompose(self).is_empty()
    }

    /// Total unsigned area of all polygons.
    pub fn area(&self) -> f64 {
        decompose(self).iter().map(|p| p.unsigned_area()).sum()
    }
}

impl From<Polygon<f64>> for Geometry {
    fn from(polygon: Polygon<f64>) -> Self {
        Geometry::Polygon(polygon)
    }
}

impl From<MultiPolygon<f64>> for Geometry {
    fn from(multi: MultiPolygon<f64>) -> Self {
        Geometry::MultiPolygon(multi)
    }
}

/// Flatten any geometry into a list of single polygons-with-holes.
///
/// Polygons whose exterior has no extent are skipped.
pub fn decompose(geometry: &Geometry) -> Vec<Polygon<f64>> {
    let mut polygons = Vec::new();
    collect_polygons(geometry, &mut polygons);
    polygons
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Empty => {}
        Geometry::Polygon(polygon) => push_polygon(polygon, out),
        Geometry::MultiPolygon(multi) => {
            for polygon in &multi.0 {
                push_polygon(polygon, out);
            }
        }
        Geometry::Collection(parts) => {
            for part in parts {
                collect_polygons(part, out);
            }
        }
    }
}

fn push_polygon(polygon: &Polygon<f64>, out: &mut Vec<Polygon<f64>>) {
    if polygon.exterior().0.len() < 4 {
        debug!(
            "Skipping degenerate polygon with {} exterior coordinates",
            polygon.exterior().0.len()
        );
        return;
    }
    out.push(polygon.clone());
}

fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}

/// Axis-aligned square with its lower-left corner at `(x, y)`.
pub fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
    rectangle(x, y, size, size)
}

/// Axis-aligned rectangle with its lower-left corner at `(x, y)`.
pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Polygon<f64> {
    Polygon::new(
        vec![
            (x, y),
            (x + width, y),
            (x + width, y + height),
            (x, y + height),
            (x, y),
        ]
        .into(),
        vec![],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{GeometryCollection, Point};

    #[test]
    fn test_decompose_polygon() {
        let geometry = Geometry::Polygon(square(0.0, 0.0, 10.0));
        let polygons = decompose(&geometry);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].unsigned_area(), 100.0);
    }

    #[test]
    fn test_decompose_nested_collection() {
        let geometry = Geometry::Collection(vec![
            Geometry::Polygon(square(0.0, 0.0, 1.0)),
            Geometry::Empty,
            Geometry::MultiPolygon(MultiPolygon(vec![
                square(5.0, 0.0, 1.0),
                square(10.0, 0.0, 1.0),
            ])),
        ]);
        assert_eq!(decompose(&geometry).len(), 3);
    }

    #[test]
    fn test_from_geo_drops_points() {
        let collection = geo::Geometry::GeometryCollection(GeometryCollection(vec![
            geo::Geometry::Point(Point::new(1.0, 1.0)),
            geo::Geometry::Polygon(square(0.0, 0.0, 2.0)),
        ]));
        let geometry = Geometry::from_geo(collection);
        assert_eq!(decompose(&geometry).len(), 1);
        assert!(Geometry::from_geo(geo::Geometry::Point(Point::new(0.0, 0.0))).is_empty());
    }

    #[test]
    fn test_from_multi_collapses() {
        assert_eq!(Geometry::from_multi(MultiPolygon(vec![])), Geometry::Empty);
        let single = Geometry::from_multi(MultiPolygon(vec![square(0.0, 0.0, 1.0)]));
        assert!(matches!(single, Geometry::Polygon(_)));
    }
}
