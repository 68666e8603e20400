use geo::{Area, BoundingRect, MultiPolygon, Polygon};
use penslice::*;

#[test]
fn test_repair_keeps_valid_polygon() {
    let polygon = MultiPolygon(vec![rectangle(1.0, 2.0, 7.0, 3.0)]);
    assert!(is_valid(&polygon));
    let repaired = repair(&polygon);
    assert_eq!(repaired.bounding_rect(), polygon.bounding_rect());
    assert!((repaired.unsigned_area() - polygon.unsigned_area()).abs() < 1e-9);
}

#[test]
fn test_repair_fixes_self_intersection() {
    let bowtie = MultiPolygon(vec![Polygon::new(
        vec![(0.0, 0.0), (4.0, 4.0), (4.0, 0.0), (0.0, 4.0), (0.0, 0.0)].into(),
        vec![],
    )]);
    assert!(!is_valid(&bowtie));
    let repaired = repair(&bowtie);
    assert!(is_valid(&repaired));
    assert!(repaired.unsigned_area() > 0.0);
}

#[test]
fn test_decompose_variants() {
    assert!(decompose(&Geometry::Empty).is_empty());
    let multi = Geometry::MultiPolygon(MultiPolygon(vec![square(0.0, 0.0, 1.0), square(2.0, 0.0, 1.0)]));
    assert_eq!(decompose(&multi).len(), 2);
    let nested = Geometry::Collection(vec![multi, Geometry::Polygon(square(5.0, 5.0, 1.0))]);
    assert_eq!(decompose(&nested).len(), 3);
    let point = Geometry::from_geo(geo::Geometry::Point(geo::Point::new(1.0, 1.0)));
    assert_eq!(point, Geometry::Empty);
}

#[test]
fn test_ring_to_polyline_simplifies_and_closes() {
    // collinear midpoints disappear
    let ring: geo::LineString<f64> = vec![
        (0.0, 0.0),
        (5.0, 0.0),
        (10.0, 0.0),
        (10.0, 10.0),
        (0.0, 10.0),
        (0.0, 0.0),
    ]
    .into();
    let points = ring_to_polyline(&ring, 0.1);
    assert_eq!(points.len(), 5);
    assert_eq!(points.first(), points.last());
}

#[test]
fn test_polygon_algebra() {
    let a = MultiPolygon(vec![square(0.0, 0.0, 10.0)]);
    let b = MultiPolygon(vec![square(5.0, 0.0, 10.0)]);
    assert!((union(&a, &b).unsigned_area() - 150.0).abs() < 1e-9);
    assert!((intersection(&a, &b).unsigned_area() - 50.0).abs() < 1e-9);
    assert!((difference(&a, &b).unsigned_area() - 50.0).abs() < 1e-9);
    let grown = offset(&a, 1.0);
    assert!(grown.unsigned_area() > 100.0 + 40.0 - 1e-3);
}

#[test]
fn test_across_dimensions_of_rectangle() {
    let dims = across_dimensions(&rectangle(0.0, 0.0, 3.0, 12.0)).expect("dims");
    assert!((dims.short - 3.0).abs() < 1e-9);
    assert!((dims.long - 12.0).abs() < 1e-9);
}

#[test]
fn test_stroke_outline_band_width() {
    let band = stroke_outline(&[(0.0, 0.0), (0.0, 8.0)], 0.5);
    let bounds = band.bounding_rect().expect("bounds");
    assert!((bounds.width() - 0.5).abs() < 1e-9);
    assert!((bounds.height() - 8.0).abs() < 1e-9);
}
