use geo::{MultiPolygon, Polygon};
use penslice::*;

fn bowtie() -> Polygon<f64> {
    Polygon::new(
        vec![(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0)].into(),
        vec![],
    )
}

#[test]
fn test_zero_width_matches_repaired_decomposition() {
    for polygon in [square(0.0, 0.0, 5.0), bowtie()] {
        for mode in [MinFillMode::Min, MinFillMode::Max] {
            let regions = select_infill_regions(&polygon, 0.0, mode);
            let expected = decompose(&Geometry::from_multi(repair(&MultiPolygon(vec![
                polygon.clone(),
            ]))));
            assert_eq!(regions, expected);
        }
    }
}

#[test]
fn test_max_mode_returns_input_or_nothing() {
    let polygon = rectangle(0.0, 0.0, 6.0, 1.0);
    for width in [0.5, 3.0, 6.0, 6.5, 50.0] {
        let regions = select_infill_regions(&polygon, width, MinFillMode::Max);
        assert!(
            regions.is_empty() || regions == vec![polygon.clone()],
            "width {width}: unexpected {regions:?}"
        );
    }
    assert!(select_infill_regions(&polygon, 6.5, MinFillMode::Max).is_empty());
}

#[test]
fn test_unknown_mode_string_behaves_as_min() {
    let mode = MinFillMode::from("sideways");
    let polygon = rectangle(0.0, 0.0, 20.0, 0.5);
    assert!(select_infill_regions(&polygon, 1.0, mode).is_empty());
    assert_eq!(select_infill_regions(&polygon, 1.0, MinFillMode::Max).len(), 1);
}

#[test]
fn test_min_mode_keeps_wide_square() {
    let regions = select_infill_regions(&square(0.0, 0.0, 10.0), 1.0, MinFillMode::Min);
    assert_eq!(regions.len(), 1);
}
