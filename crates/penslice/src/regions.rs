use crate::config::MinFillMode;
use crate::geometry::{across_dimensions, decompose, intersection, offset, repair, Geometry};
use geo::{Area, MultiPolygon, Polygon};
use tracing::debug;

const MIN_OPENING_RADIUS: f64 = 1e-6;

/// Parts of `polygon` wide enough to receive infill.
///
/// In [`MinFillMode::Min`] a morphological opening of radius
/// `min_fill_width / 2` removes every part narrower than the width. In
/// [`MinFillMode::Max`] the whole polygon is kept when the long side of its
/// minimum rotated rectangle reaches the width.
pub fn select_infill_regions(
    polygon: &Polygon<f64>,
    min_fill_width: f64,
    mode: MinFillMode,
) -> Vec<Polygon<f64>> {
    let repaired = repair(&MultiPolygon(vec![polygon.clone()]));
    if repaired.0.is_empty() {
        return Vec::new();
    }
    if min_fill_width.is_nan() || min_fill_width <= 0.0 {
        return decompose(&Geometry::from_multi(repaired));
    }

    match mode {
        MinFillMode::Max => {
            let long_side = across_dimensions(polygon).map_or(0.0, |dims| dims.long);
            if long_side >= min_fill_width {
                vec![polygon.clone()]
            } else {
                debug!(
                    "Region spans {:.3} mm, below minimum fill width {:.3} mm",
                    long_side, min_fill_width
                );
                Vec::new()
            }
        }
        MinFillMode::Min => {
            let radius = (min_fill_width / 2.0).max(MIN_OPENING_RADIUS);
            let eroded = repair(&offset(&repaired, -radius));
            if eroded.0.is_empty() {
                debug!("Region narrower than {:.3} mm skipped", min_fill_width);
                return Vec::new();
            }
            let reopened = repair(&offset(&eroded, radius));
            let clipped = repair(&intersection(&reopened, &repaired));
            decompose(&Geometry::from_multi(clipped))
                .into_iter()
                .filter(|part| part.unsigned_area() > 0.0)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{rectangle, square, union};

    #[test]
    fn test_zero_width_returns_repaired_parts() {
        let square = square(0.0, 0.0, 10.0);
        let regions = select_infill_regions(&square, 0.0, MinFillMode::Min);
        let expected = decompose(&Geometry::from_multi(repair(&MultiPolygon(vec![
            square.clone(),
        ]))));
        assert_eq!(regions, expected);
    }

    #[test]
    fn test_max_mode_all_or_nothing() {
        let strip = rectangle(0.0, 0.0, 10.0, 0.2);
        assert_eq!(
            select_infill_regions(&strip, 5.0, MinFillMode::Max),
            vec![strip.clone()]
        );
        assert!(select_infill_regions(&strip, 12.0, MinFillMode::Max).is_empty());
    }

    #[test]
    fn test_min_mode_drops_narrow_strip() {
        let strip = rectangle(0.0, 0.0, 10.0, 0.5);
        assert!(select_infill_regions(&strip, 1.0, MinFillMode::Min).is_empty());
    }

    #[test]
    fn test_min_mode_keeps_wide_part_of_dumbbell() {
        // 10x10 block with a thin 0.4 mm tail
        let block = MultiPolygon(vec![square(0.0, 0.0, 10.0)]);
        let tail = MultiPolygon(vec![rectangle(10.0, 4.8, 10.0, 0.4)]);
        let shape = union(&block, &tail);
        assert_eq!(shape.0.len(), 1);
        let regions = select_infill_regions(&shape.0[0], 1.0, MinFillMode::Min);
        assert_eq!(regions.len(), 1);
        let area = regions[0].unsigned_area();
        assert!(area > 99.0 && area < 100.5, "unexpected area {area}");
    }
}
