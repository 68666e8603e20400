use crate::types::Polyline;

/// Shorter clipped pieces are discarded.
const MIN_SEGMENT_LENGTH: f64 = 1e-9;

/// Clip the horizontal line at `y` against a set of closed rings using the
/// even-odd rule. Returns the inside spans as left-to-right two-point
/// polylines.
///
/// An edge counts as crossed when exactly one of its endpoints lies at or
/// below `y`, so a vertex on the scan line is counted once and horizontal
/// edges never.
pub fn clip_scanline(rings: &[Vec<(f64, f64)>], y: f64) -> Vec<Polyline> {
    let mut crossings: Vec<f64> = Vec::new();
    for ring in rings {
        for edge in ring.windows(2) {
            let ((x0, y0), (x1, y1)) = (edge[0], edge[1]);
            if (y0 <= y) != (y1 <= y) {
                crossings.push(x0 + (y - y0) * (x1 - x0) / (y1 - y0));
            }
        }
    }
    crossings.sort_by(|a, b| a.total_cmp(b));

    crossings
        .chunks_exact(2)
        .filter(|pair| pair[1] - pair[0] > MIN_SEGMENT_LENGTH)
        .map(|pair| vec![(pair[0], y), (pair[1], y)])
        .collect()
}

/// Scan line heights covering `[min_y - spacing, max_y + spacing]`.
pub fn scan_rows(min_y: f64, max_y: f64, spacing: f64) -> Vec<f64> {
    let start = min_y - spacing;
    let stop = max_y + spacing;
    let count = ((stop - start) / spacing + 1e-9).floor() as usize;
    (0..=count).map(|i| start + i as f64 * spacing).collect()
}
