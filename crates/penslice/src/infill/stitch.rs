use crate::geometry::{point_distance, polyline_length};
use crate::infill::bridge::{perimeter_glide_path, segment_inside, LoopPath};
use crate::types::Polyline;

/// Distances at or below this are treated as coincident.
const COINCIDENT: f64 = 1e-9;
/// Interleave distances closer than this count as a tie.
const TIE_TOLERANCE: f64 = 1e-6;

/// Region boundary and thresholds shared by every stitching step of one
/// polygon.
#[derive(Debug, Clone)]
pub struct StitchContext {
    /// Runs whose endpoints are at most this far apart may be joined.
    pub link_gap: f64,
    /// Points within twice this distance of a loop count as on it.
    pub snap_tolerance: f64,
    pub loops: Vec<LoopPath>,
    /// Closed boundary rings of the region, used for direct connectors.
    pub rings: Vec<Vec<(f64, f64)>>,
}

impl StitchContext {
    pub fn new(rings: Vec<Vec<(f64, f64)>>, link_gap: f64, snap_tolerance: f64) -> Self {
        let loops = rings.iter().filter_map(|ring| LoopPath::new(ring)).collect();
        Self {
            link_gap,
            snap_tolerance,
            loops,
            rings,
        }
    }

    /// Pen-down path from `from` to `to`, including both endpoints.
    ///
    /// A bridge along the boundary is preferred when it is at most twice the
    /// link gap long; otherwise the straight connector is used if it stays
    /// inside the region.
    pub fn connect(&self, from: (f64, f64), to: (f64, f64)) -> Option<Polyline> {
        if let Some(bridge) = perimeter_glide_path(from, to, &self.loops, self.snap_tolerance) {
            if polyline_length(&bridge) <= 2.0 * self.link_gap + COINCIDENT {
                return Some(bridge);
            }
        }
        segment_inside(from, to, &self.rings).then(|| vec![from, to])
    }
}

/// How scan segments are chained into continuous pen-down runs.
pub trait StitchStrategy {
    /// Chain the segments of one sweep angle into runs.
    fn merge(&self, segments: Vec<Polyline>, ctx: &StitchContext) -> Vec<Polyline>;

    /// Order the runs of all sweep angles into a single sequence. `passes`
    /// is indexed by angle.
    fn interleave(&self, passes: Vec<Vec<Polyline>>) -> Vec<Polyline>;

    /// Join consecutive runs of the interleaved sequence where possible.
    fn glue(&self, runs: Vec<Polyline>, ctx: &StitchContext) -> Vec<Polyline>;
}

/// Greedy nearest-neighbour chaining.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyNearest;

impl StitchStrategy for GreedyNearest {
    fn merge(&self, segments: Vec<Polyline>, ctx: &StitchContext) -> Vec<Polyline> {
        let mut pending: Vec<Polyline> = segments.into_iter().filter(|s| s.len() >= 2).collect();
        if pending.is_empty() {
            return Vec::new();
        }
        let mut builder = RunBuilder::new(pending.remove(0));
        while !pending.is_empty() {
            let end = builder.end();
            let index = nearest_index(pending.iter().map(|line| point_distance(end, line[0])));
            let line = pending.remove(index);
            builder.append(line, ctx);
        }
        builder.finish()
    }

    fn interleave(&self, passes: Vec<Vec<Polyline>>) -> Vec<Polyline> {
        let mut candidates: Vec<Polyline> = passes
            .into_iter()
            .flatten()
            .filter(|run| run.len() >= 2)
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        // first run of the lowest angle index
        let first = candidates.remove(0);
        let mut pen = first[first.len() - 1];
        let mut ordered = vec![first];

        while !candidates.is_empty() {
            let mut best_index = 0;
            let mut best_distance = f64::INFINITY;
            let mut best_reversed = false;
            for (index, run) in candidates.iter().enumerate() {
                let to_start = point_distance(pen, run[0]);
                let to_end = point_distance(pen, run[run.len() - 1]);
                let (distance, reversed) = if to_end < to_start {
                    (to_end, true)
                } else {
                    (to_start, false)
                };
                if distance < best_distance - TIE_TOLERANCE {
                    best_index = index;
                    best_distance = distance;
                    best_reversed = reversed;
                }
            }
            let mut run = candidates.remove(best_index);
            if best_reversed {
                run.reverse();
            }
            pen = run[run.len() - 1];
            ordered.push(run);
        }
        ordered
    }

    fn glue(&self, runs: Vec<Polyline>, ctx: &StitchContext) -> Vec<Polyline> {
        let mut runs = runs.into_iter().filter(|run| run.len() >= 2);
        let Some(first) = runs.next() else {
            return Vec::new();
        };
        let mut builder = RunBuilder::new(first);
        for mut run in runs {
            let end = builder.end();
            if point_distance(end, run[run.len() - 1]) < point_distance(end, run[0]) {
                run.reverse();
            }
            builder.append(run, ctx);
        }
        builder.finish()
    }
}

/// Index of the first minimum.
fn nearest_index(distances: impl Iterator<Item = f64>) -> usize {
    let mut best = (0, f64::INFINITY);
    for (index, distance) in distances.enumerate() {
        if distance < best.1 {
            best = (index, distance);
        }
    }
    best.0
}

/// Accumulates finished runs while extending the current one.
#[derive(Debug)]
pub struct RunBuilder {
    finished: Vec<Polyline>,
    current: Polyline,
}

impl RunBuilder {
    /// `first` must hold at least two points.
    pub fn new(first: Polyline) -> Self {
        Self {
            finished: Vec::new(),
            current: first,
        }
    }

    pub fn end(&self) -> (f64, f64) {
        self.current[self.current.len() - 1]
    }

    /// Continue the current run with `line` when its start is within the
    /// link gap and a connector exists; otherwise `line` starts a new run.
    pub fn append(&mut self, line: Polyline, ctx: &StitchContext) {
        let end = self.end();
        let gap = point_distance(end, line[0]);
        if gap <= COINCIDENT {
            self.current.extend_from_slice(&line[1..]);
            return;
        }
        if gap <= ctx.link_gap + COINCIDENT {
            if let Some(connector) = ctx.connect(end, line[0]) {
                self.current.extend_from_slice(&connector[1..]);
                self.current.extend_from_slice(&line[1..]);
                return;
            }
        }
        let done = std::mem::replace(&mut self.current, line);
        self.finished.push(done);
    }

    pub fn finish(mut self) -> Vec<Polyline> {
        self.finished.push(self.current);
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_context(link_gap: f64) -> StitchContext {
        let ring = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)];
        StitchContext::new(vec![ring], link_gap, 0.25)
    }

    #[test]
    fn test_merge_boustrophedon_rows() {
        let ctx = square_context(3.0);
        let rows = vec![
            vec![(0.0, 0.0), (10.0, 0.0)],
            vec![(10.0, 2.0), (0.0, 2.0)],
            vec![(0.0, 4.0), (10.0, 4.0)],
        ];
        let runs = GreedyNearest.merge(rows, &ctx);
        assert_eq!(runs.len(), 1);
        assert_eq!(
            runs[0],
            vec![(0.0, 0.0), (10.0, 0.0), (10.0, 2.0), (0.0, 2.0), (0.0, 4.0), (10.0, 4.0)]
        );
    }

    #[test]
    fn test_merge_splits_on_large_gap() {
        let ctx = square_context(1.0);
        let rows = vec![vec![(0.0, 0.0), (10.0, 0.0)], vec![(10.0, 5.0), (0.0, 5.0)]];
        let runs = GreedyNearest.merge(rows, &ctx);
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn test_connect_prefers_bridge_along_boundary() {
        let ctx = square_context(3.0);
        let path = ctx.connect((10.0, 9.0), (9.0, 10.0)).expect("connector");
        assert_eq!(path, vec![(10.0, 9.0), (10.0, 10.0), (9.0, 10.0)]);
    }

    #[test]
    fn test_connect_falls_back_to_inside_segment() {
        let ctx = square_context(3.0);
        let path = ctx.connect((2.0, 2.0), (3.0, 3.0)).expect("connector");
        assert_eq!(path, vec![(2.0, 2.0), (3.0, 3.0)]);
    }

    #[test]
    fn test_interleave_picks_nearest_and_reverses() {
        let passes = vec![
            vec![vec![(0.0, 0.0), (5.0, 0.0)], vec![(20.0, 0.0), (30.0, 0.0)]],
            vec![vec![(6.0, 5.0), (6.0, 0.5)]],
        ];
        let ordered = GreedyNearest.interleave(passes);
        assert_eq!(ordered.len(), 3);
        assert_eq!(ordered[0], vec![(0.0, 0.0), (5.0, 0.0)]);
        assert_eq!(ordered[1], vec![(6.0, 0.5), (6.0, 5.0)]);
        assert_eq!(ordered[2], vec![(20.0, 0.0), (30.0, 0.0)]);
    }

    #[test]
    fn test_interleave_tie_keeps_lowest_index() {
        let passes = vec![vec![
            vec![(0.0, 0.0), (1.0, 0.0)],
            vec![(1.0, 1.0), (1.0, 2.0)],
            vec![(1.0, -1.0), (1.0, -2.0)],
        ]];
        let ordered = GreedyNearest.interleave(passes);
        assert_eq!(ordered[1], vec![(1.0, 1.0), (1.0, 2.0)]);
    }

    #[test]
    fn test_glue_reverses_closer_end() {
        let ctx = square_context(3.0);
        let runs = vec![
            vec![(0.0, 0.0), (10.0, 0.0)],
            vec![(0.0, 1.0), (10.0, 1.0)],
        ];
        let glued = GreedyNearest.glue(runs, &ctx);
        assert_eq!(glued.len(), 1);
        assert_eq!(glued[0].first(), Some(&(0.0, 0.0)));
        assert_eq!(glued[0].last(), Some(&(0.0, 1.0)));
    }
}
