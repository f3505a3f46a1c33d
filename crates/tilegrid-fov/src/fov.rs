//! Field of Vision algorithms.
//!
//! Provides two FOV algorithms sharing one result buffer:
//! - **Basic** (`basic`): one Bresenham ray per tile in radius. A tile is
//!   visible when every tile strictly between the source and it is
//!   transparent. Hard per-tile cutoff.
//! - **Shadowcasting** (`shadowcast`): recursive shadowcasting over eight
//!   octants. Rows are scanned outward while a shrinking interval of
//!   visible slopes is tracked; opaque tiles narrow or split it. Produces
//!   natural partial shadows around corners.
//!
//! Both use a Euclidean radius, boundary inclusive. Opaque tiles are
//! themselves visible: walls are seen, not seen through.

use tilegrid_core::{FovAlgorithm, Point, Range};

use crate::line::bresenham_into;

/// Octant transforms `(xx, xy, yx, yy)` mapping scan coordinates `(dx, dy)`
/// to grid offsets.
const OCTANTS: [(i32, i32, i32, i32); 8] = [
    (1, 0, 0, 1),
    (0, 1, 1, 0),
    (0, -1, 1, 0),
    (-1, 0, 0, 1),
    (-1, 0, 0, -1),
    (0, -1, -1, 0),
    (0, 1, -1, 0),
    (1, 0, 0, -1),
];

/// A pending row scan: rows `row..=radius` of one octant, restricted to
/// slopes in `[end, start]`.
#[derive(Debug, Clone, Copy)]
struct ScanJob {
    octant: usize,
    row: i32,
    start: f64,
    end: f64,
}

/// Field of Vision computation.
///
/// Holds the most recent result only; every computation replaces the
/// previous one.
pub struct FOV {
    range: Range,
    lit: Vec<bool>,
    visibles: Vec<Point>,
    computed: bool,
    // scratch
    jobs: Vec<ScanJob>,
    line_buf: Vec<Point>,
}

impl FOV {
    /// Create a FOV engine for the given grid rectangle.
    pub fn new(range: Range) -> Self {
        Self {
            range,
            lit: vec![false; range.len()],
            visibles: Vec::new(),
            computed: false,
            jobs: Vec::new(),
            line_buf: Vec::new(),
        }
    }

    /// The grid rectangle being used.
    pub fn range(&self) -> Range {
        self.range
    }

    /// Whether a computation has run since creation.
    pub fn is_computed(&self) -> bool {
        self.computed
    }

    fn clear(&mut self) {
        for &p in &self.visibles {
            if let Some(i) = self.range.index_of(p) {
                self.lit[i] = false;
            }
        }
        self.visibles.clear();
        self.computed = false;
    }

    /// Compute the tiles visible from `src` within `radius` with the
    /// chosen algorithm. `transparent` is only called for in-range tiles.
    ///
    /// A source outside the range yields an empty result.
    pub fn compute(
        &mut self,
        src: Point,
        radius: i32,
        algorithm: FovAlgorithm,
        transparent: impl Fn(Point) -> bool,
    ) -> &[Point] {
        match algorithm {
            FovAlgorithm::Basic => self.basic(src, radius, transparent),
            FovAlgorithm::Shadow => self.shadowcast(src, radius, transparent),
        }
    }

    /// Bresenham ray-casting FOV.
    pub fn basic(&mut self, src: Point, radius: i32, transparent: impl Fn(Point) -> bool) -> &[Point] {
        if !self.begin(src) {
            return &self.visibles;
        }
        let r2 = (radius as i64) * (radius as i64);
        let area = Range::around(src, radius.max(0)).intersect(self.range);
        let mut line = std::mem::take(&mut self.line_buf);
        for p in area {
            if p == src || src.distance_sq(p) > r2 {
                continue;
            }
            bresenham_into(src, p, &mut line);
            let n = line.len();
            if line[1..n - 1].iter().all(|&q| transparent(q)) {
                self.reveal(p);
            }
        }
        self.line_buf = line;
        log::debug!(
            "basic fov from {src} radius {radius}: {} visible",
            self.visibles.len()
        );
        &self.visibles
    }

    /// Shadowcasting FOV.
    pub fn shadowcast(
        &mut self,
        src: Point,
        radius: i32,
        transparent: impl Fn(Point) -> bool,
    ) -> &[Point] {
        if !self.begin(src) {
            return &self.visibles;
        }
        let r2 = (radius as i64) * (radius as i64);
        // No tile of the range lies farther than this many rows away.
        let max_row = radius.min(self.range.width().max(self.range.height()));
        let rng = self.range;
        let opaque = |p: Point| rng.contains(p) && !transparent(p);

        let mut jobs = std::mem::take(&mut self.jobs);
        jobs.clear();
        for octant in 0..OCTANTS.len() {
            jobs.push(ScanJob {
                octant,
                row: 1,
                start: 1.0,
                end: 0.0,
            });
        }

        while let Some(job) = jobs.pop() {
            let (xx, xy, yx, yy) = OCTANTS[job.octant];
            let mut start = job.start;
            let end = job.end;
            if start < end {
                continue;
            }
            let mut new_start = 0.0;
            for j in job.row..=max_row {
                let dy = -j;
                let mut blocked = false;
                for dx in -j..=0 {
                    let p = Point::new(src.x + dx * xx + dy * xy, src.y + dx * yx + dy * yy);
                    let l_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
                    let r_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);
                    if start < r_slope {
                        continue;
                    } else if end > l_slope {
                        break;
                    }

                    if src.distance_sq(p) <= r2 && rng.contains(p) {
                        self.reveal(p);
                    }

                    let wall = opaque(p);
                    if blocked {
                        if wall {
                            new_start = r_slope;
                            continue;
                        }
                        blocked = false;
                        start = new_start;
                    } else if wall && j < max_row {
                        blocked = true;
                        jobs.push(ScanJob {
                            octant: job.octant,
                            row: j + 1,
                            start,
                            end: l_slope,
                        });
                        new_start = r_slope;
                    }
                }
                if blocked {
                    break;
                }
            }
        }

        self.jobs = jobs;
        log::debug!(
            "shadowcast fov from {src} radius {radius}: {} visible",
            self.visibles.len()
        );
        &self.visibles
    }

    /// Reset state for a new computation and light the source. Returns
    /// `false` when the source lies outside the range.
    fn begin(&mut self, src: Point) -> bool {
        self.clear();
        self.computed = true;
        if !self.range.contains(src) {
            return false;
        }
        self.reveal(src);
        true
    }

    fn reveal(&mut self, p: Point) {
        let Some(idx) = self.range.index_of(p) else {
            return;
        };
        if !self.lit[idx] {
            self.lit[idx] = true;
            self.visibles.push(p);
        }
    }

    /// Query whether `p` is visible in the last computation.
    pub fn visible(&self, p: Point) -> bool {
        match self.range.index_of(p) {
            Some(i) => self.lit[i],
            None => false,
        }
    }

    /// Iterate over all visible points of the last computation, in
    /// discovery order.
    pub fn iter_visible(&self) -> impl Iterator<Item = Point> + '_ {
        self.visibles.iter().copied()
    }

    /// Visible points of the last computation.
    pub fn visibles(&self) -> &[Point] {
        &self.visibles
    }
}
