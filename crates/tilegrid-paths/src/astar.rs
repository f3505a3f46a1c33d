use std::collections::BinaryHeap;

use tilegrid_core::Point;

use crate::PathRange;
use crate::pathrange::{NodeRef, UNREACHABLE};
use crate::traits::{AstarPather, WeightedPather};

impl PathRange {
    /// Compute the shortest path from `from` to `to` using A*.
    ///
    /// Returns the steps after `from` up to and including `to`, an empty
    /// path when `from == to`, or `None` if no path exists within the
    /// current range. Ties on `g + h` are broken by the lower `h`, then by
    /// insertion order, so results are deterministic.
    pub fn astar_path<P: AstarPather>(
        &mut self,
        pather: &P,
        from: Point,
        to: Point,
    ) -> Option<Vec<Point>> {
        let start_idx = self.idx(from)?;
        let goal_idx = self.idx(to)?;

        if start_idx == goal_idx {
            return Some(Vec::new());
        }

        // Bump generation to lazily invalidate all nodes.
        self.astar_generation = self.astar_generation.wrapping_add(1);
        let cur_gen = self.astar_generation;

        {
            let node = &mut self.astar_nodes[start_idx];
            node.g = 0.0;
            node.parent = usize::MAX;
            node.generation = cur_gen;
            node.open = true;
        }

        let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
        let h0 = pather.estimate(from, to);
        let seq = self.next_seq();
        open.push(NodeRef {
            idx: start_idx,
            f: h0,
            h: h0,
            seq,
        });

        let mut nbuf = std::mem::take(&mut self.nbuf);
        let mut expanded = 0usize;

        let found = 'search: loop {
            let Some(current) = open.pop() else {
                break 'search false;
            };

            let ci = current.idx;

            // Skip stale entries.
            let cn = &self.astar_nodes[ci];
            if cn.generation != cur_gen || !cn.open {
                continue;
            }

            if ci == goal_idx {
                break 'search true;
            }

            self.astar_nodes[ci].open = false;
            expanded += 1;
            let current_g = self.astar_nodes[ci].g;
            let current_point = self.point(ci);

            nbuf.clear();
            pather.neighbors(current_point, &mut nbuf);

            for &np in nbuf.iter() {
                let Some(ni) = self.idx(np) else {
                    continue;
                };
                let tentative_g = current_g + pather.cost(current_point, np);

                let n = &mut self.astar_nodes[ni];
                if n.generation == cur_gen {
                    if tentative_g >= n.g {
                        continue;
                    }
                } else {
                    n.generation = cur_gen;
                    n.g = UNREACHABLE;
                }

                n.g = tentative_g;
                n.parent = ci;
                n.open = true;

                let h = pather.estimate(np, to);
                let seq = self.next_seq();
                open.push(NodeRef {
                    idx: ni,
                    f: tentative_g + h,
                    h,
                    seq,
                });
            }
        };

        self.nbuf = nbuf;

        if !found {
            log::debug!("astar {from} -> {to}: no path after {expanded} expansions");
            return None;
        }

        // Reconstruct path, dropping the start.
        let mut path = Vec::new();
        let mut ci = goal_idx;
        while ci != start_idx {
            path.push(self.point(ci));
            ci = self.astar_nodes[ci].parent;
        }
        path.reverse();
        log::debug!(
            "astar {from} -> {to}: {} steps, {expanded} expansions",
            path.len()
        );
        Some(path)
    }
}

/// Total cost of following `path` from `from` under `pather`.
pub fn path_cost<P: WeightedPather>(pather: &P, from: Point, path: &[Point]) -> f64 {
    let mut prev = from;
    let mut total = 0.0;
    for &p in path {
        total += pather.cost(prev, p);
        prev = p;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MovementPather;
    use tilegrid_core::{Movement, Range};

    fn open_grid(w: i32, h: i32, walls: &[Point]) -> impl Fn(Point) -> bool + '_ {
        let rng = Range::sized(w, h);
        move |p| rng.contains(p) && !walls.contains(&p)
    }

    #[test]
    fn straight_line_excludes_start() {
        let mut pr = PathRange::new(Range::sized(10, 1));
        let pather = MovementPather::new(Movement::Cardinal, open_grid(10, 1, &[]));
        let path = pr
            .astar_path(&pather, Point::new(0, 0), Point::new(4, 0))
            .unwrap();
        assert_eq!(
            path,
            vec![
                Point::new(1, 0),
                Point::new(2, 0),
                Point::new(3, 0),
                Point::new(4, 0)
            ]
        );
    }

    #[test]
    fn same_start_and_goal_is_empty() {
        let mut pr = PathRange::new(Range::sized(3, 3));
        let pather = MovementPather::new(Movement::Cardinal, open_grid(3, 3, &[]));
        let p = Point::new(1, 1);
        assert_eq!(pr.astar_path(&pather, p, p), Some(vec![]));
    }

    #[test]
    fn detours_around_wall() {
        let walls = [Point::new(5, 4)];
        let mut pr = PathRange::new(Range::sized(10, 10));
        let pather = MovementPather::new(Movement::Cardinal, open_grid(10, 10, &walls));
        let path = pr
            .astar_path(&pather, Point::new(5, 0), Point::new(5, 9))
            .unwrap();
        assert!(!path.contains(&Point::new(5, 4)));
        assert_eq!(path.last(), Some(&Point::new(5, 9)));
        assert_eq!(path.len(), 11);
    }

    #[test]
    fn enclosed_target_is_none() {
        let walls = [
            Point::new(4, 5),
            Point::new(6, 5),
            Point::new(5, 4),
            Point::new(5, 6),
        ];
        let mut pr = PathRange::new(Range::sized(10, 10));
        let pather = MovementPather::new(Movement::Cardinal, open_grid(10, 10, &walls));
        assert!(
            pr.astar_path(&pather, Point::new(0, 0), Point::new(5, 5))
                .is_none()
        );
        // Unwalkable target.
        assert!(
            pr.astar_path(&pather, Point::new(0, 0), Point::new(5, 4))
                .is_none()
        );
    }

    #[test]
    fn octile_prefers_diagonals() {
        let mut pr = PathRange::new(Range::sized(10, 10));
        let pather = MovementPather::new(Movement::Octile, open_grid(10, 10, &[]));
        let from = Point::new(0, 0);
        let path = pr.astar_path(&pather, from, Point::new(3, 3)).unwrap();
        assert_eq!(path.len(), 3);
        let cost = path_cost(&pather, from, &path);
        assert!((cost - 3.0 * std::f64::consts::SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_endpoint_is_none() {
        let mut pr = PathRange::new(Range::sized(5, 5));
        let pather = MovementPather::new(Movement::Cardinal, open_grid(5, 5, &[]));
        assert!(
            pr.astar_path(&pather, Point::new(0, 0), Point::new(9, 9))
                .is_none()
        );
    }

    #[test]
    fn repeated_queries_are_deterministic() {
        let mut pr = PathRange::new(Range::sized(8, 8));
        let pather = MovementPather::new(Movement::Chebyshev, open_grid(8, 8, &[]));
        let a = pr.astar_path(&pather, Point::new(0, 0), Point::new(7, 3));
        let b = pr.astar_path(&pather, Point::new(0, 0), Point::new(7, 3));
        assert_eq!(a, b);
    }
}
