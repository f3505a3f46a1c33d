use std::collections::BinaryHeap;

use tilegrid_core::Point;

use crate::PathRange;
use crate::pathrange::{NodeRef, PathNode, UNREACHABLE};
use crate::traits::{Pather, WeightedPather};

impl PathRange {
    /// Compute a multi-source Dijkstra distance map.
    ///
    /// Every source starts at cost 0. Expansion stops when the cumulative
    /// cost exceeds `max_cost`. The map replaces any previously computed
    /// one. Returns all reached nodes in order of increasing cost.
    pub fn dijkstra_map<P: WeightedPather>(
        &mut self,
        pather: &P,
        sources: &[Point],
        max_cost: f64,
    ) -> &[PathNode] {
        for v in self.dijkstra_map.iter_mut() {
            *v = UNREACHABLE;
        }
        self.dijkstra_results.clear();
        self.dijkstra_computed = true;

        self.dijkstra_generation = self.dijkstra_generation.wrapping_add(1);
        let cur_gen = self.dijkstra_generation;

        let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();

        for &src in sources {
            if let Some(si) = self.idx(src) {
                let n = &mut self.dijkstra_nodes[si];
                n.g = 0.0;
                n.parent = usize::MAX;
                n.generation = cur_gen;
                n.open = true;
                self.dijkstra_map[si] = 0.0;
                let seq = self.next_seq();
                open.push(NodeRef {
                    idx: si,
                    f: 0.0,
                    h: 0.0,
                    seq,
                });
            }
        }

        let mut nbuf = std::mem::take(&mut self.nbuf);

        while let Some(current) = open.pop() {
            let ci = current.idx;
            let cn = &self.dijkstra_nodes[ci];
            if cn.generation != cur_gen || !cn.open {
                continue;
            }
            let current_g = cn.g;
            self.dijkstra_nodes[ci].open = false;

            let cp = self.point(ci);
            self.dijkstra_results.push(PathNode {
                pos: cp,
                cost: current_g,
            });

            nbuf.clear();
            pather.neighbors(cp, &mut nbuf);

            for &np in nbuf.iter() {
                let Some(ni) = self.idx(np) else {
                    continue;
                };
                let tentative = current_g + pather.cost(cp, np);
                if tentative > max_cost {
                    continue;
                }

                let n = &mut self.dijkstra_nodes[ni];
                if n.generation == cur_gen {
                    if tentative >= n.g {
                        continue;
                    }
                } else {
                    n.generation = cur_gen;
                    n.g = UNREACHABLE;
                }

                n.g = tentative;
                n.parent = ci;
                n.open = true;
                self.dijkstra_map[ni] = tentative;
                let seq = self.next_seq();
                open.push(NodeRef {
                    idx: ni,
                    f: tentative,
                    h: 0.0,
                    seq,
                });
            }
        }

        self.nbuf = nbuf;
        log::debug!(
            "dijkstra from {} source(s): {} tiles reached",
            sources.len(),
            self.dijkstra_results.len()
        );
        &self.dijkstra_results
    }

    /// Query the Dijkstra cost at a specific point.
    ///
    /// Returns `None` if the point is outside the range, was not reached by
    /// the last `dijkstra_map` call, or no map was computed yet.
    pub fn dijkstra_at(&self, p: Point) -> Option<f64> {
        if !self.dijkstra_computed {
            return None;
        }
        let i = self.idx(p)?;
        let d = self.dijkstra_map[i];
        (d != UNREACHABLE).then_some(d)
    }

    /// Follow the current Dijkstra map downhill from `from` to a source.
    ///
    /// At each step the neighbour (as enumerated by `pather`) with the
    /// lowest stored cost is taken; the first one wins ties. The returned
    /// steps exclude `from` and end on a source tile. `None` if `from` was
    /// not reached.
    pub fn dijkstra_path_from<P: Pather>(&mut self, pather: &P, from: Point) -> Option<Vec<Point>> {
        let mut cur = from;
        let mut d = self.dijkstra_at(from)?;
        let mut path = Vec::new();
        let mut nbuf = std::mem::take(&mut self.nbuf);

        // A valid map strictly decreases at every step, so the walk is
        // bounded by the number of tiles.
        let limit = self.rng.len();
        while d > 0.0 && path.len() < limit {
            nbuf.clear();
            pather.neighbors(cur, &mut nbuf);
            let mut best: Option<(Point, f64)> = None;
            for &np in nbuf.iter() {
                let Some(nd) = self.dijkstra_at(np) else {
                    continue;
                };
                if nd < d && best.is_none_or(|(_, bd)| nd < bd) {
                    best = Some((np, nd));
                }
            }
            let Some((np, nd)) = best else {
                log::warn!("dijkstra descent stuck at {cur} (cost {d})");
                self.nbuf = nbuf;
                return None;
            };
            path.push(np);
            cur = np;
            d = nd;
        }

        self.nbuf = nbuf;
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MovementPather;
    use tilegrid_core::{Movement, Range};

    fn walkable(walls: &[Point]) -> impl Fn(Point) -> bool + '_ {
        let rng = Range::sized(10, 10);
        move |p| rng.contains(p) && !walls.contains(&p)
    }

    #[test]
    fn uniform_costs_match_manhattan() {
        let mut pr = PathRange::new(Range::sized(10, 10));
        let pather = MovementPather::new(Movement::Cardinal, walkable(&[]));
        let src = Point::new(2, 3);
        let reached = pr.dijkstra_map(&pather, &[src], f64::INFINITY).len();
        assert_eq!(reached, 100);
        for p in Range::sized(10, 10) {
            let expected = ((src.x - p.x).abs() + (src.y - p.y).abs()) as f64;
            assert_eq!(pr.dijkstra_at(p), Some(expected));
        }
    }

    #[test]
    fn results_are_sorted_by_cost() {
        let mut pr = PathRange::new(Range::sized(10, 10));
        let pather = MovementPather::new(Movement::Octile, walkable(&[]));
        let nodes = pr.dijkstra_map(&pather, &[Point::new(5, 5)], f64::INFINITY);
        assert!(nodes.windows(2).all(|w| w[0].cost <= w[1].cost));
    }

    #[test]
    fn max_cost_bounds_expansion() {
        let mut pr = PathRange::new(Range::sized(10, 10));
        let pather = MovementPather::new(Movement::Cardinal, walkable(&[]));
        pr.dijkstra_map(&pather, &[Point::new(0, 0)], 2.0);
        assert_eq!(pr.dijkstra_at(Point::new(2, 0)), Some(2.0));
        assert_eq!(pr.dijkstra_at(Point::new(3, 0)), None);
    }

    #[test]
    fn multiple_sources() {
        let mut pr = PathRange::new(Range::sized(10, 10));
        let pather = MovementPather::new(Movement::Cardinal, walkable(&[]));
        pr.dijkstra_map(&pather, &[Point::new(0, 0), Point::new(9, 0)], f64::INFINITY);
        assert_eq!(pr.dijkstra_at(Point::new(8, 0)), Some(1.0));
        assert_eq!(pr.dijkstra_at(Point::new(1, 0)), Some(1.0));
        let path = pr.dijkstra_path_from(&pather, Point::new(7, 1)).unwrap();
        assert_eq!(path.last(), Some(&Point::new(9, 0)));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn descent_reaches_source() {
        let walls = [Point::new(5, 4), Point::new(4, 4), Point::new(6, 4)];
        let mut pr = PathRange::new(Range::sized(10, 10));
        let pather = MovementPather::new(Movement::Cardinal, walkable(&walls));
        let src = Point::new(5, 0);
        pr.dijkstra_map(&pather, &[src], f64::INFINITY);
        for p in Range::sized(10, 10) {
            let Some(d) = pr.dijkstra_at(p) else {
                assert!(walls.contains(&p));
                continue;
            };
            let path = pr.dijkstra_path_from(&pather, p).unwrap();
            assert_eq!(path.len() as f64, d, "path length from {p}");
            if p != src {
                assert_eq!(path.last(), Some(&src));
            }
        }
    }

    #[test]
    fn unreached_and_uncomputed() {
        let mut pr = PathRange::new(Range::sized(10, 10));
        let blocked = [Point::new(3, 3)];
        let pather = MovementPather::new(Movement::Cardinal, walkable(&blocked));
        assert_eq!(pr.dijkstra_at(Point::new(0, 0)), None);
        pr.dijkstra_map(&pather, &[Point::new(0, 0)], f64::INFINITY);
        assert_eq!(pr.dijkstra_at(Point::new(3, 3)), None);
        assert!(pr.dijkstra_path_from(&pather, Point::new(3, 3)).is_none());
        assert_eq!(pr.dijkstra_path_from(&pather, Point::new(0, 0)), Some(vec![]));
    }
}
