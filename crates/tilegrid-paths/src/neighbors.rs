use tilegrid_core::{Movement, Point};

use crate::traits::{AstarPather, Pather, WeightedPather};

const CARDINALS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONALS: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

/// Push the neighbours of `p` reachable under `movement` into `buf`.
///
/// Cardinal neighbours come first, in up/right/down/left order. A diagonal
/// neighbour is kept only when both orthogonal tiles it cuts past are kept
/// too (no corner cutting).
pub fn push_neighbors(
    p: Point,
    movement: Movement,
    keep: impl Fn(Point) -> bool,
    buf: &mut Vec<Point>,
) {
    for (dx, dy) in CARDINALS {
        let n = p.shift(dx, dy);
        if keep(n) {
            buf.push(n);
        }
    }
    if !movement.diagonals() {
        return;
    }
    for (dx, dy) in DIAGONALS {
        let n = p.shift(dx, dy);
        if keep(n) && keep(p.shift(dx, 0)) && keep(p.shift(0, dy)) {
            buf.push(n);
        }
    }
}

/// A pather driven by a [`Movement`] model and a walkability predicate.
///
/// Step costs and the heuristic follow the movement model, so the
/// heuristic stays admissible.
pub struct MovementPather<F> {
    movement: Movement,
    walkable: F,
}

impl<F: Fn(Point) -> bool> MovementPather<F> {
    pub fn new(movement: Movement, walkable: F) -> Self {
        Self { movement, walkable }
    }

    /// The movement model in use.
    pub fn movement(&self) -> Movement {
        self.movement
    }

    /// Whether `p` can be stepped on.
    pub fn is_walkable(&self, p: Point) -> bool {
        (self.walkable)(p)
    }
}

impl<F: Fn(Point) -> bool> Pather for MovementPather<F> {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        push_neighbors(p, self.movement, &self.walkable, buf);
    }
}

impl<F: Fn(Point) -> bool> WeightedPather for MovementPather<F> {
    fn cost(&self, from: Point, to: Point) -> f64 {
        self.movement.step_cost(to.x - from.x, to.y - from.y)
    }
}

impl<F: Fn(Point) -> bool> AstarPather for MovementPather<F> {
    fn estimate(&self, from: Point, to: Point) -> f64 {
        self.movement.estimate(to.x - from.x, to.y - from.y)
    }
}
