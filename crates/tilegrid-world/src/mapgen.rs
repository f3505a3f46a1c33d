//! Map building helpers that carve floors into a grid's tiles.
//!
//! - **Random walk cave**: drunk walks from the center carve open space.
//! - **Cellular automata cave**: random walls smoothed by neighbour-count
//!   rules.
//! - **Rooms**: rectangular floor areas.
//!
//! Output depends only on the RNG, so a seeded RNG gives reproducible maps.

use rand::{Rng, RngExt};
use tilegrid_core::{Point, Range, Result};

use crate::store::{GridStore, TilesMut};

/// Picks the next position of a random walk.
pub trait RandomWalker {
    fn neighbor(&self, p: Point, rng: &mut impl Rng) -> Point;
}

/// Steps to one of the four orthogonal neighbours.
pub struct FourDirectionWalker;

impl RandomWalker for FourDirectionWalker {
    fn neighbor(&self, p: Point, rng: &mut impl Rng) -> Point {
        p.neighbors_4()[rng.random_range(0..4usize)]
    }
}

/// Steps to one of the eight surrounding tiles.
pub struct EightDirectionWalker;

impl RandomWalker for EightDirectionWalker {
    fn neighbor(&self, p: Point, rng: &mut impl Rng) -> Point {
        p.neighbors_8()[rng.random_range(0..8usize)]
    }
}

/// One cellular automata smoothing rule.
#[derive(Debug, Clone, PartialEq)]
pub struct CellularAutomataRule {
    /// Become a wall with at least this many walls among the 8 neighbours.
    pub w_cutoff1: i32,
    /// Become a wall with at most this many walls within distance 2.
    pub w_cutoff2: i32,
    /// Whether off-grid tiles count as walls.
    pub walls_out_of_range: bool,
    /// How many times the rule is applied.
    pub reps: usize,
}

impl Default for CellularAutomataRule {
    fn default() -> Self {
        Self {
            w_cutoff1: 5,
            w_cutoff2: 2,
            walls_out_of_range: true,
            reps: 4,
        }
    }
}

/// Map generator writing walls and floors through [`TilesMut`], usually
/// obtained from [`Grid::tiles_mut`](crate::Grid::tiles_mut).
pub struct MapGen<'a, R: Rng> {
    pub rng: R,
    tiles: TilesMut<'a>,
}

impl<'a, R: Rng> MapGen<'a, R> {
    pub fn new(tiles: TilesMut<'a>, rng: R) -> Self {
        Self { rng, tiles }
    }

    pub fn tiles(&self) -> &GridStore {
        &self.tiles
    }

    /// Carve floor with `walks` random walks from the center until
    /// `fill_pct` of the grid is walkable. Returns the number of tiles
    /// turned into floor.
    pub fn random_walk_cave(&mut self, walker: &impl RandomWalker, fill_pct: f64, walks: usize) -> usize {
        let range = self.tiles.range();
        let total = range.len();
        let target = (total as f64 * fill_pct.clamp(0.0, 1.0)) as usize;
        let start = Point::new(range.width() / 2, range.height() / 2);
        let mut floors = self.tiles.count_walkable();
        let mut carved = 0;

        'walks: for _ in 0..walks {
            let mut pos = start;
            for _ in 0..total * 4 {
                if floors >= target {
                    break 'walks;
                }
                if !self.tiles.is_walkable(pos) {
                    self.carve(pos);
                    floors += 1;
                    carved += 1;
                }
                let next = walker.neighbor(pos, &mut self.rng);
                if range.contains(next) {
                    pos = next;
                }
            }
        }
        log::debug!("random walk cave: carved {carved} tiles");
        carved
    }

    /// Fill the grid with walls at `wall_init_pct` probability, then apply
    /// each rule. Returns the number of floor tiles.
    pub fn cellular_automata_cave(&mut self, wall_init_pct: f64, rules: &[CellularAutomataRule]) -> usize {
        let range = self.tiles.range();
        let mut walls: Vec<bool> = range
            .iter()
            .map(|_| self.rng.random::<f64>() < wall_init_pct)
            .collect();
        let mut next = walls.clone();

        for rule in rules {
            for _ in 0..rule.reps {
                for (i, p) in range.iter().enumerate() {
                    let w1 = count_walls(&walls, range, p, 1, rule.walls_out_of_range);
                    let w2 = count_walls(&walls, range, p, 2, rule.walls_out_of_range);
                    next[i] = w1 >= rule.w_cutoff1 || w2 <= rule.w_cutoff2;
                }
                std::mem::swap(&mut walls, &mut next);
            }
        }

        let mut floors = 0;
        for (p, &wall) in range.iter().zip(walls.iter()) {
            if wall {
                self.wall(p);
            } else {
                self.carve(p);
                floors += 1;
            }
        }
        log::debug!("cellular automata cave: {floors} floor tiles");
        floors
    }

    /// Turn every tile of `room` into floor. The room must lie inside the
    /// grid. Returns the number of tiles carved.
    pub fn carve_room(&mut self, room: Range) -> Result<usize> {
        if room.is_empty() {
            return Ok(0);
        }
        self.tiles.check(room.min)?;
        self.tiles.check(room.max - Point::new(1, 1))?;
        for p in room {
            self.carve(p);
        }
        Ok(room.len())
    }

    fn carve(&mut self, p: Point) {
        if self.tiles.set_floor(p.x, p.y).is_err() {
            log::warn!("mapgen tried to carve off-grid tile {p}");
        }
    }

    fn wall(&mut self, p: Point) {
        if self.tiles.set_wall(p.x, p.y).is_err() {
            log::warn!("mapgen tried to wall off-grid tile {p}");
        }
    }
}

/// Walls within Chebyshev distance `radius` of `center`, center excluded.
fn count_walls(walls: &[bool], range: Range, center: Point, radius: i32, walls_out_of_range: bool) -> i32 {
    let mut count = 0;
    for p in Range::around(center, radius) {
        if p == center {
            continue;
        }
        let wall = match range.index_of(p) {
            Some(i) => walls[i],
            None => walls_out_of_range,
        };
        if wall {
            count += 1;
        }
    }
    count
}
