//! Shared cave-exploration model used by the demo binaries.
//!
//! Demonstrates: cellular automata cave generation, per-entity visibility
//! memory painted into a fog layer, A* routes, a Dijkstra field driving
//! monsters toward the player, and an animated camera following the player.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tilegrid_anim::{Easing, Property, Scheduler};
use tilegrid_world::{
    CellularAutomataRule, EntityId, Grid, LayerHandle, LayerKind, LayerValue, MapGen,
    Perspective, Point, Result, Rgba,
};

pub const MAP_WIDTH: i32 = 72;
pub const MAP_HEIGHT: i32 = 24;
pub const VIEW_WIDTH: i32 = 48;
pub const VIEW_HEIGHT: i32 = 16;

const PLAYER: char = '@';
const MONSTERS: [char; 4] = ['g', 'k', 'r', 'z'];

// Fog shades
const FOG_VISIBLE: Rgba = Rgba::TRANSPARENT;
const FOG_REMEMBERED: Rgba = Rgba::from_rgba(0, 0, 0, 160);
const FOG_UNKNOWN: Rgba = Rgba::BLACK;

/// Seconds of camera motion per turn, and the frame step used to play it.
const CAMERA_SECS: f32 = 0.3;
const FRAME_SECS: f32 = 1.0 / 30.0;

pub struct Demo {
    pub grid: Grid,
    pub player: EntityId,
    monsters: Vec<EntityId>,
    fog: LayerHandle,
    scheduler: Scheduler,
    rng: StdRng,
    route: Vec<Point>,
    turn: u32,
}

impl Demo {
    pub fn new(seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = Grid::new(MAP_WIDTH, MAP_HEIGHT)?;
        grid.tiles_mut().fill(false, false);

        // Open up caves, then only smooth them.
        let rules = [
            CellularAutomataRule {
                w_cutoff1: 5,
                w_cutoff2: 2,
                walls_out_of_range: true,
                reps: 4,
            },
            CellularAutomataRule {
                w_cutoff1: 5,
                w_cutoff2: -1,
                walls_out_of_range: true,
                reps: 3,
            },
        ];
        let mut mg = MapGen::new(grid.tiles_mut(), StdRng::seed_from_u64(seed));
        let floors = mg.cellular_automata_cave(0.45, &rules);
        log::info!("cave generated: {floors} floor tiles");

        let start = match largest_area(&mut grid)? {
            Some(p) => p,
            None => {
                let p = Point::new(MAP_WIDTH / 2, MAP_HEIGHT / 2);
                grid.set_floor(p.x, p.y)?;
                p
            }
        };
        let player = grid.create_entity(start.x, start.y, PLAYER as i32)?;
        grid.set_sight_radius(player, 7)?;
        grid.set_perspective(Perspective::Entity(player))?;

        // Monsters only go where the player can walk to.
        grid.compute_dijkstra(start.x, start.y)?;
        let mut monsters = Vec::new();
        let mut attempts = 0;
        while monsters.len() < 6 && attempts < 500 {
            attempts += 1;
            let p = Point::new(rng.random_range(0..MAP_WIDTH), rng.random_range(0..MAP_HEIGHT));
            let far_enough = grid.get_distance(p.x, p.y)?.is_some_and(|d| d >= 8.0);
            if !far_enough || !grid.entities_at(p.x, p.y)?.is_empty() {
                continue;
            }
            let ch = MONSTERS[monsters.len() % MONSTERS.len()];
            monsters.push(grid.create_entity(p.x, p.y, ch as i32)?);
        }

        let fog = grid.add_layer(LayerKind::Color, 1);
        grid.set_center(start.x as f32, start.y as f32)?;

        let mut demo = Self {
            grid,
            player,
            monsters,
            fog,
            scheduler: Scheduler::new(),
            rng,
            route: Vec::new(),
            turn: 0,
        };
        demo.look()?;
        Ok(demo)
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Play one turn: the player walks one step of its route, monsters
    /// that see the player close in, and the camera glides to the player.
    pub fn step(&mut self) -> Result<()> {
        self.turn += 1;
        if self.route.is_empty() {
            self.plan_route()?;
        }
        if !self.route.is_empty() {
            let next = self.route.remove(0);
            self.grid.move_entity(self.player, next.x, next.y)?;
        }
        self.look()?;
        self.move_monsters()?;
        self.follow_player()
    }

    /// Pick a random reachable destination and route the player to it.
    fn plan_route(&mut self) -> Result<()> {
        let from = self.grid.entity(self.player)?.pos();
        self.grid.compute_dijkstra(from.x, from.y)?;
        let mut candidates = Vec::new();
        for p in self.grid.range() {
            if self.grid.get_distance(p.x, p.y)?.is_some_and(|d| d >= 6.0) {
                candidates.push(p);
            }
        }
        if candidates.is_empty() {
            return Ok(());
        }
        let to = candidates[self.rng.random_range(0..candidates.len())];
        self.route = self
            .grid
            .find_path(from.x, from.y, to.x, to.y)?
            .unwrap_or_default();
        log::debug!("turn {}: heading to {to} in {} steps", self.turn, self.route.len());
        Ok(())
    }

    fn look(&mut self) -> Result<()> {
        self.grid.update_entity_visibility(self.player)?;
        self.grid
            .paint_entity_perspective(self.fog, self.player, FOG_VISIBLE, FOG_REMEMBERED, FOG_UNKNOWN)
    }

    fn move_monsters(&mut self) -> Result<()> {
        let target = self.grid.entity(self.player)?.pos();
        self.grid.compute_dijkstra(target.x, target.y)?;
        for &m in &self.monsters {
            self.grid.update_entity_visibility(m)?;
            if !self.grid.entity_visibility(m, target.x, target.y)?.visible {
                continue;
            }
            let pos = self.grid.entity(m)?.pos();
            let Some(path) = self.grid.get_path_from(pos.x, pos.y)? else {
                continue;
            };
            let Some(&step) = path.first() else {
                continue;
            };
            if step != target && self.grid.entities_at(step.x, step.y)?.is_empty() {
                self.grid.move_entity(m, step.x, step.y)?;
            }
        }
        Ok(())
    }

    fn follow_player(&mut self) -> Result<()> {
        let p = self.grid.entity(self.player)?.pos();
        let camera = self.grid.camera().clone();
        self.scheduler
            .animate(&camera, Property::X, p.x as f32, CAMERA_SECS, Easing::EaseOut)?;
        self.scheduler
            .animate(&camera, Property::Y, p.y as f32, CAMERA_SECS, Easing::EaseOut)?;
        while !self.scheduler.is_empty() {
            self.scheduler.tick(FRAME_SECS);
        }
        Ok(())
    }

    /// Draw the camera's view as text, one line per row.
    pub fn render(&self) -> Result<String> {
        let view = self.grid.view_range(VIEW_WIDTH, VIEW_HEIGHT);
        let Some(fog) = self.grid.layer(self.fog) else {
            return Ok(String::new());
        };
        let mut out = String::with_capacity(view.len() + view.height() as usize);
        for y in view.min.y..view.max.y {
            for x in view.min.x..view.max.x {
                let shade = match fog.get(x, y)? {
                    LayerValue::Color(c) => c.a(),
                    LayerValue::Sprite(_) => 0,
                };
                out.push(self.glyph(x, y, shade)?);
            }
            out.push('\n');
        }
        Ok(out)
    }

    fn glyph(&self, x: i32, y: i32, fog_alpha: u8) -> Result<char> {
        if fog_alpha == 255 {
            return Ok(' ');
        }
        let tile = self.grid.get_tile(x, y)?;
        if fog_alpha == 0 {
            if let Some(&id) = tile.occupants().iter().next() {
                let sprite = self.grid.entity(id)?.sprite();
                return Ok(char::from_u32(sprite as u32).unwrap_or('?'));
            }
        }
        Ok(match (tile.walkable(), fog_alpha) {
            (false, _) => '#',
            (true, 0) => '.',
            (true, _) => ',',
        })
    }

    pub fn monsters(&self) -> &[EntityId] {
        &self.monsters
    }

    /// Status line.
    pub fn status(&self) -> Result<String> {
        let p = self.grid.entity(self.player)?;
        Ok(format!(
            "turn {:>3}  pos {}  explored {} tiles  zoom {:.1}",
            self.turn,
            p.pos(),
            p.memory().discovered_len(),
            self.grid.camera_state().zoom()
        ))
    }
}

/// A walkable tile of the largest connected area, if any tile is walkable.
fn largest_area(grid: &mut Grid) -> Result<Option<Point>> {
    let range = grid.range();
    let mut covered = vec![false; range.len()];
    let mut best: Option<(Point, usize)> = None;
    for p in range {
        let Some(i) = range.index_of(p) else {
            continue;
        };
        if covered[i] || !grid.tiles().is_walkable(p) {
            continue;
        }
        let size = grid.compute_dijkstra(p.x, p.y)?;
        for (j, q) in range.iter().enumerate() {
            if grid.get_distance(q.x, q.y)?.is_some() {
                covered[j] = true;
            }
        }
        if best.is_none_or(|(_, s)| size > s) {
            best = Some((p, size));
        }
    }
    Ok(best.map(|(p, _)| p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exploration_grows_memory() {
        let mut demo = Demo::new(42).unwrap();
        let before = demo.grid.entity(demo.player).unwrap().memory().discovered_len();
        for _ in 0..20 {
            demo.step().unwrap();
        }
        let after = demo.grid.entity(demo.player).unwrap().memory().discovered_len();
        assert!(after >= before);
        assert_eq!(demo.turn(), 20);
    }

    #[test]
    fn caves_have_room_and_monsters() {
        for seed in [3, 7, 42] {
            let demo = Demo::new(seed).unwrap();
            let floors = demo.grid.tiles().count_walkable();
            let area = (MAP_WIDTH * MAP_HEIGHT) as usize;
            assert!(floors > area / 5 && floors < area, "seed {seed}: {floors} floors");
            assert!(!demo.monsters().is_empty(), "seed {seed}: no monsters");
            for &m in demo.monsters() {
                let p = demo.grid.entity(m).unwrap().pos();
                assert!(demo.grid.tiles().is_walkable(p));
            }
        }
    }

    #[test]
    fn render_shows_the_player() {
        let demo = Demo::new(7).unwrap();
        let frame = demo.render().unwrap();
        assert!(frame.contains(PLAYER));
        assert!(frame.lines().all(|l| l.chars().count() <= VIEW_WIDTH as usize));
    }

    #[test]
    fn camera_settles_on_the_player() {
        let mut demo = Demo::new(3).unwrap();
        demo.step().unwrap();
        let p = demo.grid.entity(demo.player).unwrap().pos();
        assert_eq!(demo.grid.camera_state().center(), (p.x as f32, p.y as f32));
    }
}
