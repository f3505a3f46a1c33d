//! End-to-end properties of the grid, its engines and the animation
//! scheduler.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tilegrid_anim::{Animation, AnimationState, Easing, Property, Scheduler};
use tilegrid_paths::{MovementPather, path_cost};
use tilegrid_world::{
    EntityId, Error, FovAlgorithm, Grid, GridConfig, Movement, Perspective, Point,
};

const ALGORITHMS: [FovAlgorithm; 2] = [FovAlgorithm::Basic, FovAlgorithm::Shadow];

/// A grid with roughly `density` of its tiles walled, except `keep`.
fn random_grid(seed: u64, w: i32, h: i32, density: f64, config: GridConfig, keep: &[Point]) -> Grid {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut g = Grid::with_config(w, h, config).unwrap();
    for p in g.range() {
        if rng.random::<f64>() < density && !keep.contains(&p) {
            g.set_wall(p.x, p.y).unwrap();
        }
    }
    g
}

fn visible_set(g: &Grid) -> BTreeSet<Point> {
    g.visible_tiles().collect()
}

#[test]
fn get_tile_bounds() {
    let g = Grid::new(7, 4).unwrap();
    for y in -2..6 {
        for x in -2..9 {
            let inside = (0..7).contains(&x) && (0..4).contains(&y);
            match g.get_tile(x, y) {
                Ok(_) => assert!(inside, "({x}, {y})"),
                Err(e) => {
                    assert!(!inside, "({x}, {y})");
                    assert_eq!(
                        e,
                        Error::OutOfBounds {
                            x,
                            y,
                            width: 7,
                            height: 4
                        }
                    );
                }
            }
        }
    }
}

#[test]
fn fov_on_open_grid_is_euclidean_disc() {
    let mut g = Grid::new(25, 25).unwrap();
    for algorithm in ALGORITHMS {
        for (src, radius) in [(Point::new(12, 12), 1), (Point::new(12, 12), 5), (Point::new(3, 20), 7)] {
            g.compute_fov(src.x, src.y, radius, algorithm).unwrap();
            for p in g.range() {
                let expected = src.distance_sq(p) <= (radius as i64).pow(2);
                assert_eq!(
                    g.is_visible(p.x, p.y).unwrap(),
                    expected,
                    "{algorithm:?} from {src} r={radius} at {p}"
                );
            }
        }
    }
}

#[test]
fn adding_an_opaque_tile_never_adds_visibility() {
    let src = Point::new(10, 10);
    for algorithm in ALGORITHMS {
        for seed in 0..8 {
            let mut g = random_grid(seed, 21, 21, 0.15, GridConfig::default(), &[src]);
            let mut rng = StdRng::seed_from_u64(seed + 100);
            for _ in 0..10 {
                g.compute_fov(src.x, src.y, 8, algorithm).unwrap();
                let before = visible_set(&g);
                let wall = Point::new(rng.random_range(0..21), rng.random_range(0..21));
                if wall == src {
                    continue;
                }
                g.set_transparent(wall.x, wall.y, false).unwrap();
                g.compute_fov(src.x, src.y, 8, algorithm).unwrap();
                let after = visible_set(&g);
                assert!(
                    after.is_subset(&before),
                    "{algorithm:?} seed {seed}: wall at {wall} revealed {:?}",
                    after.difference(&before).collect::<Vec<_>>()
                );
            }
        }
    }
}

#[test]
fn astar_matches_dijkstra_distance() {
    for movement in [Movement::Cardinal, Movement::Chebyshev, Movement::Octile] {
        for seed in 0..6 {
            let src = Point::new(1, 1);
            let config = GridConfig::default().with_movement(movement);
            let mut g = random_grid(seed, 24, 16, 0.3, config, &[src]);
            g.compute_dijkstra(src.x, src.y).unwrap();
            let distances: Vec<(Point, Option<f64>)> = g
                .range()
                .iter()
                .map(|p| (p, g.get_distance(p.x, p.y).unwrap()))
                .collect();

            for (p, d) in distances {
                let path = g.find_path(src.x, src.y, p.x, p.y).unwrap();
                match (d, path) {
                    (None, None) => {}
                    (Some(d), Some(path)) => {
                        let store = g.tiles();
                        let pather = MovementPather::new(movement, |q: Point| store.is_walkable(q));
                        let cost = path_cost(&pather, src, &path);
                        assert!(
                            (cost - d).abs() < 1e-9,
                            "{movement:?} seed {seed}: A* cost {cost} vs field {d} at {p}"
                        );
                        if movement != Movement::Octile {
                            assert_eq!(path.len() as f64, d);
                        }
                    }
                    (d, path) => panic!("{movement:?} seed {seed} at {p}: field {d:?}, path {path:?}"),
                }
            }
        }
    }
}

#[test]
fn enclosed_target_is_unreachable_not_an_error() {
    let mut g = Grid::new(9, 9).unwrap();
    for p in Point::new(6, 6).neighbors_8() {
        g.set_wall(p.x, p.y).unwrap();
    }
    assert_eq!(g.find_path(0, 0, 6, 6).unwrap(), None);

    let mut g = Grid::with_config(9, 9, GridConfig::default().with_movement(Movement::Octile)).unwrap();
    for p in Point::new(6, 6).neighbors_4() {
        g.set_wall(p.x, p.y).unwrap();
    }
    // Diagonal entry would cut two wall corners.
    assert_eq!(g.find_path(0, 0, 6, 6).unwrap(), None);
}

#[test]
fn dijkstra_paths_lead_back_to_the_source() {
    for seed in 0..6 {
        let src = Point::new(12, 8);
        let mut g = random_grid(seed, 24, 16, 0.3, GridConfig::default(), &[src]);
        let reached = g.compute_dijkstra(src.x, src.y).unwrap();
        let mut checked = 0;
        for p in g.range() {
            let Some(d) = g.get_distance(p.x, p.y).unwrap() else {
                assert_eq!(g.get_path_from(p.x, p.y).unwrap(), None);
                continue;
            };
            checked += 1;
            let path = g.get_path_from(p.x, p.y).unwrap().unwrap();
            assert_eq!(path.len() as f64, d, "seed {seed} at {p}");
            if p == src {
                assert!(path.is_empty());
            } else {
                assert_eq!(path.last(), Some(&src));
                assert!(!path.contains(&p));
            }
        }
        assert_eq!(checked, reached);
    }
}

#[test]
fn camera_animation_lands_exactly_and_fires_once() {
    let g = Grid::new(40, 40).unwrap();
    let camera = g.camera().clone();
    let mut scheduler = Scheduler::new();
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let handle = scheduler
        .start(
            &camera,
            Animation::new(Property::X, 31.7, 0.25)
                .easing(Easing::EaseInOut)
                .on_complete(move |_, _| counter.set(counter.get() + 1)),
        )
        .unwrap();
    for _ in 0..3 {
        scheduler.tick(0.07);
    }
    assert_eq!(fired.get(), 0);
    scheduler.tick(1.0);
    scheduler.tick(1.0);
    assert_eq!(g.camera_state().center().0, 31.7);
    assert_eq!(fired.get(), 1);
    assert_eq!(handle.state(), AnimationState::Completed);
}

#[test]
fn superseded_animation_callback_never_fires() {
    let g = Grid::new(10, 10).unwrap();
    let mut scheduler = Scheduler::new();
    let first = Rc::new(Cell::new(false));
    let flag = first.clone();
    let a = scheduler
        .start(
            g.camera(),
            Animation::new(Property::Scale, 3.0, 1.0).on_complete(move |_, _| flag.set(true)),
        )
        .unwrap();
    scheduler.tick(0.5);
    let zoom_mid = g.camera_state().zoom();
    assert_eq!(zoom_mid, 2.0);
    scheduler
        .start(g.camera(), Animation::new(Property::Scale, 0.5, 1.0))
        .unwrap();
    for _ in 0..10 {
        scheduler.tick(0.5);
    }
    assert!(!first.get());
    assert_eq!(a.state(), AnimationState::Cancelled);
    assert_eq!(g.camera_state().zoom(), 0.5);
}

#[test]
fn camera_rejects_invalid_zoom_target_up_front() {
    let g = Grid::new(10, 10).unwrap();
    let mut scheduler = Scheduler::new();
    for zoom in [0.0, -1.5] {
        assert!(matches!(
            scheduler.start(g.camera(), Animation::new(Property::Scale, zoom, 1.0)),
            Err(Error::InvalidConfiguration(_))
        ));
    }
    assert!(scheduler.is_empty());
    assert_eq!(g.camera_state().zoom(), 1.0);
}

#[test]
fn walled_dijkstra_sources_keep_fields_walkable_back() {
    for seed in 0..6 {
        let mut g = random_grid(seed, 16, 12, 0.35, GridConfig::default(), &[]);
        let mut rng = StdRng::seed_from_u64(seed + 50);
        let sources: Vec<Point> = (0..4)
            .map(|_| Point::new(rng.random_range(0..16), rng.random_range(0..12)))
            .collect();
        g.compute_dijkstra_multi(&sources, None).unwrap();
        for p in g.range() {
            let d = g.get_distance(p.x, p.y).unwrap();
            let path = g.get_path_from(p.x, p.y).unwrap();
            assert_eq!(d.is_some(), path.is_some(), "seed {seed} at {p}");
            if let (Some(d), Some(path)) = (d, path) {
                assert!(g.tiles().is_walkable(p));
                assert_eq!(path.len() as f64, d, "seed {seed} at {p}");
                let end = path.last().copied().unwrap_or(p);
                assert!(sources.contains(&end));
            }
        }
    }
}

#[test]
fn unwalkable_target_is_none_even_at_the_start() {
    let mut g = Grid::new(5, 5).unwrap();
    g.set_wall(2, 2).unwrap();
    assert_eq!(g.find_path(2, 2, 2, 2).unwrap(), None);
    assert_eq!(g.find_path(0, 0, 2, 2).unwrap(), None);
    assert_eq!(g.find_path(1, 1, 1, 1).unwrap(), Some(vec![]));
}

#[test]
fn placement_invariant_survives_random_operations() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut g = Grid::new(12, 9).unwrap();
    let mut live: Vec<EntityId> = Vec::new();

    for _ in 0..500 {
        let x = rng.random_range(-2..14);
        let y = rng.random_range(-2..11);
        match rng.random_range(0..3) {
            0 => {
                if let Ok(id) = g.create_entity(x, y, 0) {
                    live.push(id);
                }
            }
            1 if !live.is_empty() => {
                let id = live[rng.random_range(0..live.len())];
                let before = g.entity(id).unwrap().pos();
                if g.move_entity(id, x, y).is_err() {
                    assert_eq!(g.entity(id).unwrap().pos(), before);
                }
            }
            2 if !live.is_empty() => {
                let id = live.swap_remove(rng.random_range(0..live.len()));
                g.destroy_entity(id).unwrap();
            }
            _ => {}
        }

        let mut placed = BTreeSet::new();
        for (p, tile) in g.tiles().iter() {
            for &id in tile.occupants() {
                assert_eq!(g.entity(id).unwrap().pos(), p);
                assert!(placed.insert(id), "{id} on two tiles");
            }
        }
        let registered: BTreeSet<EntityId> = g.entity_ids().collect();
        assert_eq!(placed, registered);
        assert_eq!(registered, live.iter().copied().collect::<BTreeSet<_>>());
    }
}

#[test]
fn scenario_shadowcast_radius_three() {
    let mut g = Grid::new(10, 10).unwrap();
    g.compute_fov(5, 5, 3, FovAlgorithm::Shadow).unwrap();
    assert!(g.is_visible(5, 5).unwrap());
    assert!(g.is_visible(8, 5).unwrap());
    assert!(!g.is_visible(9, 5).unwrap());
}

#[test]
fn scenario_path_detours_around_wall() {
    let mut g = Grid::new(10, 10).unwrap();
    g.set_wall(5, 4).unwrap();
    let path = g.find_path(5, 0, 5, 9).unwrap().unwrap();
    assert!(!path.contains(&Point::new(5, 4)));
    assert_eq!(path.last(), Some(&Point::new(5, 9)));
    assert_eq!(path.len(), 11);
    let mut prev = Point::new(5, 0);
    for &step in &path {
        assert_eq!((step - prev).x.abs() + (step - prev).y.abs(), 1);
        assert!(g.tiles().is_walkable(step));
        prev = step;
    }
}

#[test]
fn entity_perspective_reveals_gradually() {
    let mut g = Grid::new(30, 3).unwrap();
    for x in 0..30 {
        g.set_wall(x, 0).unwrap();
        g.set_wall(x, 2).unwrap();
    }
    let scout = g.create_entity(1, 1, 0).unwrap();
    g.set_sight_radius(scout, 4).unwrap();
    g.set_perspective(Perspective::Entity(scout)).unwrap();

    for x in 1..29 {
        g.move_entity(scout, x, 1).unwrap();
        g.update_entity_visibility(scout).unwrap();
        if x + 4 < 30 {
            assert!(g.perspective_knowledge(x + 4, 1).unwrap().visible);
        }
    }
    let start = g.perspective_knowledge(1, 1).unwrap();
    assert!(start.discovered && !start.visible);
    assert!(g.perspective_knowledge(0, 0).unwrap().discovered);
}
