//! The tile grid: tiles, entities, overlay layers and camera, tied to the
//! field of view and pathfinding engines.
//!
//! [`Grid`] is the aggregate a game layer works with. It owns a
//! [`GridStore`] of tiles, an [`EntityRegistry`], any number of overlay
//! [`Layer`]s, a shared [`Camera`], and the current FOV and Dijkstra
//! snapshots.
//!
//! ```
//! use tilegrid_world::{FovAlgorithm, Grid};
//!
//! let mut grid = Grid::new(10, 10)?;
//! grid.set_wall(5, 4)?;
//! grid.compute_fov(5, 5, 3, FovAlgorithm::Shadow)?;
//! assert!(grid.is_visible(8, 5)?);
//!
//! let path = grid.find_path(5, 0, 5, 9)?.expect("route exists");
//! assert!(!path.contains(&tilegrid_world::Point::new(5, 4)));
//! # Ok::<(), tilegrid_world::Error>(())
//! ```

pub mod camera;
pub mod entity;
pub mod grid;
pub mod layer;
pub mod mapgen;
pub mod store;
pub mod tile;

pub use camera::{Camera, Perspective};
pub use entity::{Entity, EntityRegistry};
pub use grid::Grid;
pub use layer::{Layer, LayerHandle, LayerKind, LayerValue};
pub use mapgen::{CellularAutomataRule, EightDirectionWalker, FourDirectionWalker, MapGen, RandomWalker};
pub use store::{GridStore, TilesMut};
pub use tile::{NO_SPRITE, Tile};

pub use tilegrid_core::{EntityId, Error, FovAlgorithm, GridConfig, Movement, Point, Range, Result, Rgba};
pub use tilegrid_fov::TileKnowledge;
