//! Pathfinding algorithms for tile grids.
//!
//! - **A\*** shortest-path search ([`PathRange::astar_path`])
//! - **Dijkstra** multi-source distance fields ([`PathRange::dijkstra_map`])
//!   with downhill path extraction ([`PathRange::dijkstra_path_from`])
//!
//! All algorithms operate through [`PathRange`], which owns and reuses
//! internal caches so that repeated queries incur zero allocations after
//! warm-up.
//!
//! # Trait hierarchy
//!
//! | Trait | Required for |
//! |---|---|
//! | [`Pather`] | Dijkstra descent |
//! | [`WeightedPather`] : [`Pather`] | Dijkstra |
//! | [`AstarPather`] : [`WeightedPather`] | A* |
//!
//! [`MovementPather`] implements all three from a
//! [`Movement`](tilegrid_core::Movement) model and a walkability predicate.

mod astar;
mod dijkstra;
mod neighbors;
mod pathrange;
mod traits;

pub use astar::path_cost;
pub use neighbors::{MovementPather, push_neighbors};
pub use pathrange::{PathNode, PathRange, UNREACHABLE};
pub use traits::{AstarPather, Pather, WeightedPather};
