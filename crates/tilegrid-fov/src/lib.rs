//! Field of view for tile grids: Bresenham ray casting, recursive
//! shadowcasting and sparse per-observer visibility memory.

pub mod fov;
pub mod line;
pub mod memory;

pub use fov::FOV;
pub use line::{bresenham_into, bresenham_line};
pub use memory::{TileKnowledge, VisibilityMemory};
pub use tilegrid_core::FovAlgorithm;
