//! **tilegrid-core**: shared types for the tilegrid engine.
//!
//! This crate provides the foundational types used across the *tilegrid*
//! workspace: geometry primitives, RGBA colors, the error taxonomy, the
//! grid configuration and the entity identifier.

pub mod color;
pub mod config;
pub mod error;
pub mod geom;

pub use color::{Channel, Rgba};
pub use config::{FovAlgorithm, GridConfig, Movement};
pub use error::{Error, Result};
pub use geom::{Point, Range};

/// Identifier of an entity living on a grid.
///
/// Ids are allocated monotonically and never reused by the grid that
/// issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
