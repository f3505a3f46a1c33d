//! A single grid tile.

use std::collections::BTreeSet;

use tilegrid_core::{EntityId, Rgba};

/// Sprite index meaning "no overlay sprite".
pub const NO_SPRITE: i32 = -1;

/// One addressable cell of the grid.
///
/// Tiles are only mutated through [`TilesMut`](crate::TilesMut) setters;
/// the occupant set is maintained by the [`Grid`](crate::Grid) so that it
/// always matches the entities' recorded positions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub(crate) walkable: bool,
    pub(crate) transparent: bool,
    pub(crate) base_sprite: i32,
    pub(crate) overlay_sprite: i32,
    pub(crate) tint: Rgba,
    pub(crate) overlay_tint: Rgba,
    pub(crate) occupants: BTreeSet<EntityId>,
}

impl Tile {
    /// A walkable, transparent tile drawn with `sprite`.
    pub fn floor(sprite: i32) -> Self {
        Self {
            walkable: true,
            transparent: true,
            base_sprite: sprite,
            overlay_sprite: NO_SPRITE,
            tint: Rgba::WHITE,
            overlay_tint: Rgba::WHITE,
            occupants: BTreeSet::new(),
        }
    }

    pub fn walkable(&self) -> bool {
        self.walkable
    }

    pub fn transparent(&self) -> bool {
        self.transparent
    }

    pub fn base_sprite(&self) -> i32 {
        self.base_sprite
    }

    /// Overlay sprite, [`NO_SPRITE`] when unset.
    pub fn overlay_sprite(&self) -> i32 {
        self.overlay_sprite
    }

    pub fn overlay(&self) -> Option<i32> {
        (self.overlay_sprite != NO_SPRITE).then_some(self.overlay_sprite)
    }

    pub fn tint(&self) -> Rgba {
        self.tint
    }

    pub fn overlay_tint(&self) -> Rgba {
        self.overlay_tint
    }

    /// Entities standing on this tile, in ascending id order.
    pub fn occupants(&self) -> &BTreeSet<EntityId> {
        &self.occupants
    }

    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::floor(0)
    }
}
