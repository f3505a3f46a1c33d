//! Dense tile storage.

use std::ops::Deref;

use tilegrid_core::{EntityId, Error, Point, Range, Result, Rgba};

use crate::tile::Tile;

/// Row-major array of [`Tile`]s with fixed dimensions.
///
/// Every setter is O(1), validates its coordinates first and leaves the
/// store untouched on [`Error::OutOfBounds`]. Outside this crate tiles are
/// written through [`TilesMut`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridStore {
    range: Range,
    tiles: Vec<Tile>,
}

impl GridStore {
    /// A `width × height` store of floor tiles drawn with `sprite`.
    ///
    /// Both dimensions must be positive.
    pub(crate) fn new(width: i32, height: i32, sprite: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::invalid(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        let range = Range::sized(width, height);
        Ok(Self {
            range,
            tiles: vec![Tile::floor(sprite); range.len()],
        })
    }

    pub fn width(&self) -> i32 {
        self.range.width()
    }

    pub fn height(&self) -> i32 {
        self.range.height()
    }

    /// `[0, width) × [0, height)`.
    pub fn range(&self) -> Range {
        self.range
    }

    pub fn contains(&self, p: Point) -> bool {
        self.range.contains(p)
    }

    /// Flat index of `p`, or [`Error::OutOfBounds`].
    pub fn index(&self, p: Point) -> Result<usize> {
        self.range.index_of(p).ok_or(Error::OutOfBounds {
            x: p.x,
            y: p.y,
            width: self.width(),
            height: self.height(),
        })
    }

    /// Fail with [`Error::OutOfBounds`] unless `p` is on the grid.
    pub fn check(&self, p: Point) -> Result<()> {
        self.index(p).map(|_| ())
    }

    pub fn get_tile(&self, x: i32, y: i32) -> Result<&Tile> {
        let i = self.index(Point::new(x, y))?;
        Ok(&self.tiles[i])
    }

    /// The tile at `p`, `None` off the grid.
    pub fn tile(&self, p: Point) -> Option<&Tile> {
        self.range.index_of(p).map(|i| &self.tiles[i])
    }

    fn tile_mut(&mut self, x: i32, y: i32) -> Result<&mut Tile> {
        let i = self.index(Point::new(x, y))?;
        Ok(&mut self.tiles[i])
    }

    pub(crate) fn set_walkable(&mut self, x: i32, y: i32, walkable: bool) -> Result<()> {
        self.tile_mut(x, y)?.walkable = walkable;
        Ok(())
    }

    pub(crate) fn set_transparent(&mut self, x: i32, y: i32, transparent: bool) -> Result<()> {
        self.tile_mut(x, y)?.transparent = transparent;
        Ok(())
    }

    pub(crate) fn set_sprite(&mut self, x: i32, y: i32, sprite: i32) -> Result<()> {
        self.tile_mut(x, y)?.base_sprite = sprite;
        Ok(())
    }

    /// Set the overlay sprite; [`NO_SPRITE`](crate::NO_SPRITE) clears it.
    pub(crate) fn set_overlay_sprite(&mut self, x: i32, y: i32, sprite: i32) -> Result<()> {
        self.tile_mut(x, y)?.overlay_sprite = sprite;
        Ok(())
    }

    pub(crate) fn set_tint(&mut self, x: i32, y: i32, tint: Rgba) -> Result<()> {
        self.tile_mut(x, y)?.tint = tint;
        Ok(())
    }

    pub(crate) fn set_overlay_tint(&mut self, x: i32, y: i32, tint: Rgba) -> Result<()> {
        self.tile_mut(x, y)?.overlay_tint = tint;
        Ok(())
    }

    /// Make `(x, y)` walkable and transparent.
    pub(crate) fn set_floor(&mut self, x: i32, y: i32) -> Result<()> {
        let t = self.tile_mut(x, y)?;
        t.walkable = true;
        t.transparent = true;
        Ok(())
    }

    /// Make `(x, y)` neither walkable nor transparent.
    pub(crate) fn set_wall(&mut self, x: i32, y: i32) -> Result<()> {
        let t = self.tile_mut(x, y)?;
        t.walkable = false;
        t.transparent = false;
        Ok(())
    }

    /// Set the flags of every tile.
    pub(crate) fn fill(&mut self, walkable: bool, transparent: bool) {
        for t in &mut self.tiles {
            t.walkable = walkable;
            t.transparent = transparent;
        }
    }

    /// Whether `p` can be walked on. `false` off the grid.
    pub fn is_walkable(&self, p: Point) -> bool {
        self.tile(p).is_some_and(|t| t.walkable)
    }

    /// Whether `p` lets sight through. `false` off the grid.
    pub fn is_transparent(&self, p: Point) -> bool {
        self.tile(p).is_some_and(|t| t.transparent)
    }

    /// Number of walkable tiles.
    pub fn count_walkable(&self) -> usize {
        self.tiles.iter().filter(|t| t.walkable).count()
    }

    /// Iterate over every tile with its position, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &Tile)> + '_ {
        self.range.iter().zip(self.tiles.iter())
    }

    pub(crate) fn add_occupant(&mut self, p: Point, id: EntityId) -> Result<()> {
        let i = self.index(p)?;
        self.tiles[i].occupants.insert(id);
        Ok(())
    }

    pub(crate) fn remove_occupant(&mut self, p: Point, id: EntityId) -> bool {
        match self.range.index_of(p) {
            Some(i) => self.tiles[i].occupants.remove(&id),
            None => false,
        }
    }
}

/// Write access to a grid's tiles.
///
/// Reads go through [`Deref`] to the [`GridStore`]. The store itself cannot
/// be swapped out, so the grid keeps its dimensions and its occupant sets.
pub struct TilesMut<'a> {
    store: &'a mut GridStore,
}

impl<'a> TilesMut<'a> {
    pub(crate) fn new(store: &'a mut GridStore) -> Self {
        Self { store }
    }

    pub fn set_walkable(&mut self, x: i32, y: i32, walkable: bool) -> Result<()> {
        self.store.set_walkable(x, y, walkable)
    }

    pub fn set_transparent(&mut self, x: i32, y: i32, transparent: bool) -> Result<()> {
        self.store.set_transparent(x, y, transparent)
    }

    pub fn set_sprite(&mut self, x: i32, y: i32, sprite: i32) -> Result<()> {
        self.store.set_sprite(x, y, sprite)
    }

    /// Set the overlay sprite; [`NO_SPRITE`](crate::NO_SPRITE) clears it.
    pub fn set_overlay_sprite(&mut self, x: i32, y: i32, sprite: i32) -> Result<()> {
        self.store.set_overlay_sprite(x, y, sprite)
    }

    pub fn set_tint(&mut self, x: i32, y: i32, tint: Rgba) -> Result<()> {
        self.store.set_tint(x, y, tint)
    }

    pub fn set_overlay_tint(&mut self, x: i32, y: i32, tint: Rgba) -> Result<()> {
        self.store.set_overlay_tint(x, y, tint)
    }

    pub fn set_floor(&mut self, x: i32, y: i32) -> Result<()> {
        self.store.set_floor(x, y)
    }

    pub fn set_wall(&mut self, x: i32, y: i32) -> Result<()> {
        self.store.set_wall(x, y)
    }

    pub fn fill(&mut self, walkable: bool, transparent: bool) {
        self.store.fill(walkable, transparent);
    }
}

impl Deref for TilesMut<'_> {
    type Target = GridStore;

    fn deref(&self) -> &GridStore {
        &*self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_dimensions() {
        assert!(matches!(
            GridStore::new(0, 5, 0),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(GridStore::new(3, -1, 0).is_err());
    }

    #[test]
    fn bounds_are_checked() {
        let mut s = GridStore::new(4, 3, 0).unwrap();
        for p in s.range() {
            assert!(s.get_tile(p.x, p.y).is_ok());
        }
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 3), (i32::MAX, i32::MIN)] {
            assert_eq!(
                s.get_tile(x, y).unwrap_err(),
                Error::OutOfBounds {
                    x,
                    y,
                    width: 4,
                    height: 3
                }
            );
            assert!(s.set_wall(x, y).is_err());
            assert!(!s.is_walkable(Point::new(x, y)));
        }
    }

    #[test]
    fn setters_touch_one_tile() {
        let mut s = GridStore::new(3, 3, 7).unwrap();
        s.set_wall(1, 1).unwrap();
        s.set_overlay_sprite(1, 1, 9).unwrap();
        s.set_tint(1, 1, Rgba::BLACK).unwrap();
        let t = s.get_tile(1, 1).unwrap();
        assert!(!t.walkable() && !t.transparent());
        assert_eq!(t.overlay(), Some(9));
        assert_eq!(t.tint(), Rgba::BLACK);
        assert_eq!(t.base_sprite(), 7);
        assert_eq!(s.count_walkable(), 8);

        s.set_transparent(1, 1, true).unwrap();
        assert!(s.is_transparent(Point::new(1, 1)));
        assert!(!s.is_walkable(Point::new(1, 1)));
        s.set_floor(1, 1).unwrap();
        assert!(s.is_walkable(Point::new(1, 1)));
    }

    #[test]
    fn fill_sets_every_tile() {
        let mut s = GridStore::new(5, 2, 0).unwrap();
        s.fill(false, false);
        assert_eq!(s.count_walkable(), 0);
        assert!(s.iter().all(|(_, t)| !t.transparent()));
    }

    #[test]
    fn tiles_mut_writes_through() {
        let mut s = GridStore::new(4, 4, 0).unwrap();
        let mut tiles = TilesMut::new(&mut s);
        tiles.set_wall(2, 3).unwrap();
        tiles.set_sprite(0, 0, 5).unwrap();
        assert!(tiles.set_floor(4, 0).is_err());
        assert_eq!(tiles.count_walkable(), 15);
        assert_eq!(s.get_tile(0, 0).unwrap().base_sprite(), 5);
        assert_eq!(s.range(), Range::sized(4, 4));
    }
}
