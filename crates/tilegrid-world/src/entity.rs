//! Entities and the registry that owns them.

use std::collections::BTreeMap;

use tilegrid_core::{EntityId, Error, Point, Result};
use tilegrid_fov::{TileKnowledge, VisibilityMemory};

/// A movable object placed on the grid.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    pub(crate) pos: Point,
    pub(crate) sprite: i32,
    pub(crate) sight_radius: i32,
    pub(crate) memory: VisibilityMemory,
}

impl Entity {
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Current tile.
    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn sprite(&self) -> i32 {
        self.sprite
    }

    pub fn sight_radius(&self) -> i32 {
        self.sight_radius
    }

    /// What this entity has seen so far.
    pub fn memory(&self) -> &VisibilityMemory {
        &self.memory
    }

    /// Knowledge about `p`, [`TileKnowledge::UNKNOWN`] if never seen.
    pub fn knows(&self, p: Point) -> TileKnowledge {
        self.memory.get(p)
    }
}

/// Live entities keyed by id. Ids are handed out in increasing order and
/// never reused.
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new entity. Placement on a tile is the caller's job.
    pub(crate) fn insert(&mut self, pos: Point, sprite: i32, sight_radius: i32) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            id,
            Entity {
                id,
                pos,
                sprite,
                sight_radius,
                memory: VisibilityMemory::new(),
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Result<Entity> {
        self.entities.remove(&id).ok_or(Error::UnknownEntity(id))
    }

    pub fn get(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(&id).ok_or(Error::UnknownEntity(id))
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities.get_mut(&id).ok_or(Error::UnknownEntity(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Live ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Live entities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut r = EntityRegistry::new();
        let a = r.insert(Point::new(0, 0), 1, 4);
        let b = r.insert(Point::new(1, 0), 1, 4);
        assert!(a < b);
        r.remove(a).unwrap();
        let c = r.insert(Point::new(2, 0), 1, 4);
        assert!(c > b);
        assert_eq!(r.ids().collect::<Vec<_>>(), vec![b, c]);
        assert_eq!(r.remove(a).unwrap_err(), Error::UnknownEntity(a));
    }

    #[test]
    fn new_entities_know_nothing() {
        let mut r = EntityRegistry::new();
        let id = r.insert(Point::new(3, 3), 5, 6);
        let e = r.get(id).unwrap();
        assert_eq!(e.pos(), Point::new(3, 3));
        assert_eq!(e.sight_radius(), 6);
        assert_eq!(e.knows(Point::new(3, 3)), TileKnowledge::UNKNOWN);
    }
}
