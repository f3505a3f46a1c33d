//! The [`Grid`] aggregate: tiles, entities, overlay layers, camera and the
//! current FOV and Dijkstra snapshots.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeSet;
use std::rc::Rc;

use tilegrid_core::{EntityId, Error, FovAlgorithm, GridConfig, Point, Range, Result};
use tilegrid_fov::{FOV, TileKnowledge};
use tilegrid_paths::{MovementPather, PathRange};

use crate::camera::{Camera, Perspective};
use crate::entity::{Entity, EntityRegistry};
use crate::layer::{Layer, LayerHandle, LayerKind, LayerValue, Shades};
use crate::store::{GridStore, TilesMut};
use crate::tile::Tile;

/// A fixed-size tile grid hosting entities.
///
/// A grid keeps one FOV snapshot and one Dijkstra snapshot; computing a new
/// one replaces the old. Operations that fail leave the grid untouched.
pub struct Grid {
    config: GridConfig,
    store: GridStore,
    entities: EntityRegistry,
    fov: FOV,
    /// Per-entity computations, kept apart from the snapshot.
    scratch_fov: FOV,
    paths: PathRange,
    layers: Vec<Layer>,
    next_layer: u32,
    camera: Rc<RefCell<Camera>>,
}

impl Grid {
    /// A `width × height` all-floor grid with the default configuration.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        Self::with_config(width, height, GridConfig::default())
    }

    pub fn with_config(width: i32, height: i32, config: GridConfig) -> Result<Self> {
        config.validate()?;
        let store = GridStore::new(width, height, config.default_sprite)?;
        let range = store.range();
        let camera = Camera::new();
        let camera = Rc::new(RefCell::new(camera));
        camera
            .borrow_mut()
            .set_center(width as f32 / 2.0, height as f32 / 2.0);
        log::debug!("new {width}x{height} grid, {:?}", config.movement);
        Ok(Self {
            config,
            store,
            entities: EntityRegistry::new(),
            fov: FOV::new(range),
            scratch_fov: FOV::new(range),
            paths: PathRange::new(range),
            layers: Vec::new(),
            next_layer: 0,
            camera,
        })
    }

    pub fn width(&self) -> i32 {
        self.store.width()
    }

    pub fn height(&self) -> i32 {
        self.store.height()
    }

    pub fn range(&self) -> Range {
        self.store.range()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Tiles
    // ------------------------------------------------------------------

    pub fn get_tile(&self, x: i32, y: i32) -> Result<&Tile> {
        self.store.get_tile(x, y)
    }

    /// Tile storage, read-only.
    pub fn tiles(&self) -> &GridStore {
        &self.store
    }

    /// Tile flag and sprite setters.
    ///
    /// Changing walkability does not refresh the Dijkstra snapshot; call
    /// [`compute_dijkstra`](Grid::compute_dijkstra) again.
    pub fn tiles_mut(&mut self) -> TilesMut<'_> {
        TilesMut::new(&mut self.store)
    }

    pub fn set_walkable(&mut self, x: i32, y: i32, walkable: bool) -> Result<()> {
        self.store.set_walkable(x, y, walkable)
    }

    pub fn set_transparent(&mut self, x: i32, y: i32, transparent: bool) -> Result<()> {
        self.store.set_transparent(x, y, transparent)
    }

    pub fn set_floor(&mut self, x: i32, y: i32) -> Result<()> {
        self.store.set_floor(x, y)
    }

    pub fn set_wall(&mut self, x: i32, y: i32) -> Result<()> {
        self.store.set_wall(x, y)
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Place a new entity on `(x, y)`. Occupied tiles are accepted.
    pub fn create_entity(&mut self, x: i32, y: i32, sprite: i32) -> Result<EntityId> {
        let p = Point::new(x, y);
        self.store.check(p)?;
        let id = self
            .entities
            .insert(p, sprite, self.config.default_sight_radius);
        self.store.add_occupant(p, id)?;
        log::trace!("entity {id} created at {p}");
        Ok(id)
    }

    /// Remove an entity from the grid. If the camera looked through it, the
    /// camera falls back to [`Perspective::Omniscient`].
    pub fn destroy_entity(&mut self, id: EntityId) -> Result<()> {
        let mut camera = camera_mut(&self.camera)?;
        let e = self.entities.remove(id)?;
        self.store.remove_occupant(e.pos, id);
        if camera.perspective() == Perspective::Entity(id) {
            camera.set_perspective(Perspective::Omniscient);
        }
        log::trace!("entity {id} destroyed at {}", e.pos);
        Ok(())
    }

    /// Move an entity to `(x, y)`. On error nothing changes.
    pub fn move_entity(&mut self, id: EntityId, x: i32, y: i32) -> Result<()> {
        let to = Point::new(x, y);
        self.store.check(to)?;
        let e = self.entities.get_mut(id)?;
        let from = e.pos;
        if from == to {
            return Ok(());
        }
        self.store.remove_occupant(from, id);
        self.store.add_occupant(to, id)?;
        e.pos = to;
        log::trace!("entity {id} moved {from} -> {to}");
        Ok(())
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(id)
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    /// Live entity ids, ascending.
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.ids()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn set_entity_sprite(&mut self, id: EntityId, sprite: i32) -> Result<()> {
        self.entities.get_mut(id)?.sprite = sprite;
        Ok(())
    }

    /// Set the radius used by [`update_entity_visibility`](Grid::update_entity_visibility).
    pub fn set_sight_radius(&mut self, id: EntityId, radius: i32) -> Result<()> {
        if radius <= 0 {
            return Err(Error::invalid(format!(
                "sight radius must be positive, got {radius}"
            )));
        }
        self.entities.get_mut(id)?.sight_radius = radius;
        Ok(())
    }

    pub fn entities_at(&self, x: i32, y: i32) -> Result<&BTreeSet<EntityId>> {
        Ok(self.store.get_tile(x, y)?.occupants())
    }

    /// Entities within Chebyshev distance `radius` of `(cx, cy)`, in
    /// ascending id order.
    pub fn entities_in_radius(&self, cx: i32, cy: i32, radius: i32) -> Result<Vec<EntityId>> {
        let c = Point::new(cx, cy);
        self.store.check(c)?;
        if radius < 0 {
            return Err(Error::invalid(format!(
                "radius must not be negative, got {radius}"
            )));
        }
        Ok(self
            .entities
            .iter()
            .filter(|e| e.pos.chebyshev(c) <= radius)
            .map(Entity::id)
            .collect())
    }

    // ------------------------------------------------------------------
    // Field of view
    // ------------------------------------------------------------------

    fn check_radius(radius: i32) -> Result<()> {
        if radius <= 0 {
            return Err(Error::invalid(format!(
                "FOV radius must be positive, got {radius}"
            )));
        }
        Ok(())
    }

    /// Compute the tiles visible from `(x, y)` and make them the grid's
    /// FOV snapshot.
    pub fn compute_fov(
        &mut self,
        x: i32,
        y: i32,
        radius: i32,
        algorithm: FovAlgorithm,
    ) -> Result<&[Point]> {
        let src = Point::new(x, y);
        self.store.check(src)?;
        Self::check_radius(radius)?;
        let store = &self.store;
        let visible = self
            .fov
            .compute(src, radius, algorithm, |p| store.is_transparent(p));
        log::debug!(
            "{algorithm:?} FOV from {src} radius {radius}: {} tiles",
            visible.len()
        );
        Ok(visible)
    }

    /// Whether `(x, y)` is in the FOV snapshot. `false` before any
    /// computation.
    pub fn is_visible(&self, x: i32, y: i32) -> Result<bool> {
        let p = Point::new(x, y);
        self.store.check(p)?;
        Ok(self.fov.visible(p))
    }

    /// Tiles of the FOV snapshot.
    pub fn visible_tiles(&self) -> impl Iterator<Item = Point> + '_ {
        self.fov.iter_visible()
    }

    /// Recompute what an entity sees from where it stands and merge it into
    /// its memory. The grid's FOV snapshot is left alone. Returns the number
    /// of tiles currently visible to the entity.
    pub fn update_entity_visibility(&mut self, id: EntityId) -> Result<usize> {
        let e = self.entities.get_mut(id)?;
        let store = &self.store;
        let visible = self.scratch_fov.compute(
            e.pos,
            e.sight_radius,
            self.config.fov_algorithm,
            |p| store.is_transparent(p),
        );
        e.memory.merge(visible);
        log::trace!(
            "entity {id} sees {} tiles, knows {}",
            visible.len(),
            e.memory.discovered_len()
        );
        Ok(visible.len())
    }

    pub fn entity_visibility(&self, id: EntityId, x: i32, y: i32) -> Result<TileKnowledge> {
        let p = Point::new(x, y);
        self.store.check(p)?;
        Ok(self.entities.get(id)?.knows(p))
    }

    // ------------------------------------------------------------------
    // Pathfinding
    // ------------------------------------------------------------------

    /// Shortest path from `(sx, sy)` to `(tx, ty)` under the configured
    /// movement model. The steps exclude the start and end on the target.
    /// `Ok(None)` when the target cannot be reached, which includes an
    /// unwalkable target even when it is the start.
    pub fn find_path(&mut self, sx: i32, sy: i32, tx: i32, ty: i32) -> Result<Option<Vec<Point>>> {
        let from = Point::new(sx, sy);
        let to = Point::new(tx, ty);
        self.store.check(from)?;
        self.store.check(to)?;
        if !self.store.is_walkable(to) {
            return Ok(None);
        }
        let store = &self.store;
        let pather = MovementPather::new(self.config.movement, |p: Point| store.is_walkable(p));
        Ok(self.paths.astar_path(&pather, from, to))
    }

    /// Flood a distance field from `(x, y)` over walkable tiles, replacing
    /// the Dijkstra snapshot. Returns the number of tiles reached.
    pub fn compute_dijkstra(&mut self, x: i32, y: i32) -> Result<usize> {
        self.compute_dijkstra_multi(&[Point::new(x, y)], None)
    }

    /// Like [`compute_dijkstra`](Grid::compute_dijkstra) with several
    /// sources at cost 0, optionally stopping at `max_cost`.
    ///
    /// Unwalkable sources are ignored, so every reached tile can walk back
    /// to a source. A field with no walkable source reaches nothing.
    pub fn compute_dijkstra_multi(&mut self, sources: &[Point], max_cost: Option<f64>) -> Result<usize> {
        if sources.is_empty() {
            return Err(Error::invalid("a distance field needs at least one source"));
        }
        for &s in sources {
            self.store.check(s)?;
        }
        let max_cost = match max_cost {
            Some(c) if c.is_nan() || c < 0.0 => {
                return Err(Error::invalid(format!(
                    "max cost must not be negative, got {c}"
                )));
            }
            Some(c) => c,
            None => f64::INFINITY,
        };
        let store = &self.store;
        let seeds: Vec<Point> = sources
            .iter()
            .copied()
            .filter(|&s| store.is_walkable(s))
            .collect();
        if seeds.len() < sources.len() {
            log::debug!("ignoring {} unwalkable source(s)", sources.len() - seeds.len());
        }
        let pather = MovementPather::new(self.config.movement, |p: Point| store.is_walkable(p));
        Ok(self.paths.dijkstra_map(&pather, &seeds, max_cost).len())
    }

    /// Distance from `(x, y)` to the nearest source of the Dijkstra
    /// snapshot, `None` if unreached or nothing was computed.
    pub fn get_distance(&self, x: i32, y: i32) -> Result<Option<f64>> {
        let p = Point::new(x, y);
        self.store.check(p)?;
        Ok(self.paths.dijkstra_at(p))
    }

    /// Walk the Dijkstra snapshot downhill from `(x, y)`. The steps exclude
    /// `(x, y)` and end on a source. `None` if `(x, y)` was not reached.
    pub fn get_path_from(&mut self, x: i32, y: i32) -> Result<Option<Vec<Point>>> {
        let p = Point::new(x, y);
        self.store.check(p)?;
        let store = &self.store;
        let pather = MovementPather::new(self.config.movement, |q: Point| store.is_walkable(q));
        Ok(self.paths.dijkstra_path_from(&pather, p))
    }

    // ------------------------------------------------------------------
    // Layers
    // ------------------------------------------------------------------

    /// Add an empty layer. Layers are kept sorted by z-index; equal
    /// indices keep insertion order.
    pub fn add_layer(&mut self, kind: LayerKind, z_index: i32) -> LayerHandle {
        let handle = LayerHandle(self.next_layer);
        self.next_layer += 1;
        let at = self.layers.partition_point(|l| l.z_index() <= z_index);
        self.layers
            .insert(at, Layer::new(handle, kind, z_index, self.store.range()));
        handle
    }

    pub fn layer(&self, handle: LayerHandle) -> Option<&Layer> {
        self.layers.iter().find(|l| l.handle() == handle)
    }

    pub fn layer_mut(&mut self, handle: LayerHandle) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.handle() == handle)
    }

    fn layer_index(&self, handle: LayerHandle) -> Result<usize> {
        self.layers
            .iter()
            .position(|l| l.handle() == handle)
            .ok_or_else(|| Error::invalid(format!("unknown {handle}")))
    }

    pub fn remove_layer(&mut self, handle: LayerHandle) -> Option<Layer> {
        let i = self.layer_index(handle).ok()?;
        Some(self.layers.remove(i))
    }

    /// Layers in drawing order, lowest z-index first.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.iter()
    }

    /// Compute an FOV (which becomes the grid snapshot) and paint it into
    /// a layer: visible tiles get `visible`, tiles this layer has revealed
    /// before get `discovered`, the rest `unknown`.
    #[allow(clippy::too_many_arguments)]
    pub fn paint_fov(
        &mut self,
        handle: LayerHandle,
        source: Point,
        radius: i32,
        algorithm: FovAlgorithm,
        visible: impl Into<LayerValue>,
        discovered: impl Into<LayerValue>,
        unknown: impl Into<LayerValue>,
    ) -> Result<()> {
        let shades = Shades {
            visible: visible.into(),
            discovered: discovered.into(),
            unknown: unknown.into(),
        };
        let li = self.layer_index(handle)?;
        self.layers[li].check_shades(&shades)?;
        self.compute_fov(source.x, source.y, radius, algorithm)?;
        self.layers[li].paint_fov(&self.fov, &shades);
        Ok(())
    }

    /// Paint an entity's visibility memory into a layer.
    pub fn paint_entity_perspective(
        &mut self,
        handle: LayerHandle,
        id: EntityId,
        visible: impl Into<LayerValue>,
        discovered: impl Into<LayerValue>,
        unknown: impl Into<LayerValue>,
    ) -> Result<()> {
        let shades = Shades {
            visible: visible.into(),
            discovered: discovered.into(),
            unknown: unknown.into(),
        };
        let li = self.layer_index(handle)?;
        self.layers[li].check_shades(&shades)?;
        let e = self.entities.get(id)?;
        self.layers[li].paint_knowledge(|p| e.knows(p), &shades);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Camera
    // ------------------------------------------------------------------

    /// The shared camera, for reading and for animating with a
    /// [`Scheduler`](tilegrid_anim::Scheduler).
    pub fn camera(&self) -> &Rc<RefCell<Camera>> {
        &self.camera
    }

    pub fn camera_state(&self) -> Ref<'_, Camera> {
        self.camera.borrow()
    }

    /// Camera setters fail with [`Error::InvalidConfiguration`] while a
    /// borrow obtained through [`camera`](Grid::camera) is alive.
    pub fn set_center(&mut self, x: f32, y: f32) -> Result<()> {
        camera_mut(&self.camera)?.set_center(x, y);
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom: f32) -> Result<()> {
        camera_mut(&self.camera)?.set_zoom(zoom)
    }

    /// Look through an entity's eyes, or see everything.
    pub fn set_perspective(&mut self, perspective: Perspective) -> Result<()> {
        if let Perspective::Entity(id) = perspective {
            self.entities.get(id)?;
        }
        camera_mut(&self.camera)?.set_perspective(perspective);
        Ok(())
    }

    pub fn perspective(&self) -> Perspective {
        self.camera.borrow().perspective()
    }

    /// What the current perspective knows about `(x, y)`.
    pub fn perspective_knowledge(&self, x: i32, y: i32) -> Result<TileKnowledge> {
        let p = Point::new(x, y);
        self.store.check(p)?;
        match self.perspective() {
            Perspective::Omniscient => Ok(TileKnowledge {
                visible: true,
                discovered: true,
            }),
            Perspective::Entity(id) => Ok(self.entities.get(id)?.knows(p)),
        }
    }

    /// Grid tiles the camera shows in a viewport of `width × height` tiles.
    pub fn view_range(&self, width: i32, height: i32) -> Range {
        self.camera
            .borrow()
            .view_range(width, height)
            .intersect(self.store.range())
    }
}

fn camera_mut(camera: &RefCell<Camera>) -> Result<RefMut<'_, Camera>> {
    camera
        .try_borrow_mut()
        .map_err(|_| Error::invalid("camera is borrowed elsewhere"))
}
