//! Overlay layers: per-tile colors or sprite overrides composited above or
//! below entities.

use std::fmt;

use tilegrid_core::{Error, Point, Range, Result, Rgba};
use tilegrid_fov::{FOV, TileKnowledge};

use crate::tile::NO_SPRITE;

/// What a layer stores per tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayerKind {
    Color,
    Sprite,
}

impl LayerKind {
    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Color => "color",
            LayerKind::Sprite => "sprite",
        }
    }
}

/// A value written into a layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayerValue {
    Color(Rgba),
    /// Sprite override, [`NO_SPRITE`] for none.
    Sprite(i32),
}

impl LayerValue {
    pub fn kind(self) -> LayerKind {
        match self {
            LayerValue::Color(_) => LayerKind::Color,
            LayerValue::Sprite(_) => LayerKind::Sprite,
        }
    }
}

impl From<Rgba> for LayerValue {
    fn from(c: Rgba) -> Self {
        LayerValue::Color(c)
    }
}

impl From<i32> for LayerValue {
    fn from(s: i32) -> Self {
        LayerValue::Sprite(s)
    }
}

/// Identifies a layer within its grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerHandle(pub(crate) u32);

impl fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer {}", self.0)
    }
}

#[derive(Clone, Debug)]
enum Cells {
    Color(Vec<Rgba>),
    Sprite(Vec<i32>),
}

/// Values painted for the three knowledge states of a tile.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Shades {
    pub visible: LayerValue,
    pub discovered: LayerValue,
    pub unknown: LayerValue,
}

impl Shades {
    fn pick(&self, k: TileKnowledge) -> LayerValue {
        if k.visible {
            self.visible
        } else if k.discovered {
            self.discovered
        } else {
            self.unknown
        }
    }
}

/// A per-tile overlay. Negative z-indices draw below entities, zero and
/// above draw over them.
#[derive(Clone, Debug)]
pub struct Layer {
    handle: LayerHandle,
    z_index: i32,
    range: Range,
    cells: Cells,
    /// Tiles revealed by any FOV painted into this layer.
    discovered: Vec<bool>,
}

impl Layer {
    pub(crate) fn new(handle: LayerHandle, kind: LayerKind, z_index: i32, range: Range) -> Self {
        let n = range.len();
        let cells = match kind {
            LayerKind::Color => Cells::Color(vec![Rgba::TRANSPARENT; n]),
            LayerKind::Sprite => Cells::Sprite(vec![NO_SPRITE; n]),
        };
        Self {
            handle,
            z_index,
            range,
            cells,
            discovered: vec![false; n],
        }
    }

    pub fn handle(&self) -> LayerHandle {
        self.handle
    }

    pub fn kind(&self) -> LayerKind {
        match self.cells {
            Cells::Color(_) => LayerKind::Color,
            Cells::Sprite(_) => LayerKind::Sprite,
        }
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Whether the layer is drawn before entities.
    pub fn below_entities(&self) -> bool {
        self.z_index < 0
    }

    fn index(&self, x: i32, y: i32) -> Result<usize> {
        self.range.index_of(Point::new(x, y)).ok_or(Error::OutOfBounds {
            x,
            y,
            width: self.range.width(),
            height: self.range.height(),
        })
    }

    pub(crate) fn check_kind(&self, value: LayerValue) -> Result<()> {
        let expected = self.kind();
        if value.kind() != expected {
            return Err(Error::LayerKindMismatch {
                expected: expected.name(),
                found: value.kind().name(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_shades(&self, shades: &Shades) -> Result<()> {
        self.check_kind(shades.visible)?;
        self.check_kind(shades.discovered)?;
        self.check_kind(shades.unknown)
    }

    pub fn get(&self, x: i32, y: i32) -> Result<LayerValue> {
        let i = self.index(x, y)?;
        Ok(match &self.cells {
            Cells::Color(c) => LayerValue::Color(c[i]),
            Cells::Sprite(s) => LayerValue::Sprite(s[i]),
        })
    }

    pub fn set(&mut self, x: i32, y: i32, value: impl Into<LayerValue>) -> Result<()> {
        let value = value.into();
        let i = self.index(x, y)?;
        self.check_kind(value)?;
        self.put(i, value);
        Ok(())
    }

    pub fn fill(&mut self, value: impl Into<LayerValue>) -> Result<()> {
        let value = value.into();
        self.check_kind(value)?;
        match (&mut self.cells, value) {
            (Cells::Color(c), LayerValue::Color(v)) => c.fill(v),
            (Cells::Sprite(s), LayerValue::Sprite(v)) => s.fill(v),
            _ => {}
        }
        Ok(())
    }

    /// Whether a painted FOV ever revealed `p`.
    pub fn is_discovered(&self, p: Point) -> bool {
        self.range.index_of(p).is_some_and(|i| self.discovered[i])
    }

    /// Iterate over every tile value, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Point, LayerValue)> + '_ {
        (0..self.range.len()).map(move |i| {
            let v = match &self.cells {
                Cells::Color(c) => LayerValue::Color(c[i]),
                Cells::Sprite(s) => LayerValue::Sprite(s[i]),
            };
            (self.range.point_at(i), v)
        })
    }

    fn put(&mut self, i: usize, value: LayerValue) {
        match (&mut self.cells, value) {
            (Cells::Color(c), LayerValue::Color(v)) => c[i] = v,
            (Cells::Sprite(s), LayerValue::Sprite(v)) => s[i] = v,
            _ => {}
        }
    }

    /// Paint from a freshly computed FOV, accumulating the layer's own
    /// discovered set. `shades` must already match the layer kind.
    pub(crate) fn paint_fov(&mut self, fov: &FOV, shades: &Shades) {
        for &p in fov.visibles() {
            if let Some(i) = self.range.index_of(p) {
                self.discovered[i] = true;
            }
        }
        for i in 0..self.range.len() {
            let p = self.range.point_at(i);
            let k = TileKnowledge {
                visible: fov.visible(p),
                discovered: self.discovered[i],
            };
            self.put(i, shades.pick(k));
        }
    }

    /// Paint from an arbitrary knowledge source, such as an entity's
    /// visibility memory. `shades` must already match the layer kind.
    pub(crate) fn paint_knowledge(&mut self, knowledge: impl Fn(Point) -> TileKnowledge, shades: &Shades) {
        for i in 0..self.range.len() {
            let v = shades.pick(knowledge(self.range.point_at(i)));
            self.put(i, v);
        }
    }
}
