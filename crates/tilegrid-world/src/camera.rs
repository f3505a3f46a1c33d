//! The camera: what part of the grid is shown, at which zoom, and through
//! whose eyes.

use tilegrid_anim::{Animatable, Property};
use tilegrid_core::{EntityId, Error, Range, Result};

/// Whose knowledge the view reflects.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Perspective {
    /// Everything is shown.
    #[default]
    Omniscient,
    /// Only what the entity has seen.
    Entity(EntityId),
}

/// View center in tile coordinates, zoom factor and perspective.
///
/// Animatable through [`Property::X`], [`Property::Y`] (center) and
/// [`Property::Scale`] (zoom).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Camera {
    x: f32,
    y: f32,
    zoom: f32,
    perspective: Perspective,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            perspective: Perspective::Omniscient,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn set_center(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom factor; it must be positive and finite.
    pub fn set_zoom(&mut self, zoom: f32) -> Result<()> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(Error::invalid(format!("zoom must be positive, got {zoom}")));
        }
        self.zoom = zoom;
        Ok(())
    }

    pub fn perspective(&self) -> Perspective {
        self.perspective
    }

    /// Entity liveness is checked by [`Grid::set_perspective`](crate::Grid::set_perspective).
    pub(crate) fn set_perspective(&mut self, perspective: Perspective) {
        self.perspective = perspective;
    }

    /// Tiles a viewport of `width × height` tiles (at zoom 1) covers around
    /// the center. Not clipped to any grid.
    pub fn view_range(&self, width: i32, height: i32) -> Range {
        let hw = width.max(0) as f32 / self.zoom / 2.0;
        let hh = height.max(0) as f32 / self.zoom / 2.0;
        Range::new(
            (self.x - hw).floor() as i32,
            (self.y - hh).floor() as i32,
            (self.x + hw).ceil() as i32,
            (self.y + hh).ceil() as i32,
        )
    }
}

impl Animatable for Camera {
    fn get(&self, property: Property) -> Option<f32> {
        match property {
            Property::X => Some(self.x),
            Property::Y => Some(self.y),
            Property::Scale => Some(self.zoom),
            _ => None,
        }
    }

    fn set(&mut self, property: Property, value: f32) {
        match property {
            Property::X => self.x = value,
            Property::Y => self.y = value,
            Property::Scale => {
                if self.set_zoom(value).is_err() {
                    log::warn!("ignoring animated zoom {value}");
                }
            }
            _ => {}
        }
    }

    fn accepts(&self, property: Property, value: f32) -> bool {
        property != Property::Scale || (value.is_finite() && value > 0.0)
    }
}
