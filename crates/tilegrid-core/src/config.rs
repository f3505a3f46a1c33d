//! Grid configuration: movement model, default FOV algorithm and defaults
//! applied to newly created entities.

use crate::error::{Error, Result};

/// How entities move between tiles. Determines pathfinding neighbours, step
/// costs and the A* heuristic.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Movement {
    /// 4 neighbours, unit cost, Manhattan heuristic.
    #[default]
    Cardinal,
    /// 8 neighbours, unit cost for every step, Chebyshev heuristic.
    Chebyshev,
    /// 8 neighbours, diagonal steps cost √2, octile heuristic.
    Octile,
}

impl Movement {
    /// Whether diagonal steps are allowed.
    #[inline]
    pub fn diagonals(self) -> bool {
        !matches!(self, Movement::Cardinal)
    }

    /// Cost of a single step by `(dx, dy)`, each in `-1..=1`.
    #[inline]
    pub fn step_cost(self, dx: i32, dy: i32) -> f64 {
        match self {
            Movement::Octile if dx != 0 && dy != 0 => std::f64::consts::SQRT_2,
            _ => 1.0,
        }
    }

    /// Admissible distance estimate for a displacement of `(dx, dy)`.
    #[inline]
    pub fn estimate(self, dx: i32, dy: i32) -> f64 {
        let dx = dx.unsigned_abs() as f64;
        let dy = dy.unsigned_abs() as f64;
        match self {
            Movement::Cardinal => dx + dy,
            Movement::Chebyshev => dx.max(dy),
            Movement::Octile => {
                let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
                hi + (std::f64::consts::SQRT_2 - 1.0) * lo
            }
        }
    }
}

/// Field of view algorithm.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FovAlgorithm {
    /// One Bresenham line per tile in radius. Binary per-tile cutoff.
    Basic,
    /// Recursive shadowcasting over eight octants.
    #[default]
    Shadow,
}

/// Configuration for creating a grid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig {
    pub movement: Movement,
    /// Algorithm used for per-entity visibility updates.
    pub fov_algorithm: FovAlgorithm,
    /// Sight radius given to new entities.
    pub default_sight_radius: i32,
    /// Base sprite given to every tile of a new grid.
    pub default_sprite: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            movement: Movement::Cardinal,
            fov_algorithm: FovAlgorithm::Shadow,
            default_sight_radius: 8,
            default_sprite: 0,
        }
    }
}

impl GridConfig {
    pub fn with_movement(mut self, movement: Movement) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_fov_algorithm(mut self, algorithm: FovAlgorithm) -> Self {
        self.fov_algorithm = algorithm;
        self
    }

    pub fn with_sight_radius(mut self, radius: i32) -> Self {
        self.default_sight_radius = radius;
        self
    }

    pub fn with_default_sprite(mut self, sprite: i32) -> Self {
        self.default_sprite = sprite;
        self
    }

    /// Check the configuration before a grid is built from it.
    pub fn validate(&self) -> Result<()> {
        if self.default_sight_radius <= 0 {
            return Err(Error::invalid(format!(
                "default sight radius must be positive, got {}",
                self.default_sight_radius
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = GridConfig::default();
        assert_eq!(c.movement, Movement::Cardinal);
        assert_eq!(c.fov_algorithm, FovAlgorithm::Shadow);
        assert!(c.validate().is_ok());
        assert!(c.with_sight_radius(0).validate().is_err());
    }

    #[test]
    fn octile_estimate_matches_diagonal_cost() {
        let m = Movement::Octile;
        let diag = m.step_cost(1, 1);
        assert!((m.estimate(3, 3) - 3.0 * diag).abs() < 1e-9);
        assert_eq!(m.estimate(4, 0), 4.0);
        assert_eq!(Movement::Cardinal.estimate(-2, 3), 5.0);
        assert_eq!(Movement::Chebyshev.estimate(-2, 3), 3.0);
    }
}
