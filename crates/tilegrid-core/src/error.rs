//! Error taxonomy shared by every tilegrid crate.
//!
//! A failed operation never mutates state. Pathfinding queries that find no
//! route are not errors: they answer `None`.

use crate::EntityId;

/// Errors raised synchronously by grid, visibility, path and animation
/// operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A coordinate lies outside `[0, width) × [0, height)`.
    #[error("({x}, {y}) is out of bounds for a {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    /// A parameter was rejected at call time (zero radius, zero duration…).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The entity id does not name a live entity.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
    /// The animation target does not expose the requested property.
    #[error("target does not support property `{0}`")]
    UnsupportedProperty(&'static str),
    /// A value of the wrong kind was written to an overlay layer.
    #[error("layer holds {expected} values, got {found}")]
    LayerKindMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidConfiguration`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let e = Error::OutOfBounds {
            x: 10,
            y: -1,
            width: 10,
            height: 10,
        };
        assert_eq!(e.to_string(), "(10, -1) is out of bounds for a 10x10 grid");
        assert_eq!(
            Error::UnknownEntity(EntityId(7)).to_string(),
            "unknown entity #7"
        );
        assert_eq!(
            Error::invalid("radius must be positive").to_string(),
            "invalid configuration: radius must be positive"
        );
    }
}
