//! Sparse per-observer visibility memory.
//!
//! Only tiles an observer has ever seen are stored, so memory grows with
//! what was explored rather than with the map size.

use std::collections::HashMap;

use tilegrid_core::Point;

/// What an observer knows about one tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileKnowledge {
    /// In the observer's most recent field of view.
    pub visible: bool,
    /// Seen at least once.
    pub discovered: bool,
}

impl TileKnowledge {
    pub const UNKNOWN: Self = Self {
        visible: false,
        discovered: false,
    };
}

/// Sparse map from tile to [`TileKnowledge`].
#[derive(Clone, Debug, Default)]
pub struct VisibilityMemory {
    tiles: HashMap<Point, TileKnowledge>,
    /// Tiles currently flagged visible, so a merge only revisits them.
    current: Vec<Point>,
}

impl VisibilityMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a fresh field of view.
    ///
    /// Tiles in `visible` become visible and discovered. Tiles visible
    /// before but absent now lose `visible` and keep `discovered`.
    pub fn merge(&mut self, visible: &[Point]) {
        for p in self.current.drain(..) {
            if let Some(k) = self.tiles.get_mut(&p) {
                k.visible = false;
            }
        }
        for &p in visible {
            self.tiles.insert(
                p,
                TileKnowledge {
                    visible: true,
                    discovered: true,
                },
            );
        }
        self.current.extend_from_slice(visible);
    }

    /// Knowledge about `p`; never-seen tiles are [`TileKnowledge::UNKNOWN`].
    pub fn get(&self, p: Point) -> TileKnowledge {
        self.tiles.get(&p).copied().unwrap_or_default()
    }

    /// Number of discovered tiles.
    pub fn discovered_len(&self) -> usize {
        self.tiles.len()
    }

    /// Tiles currently visible.
    pub fn visible(&self) -> &[Point] {
        &self.current
    }

    /// Iterate over every discovered tile.
    pub fn iter(&self) -> impl Iterator<Item = (Point, TileKnowledge)> + '_ {
        self.tiles.iter().map(|(&p, &k)| (p, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_tiles_are_unknown() {
        let m = VisibilityMemory::new();
        assert_eq!(m.get(Point::new(1, 1)), TileKnowledge::UNKNOWN);
        assert_eq!(m.discovered_len(), 0);
    }

    #[test]
    fn merge_keeps_discovered_and_drops_visible() {
        let mut m = VisibilityMemory::new();
        let a = Point::new(0, 0);
        let b = Point::new(1, 0);
        let c = Point::new(2, 0);
        m.merge(&[a, b]);
        assert_eq!(
            m.get(a),
            TileKnowledge {
                visible: true,
                discovered: true
            }
        );
        m.merge(&[b, c]);
        assert_eq!(
            m.get(a),
            TileKnowledge {
                visible: false,
                discovered: true
            }
        );
        assert!(m.get(b).visible);
        assert!(m.get(c).visible);
        assert_eq!(m.discovered_len(), 3);
        assert_eq!(m.visible(), &[b, c]);
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn knowledge_round_trip() {
        let k = TileKnowledge {
            visible: false,
            discovered: true,
        };
        let json = serde_json::to_string(&k).unwrap();
        assert_eq!(serde_json::from_str::<TileKnowledge>(&json).unwrap(), k);
    }
}
