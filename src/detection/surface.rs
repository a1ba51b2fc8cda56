use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Minimum `|normal.y|` of a floor. Surfaces within 60° of horizontal are
/// floors, steeper ones walls.
pub const FLOOR_NORMAL_THRESHOLD: f32 = 0.5;

/// Surface category derived from the normal's verticality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceType {
    Floor,
    Wall,
}

impl SurfaceType {
    /// Classifies a normal of any length by the vertical share of its
    /// direction: `|n.y| / |n| >= 0.5` is a floor.
    #[must_use]
    pub fn classify(normal: Vec3) -> Self {
        if normal.y.abs() >= FLOOR_NORMAL_THRESHOLD * normal.length() {
            Self::Floor
        } else {
            Self::Wall
        }
    }

    #[must_use]
    pub fn is_vertical(self) -> bool {
        self == Self::Wall
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Floor => f.write_str("floor"),
            Self::Wall => f.write_str("wall"),
        }
    }
}

/// Which surfaces the user is currently placing on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlacementMode {
    #[default]
    Floor,
    Wall,
}

impl PlacementMode {
    #[must_use]
    pub fn accepts(self, surface: SurfaceType) -> bool {
        matches!(
            (self, surface),
            (Self::Floor, SurfaceType::Floor) | (Self::Wall, SurfaceType::Wall)
        )
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Floor => Self::Wall,
            Self::Wall => Self::Floor,
        }
    }

    #[must_use]
    pub fn surface_type(self) -> SurfaceType {
        match self {
            Self::Floor => SurfaceType::Floor,
            Self::Wall => SurfaceType::Wall,
        }
    }
}
