//! Detected real-world surfaces

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

/// Semantic classification reported by the surface detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceClass {
    Floor,
    Table,
    Seat,
    Wall,
    Ceiling,
    Window,
    Door,
    Unknown,
}

impl SurfaceClass {
    /// Whether taps can land on this surface.
    pub fn is_horizontal(self) -> bool {
        !matches!(self, SurfaceClass::Wall | SurfaceClass::Window | SurfaceClass::Door)
    }
}

/// A surface as reported by the detector.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedSurface {
    pub id: SurfaceId,
    /// Center pose of the surface.
    pub transform: Mat4,
    /// Width (local x) and depth (local z).
    pub extent: Vec2,
    pub class: SurfaceClass,
}

impl DetectedSurface {
    pub fn center(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }
}
