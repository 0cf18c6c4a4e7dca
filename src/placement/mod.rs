//! Planting, picking and surface decoration

pub mod decoration;
pub mod engine;
pub mod surface;

pub use decoration::{scatter, DecorationKind, DecorationSpawn};
pub use engine::PlacementEngine;
pub use surface::{DetectedSurface, SurfaceClass, SurfaceId};
