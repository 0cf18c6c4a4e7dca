//! Pick bounds for placed models

use crate::core::types::Vec3;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of `size` resting on `base`, its bottom-center point. Models sit
    /// on their anchor this way.
    pub fn standing_on(base: Vec3, size: Vec3) -> Self {
        let half = Vec3::new(size.x * 0.5, 0.0, size.z * 0.5);
        Self {
            min: base - half,
            max: base + half + Vec3::new(0.0, size.y, 0.0),
        }
    }
}
