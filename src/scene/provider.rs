//! Scene graph provider boundary.
//!
//! The garden never talks to a renderer directly. Everything it needs from
//! the live scene goes through [`SceneProvider`]: anchors that pin content to
//! world positions, model entities attached under anchors, eased scale
//! animation, and screen-space queries for tapping and picking.

use glam::{Mat4, Vec2, Vec3};

use crate::streaming::ModelAsset;

/// Placement reference tying entities to a world-space transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorHandle(pub u64);

/// A model instance attached under an anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

impl Easing {
    /// Map normalized time `t` in `[0, 1]` to normalized progress.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

pub trait SceneProvider: Send {
    /// Create an anchor at a world transform.
    fn add_anchor(&mut self, world: Mat4) -> AnchorHandle;

    fn anchor_transform(&self, anchor: AnchorHandle) -> Option<Mat4>;

    /// World position of an anchor.
    fn anchor_position(&self, anchor: AnchorHandle) -> Option<Vec3> {
        self.anchor_transform(anchor)
            .map(|m| m.to_scale_rotation_translation().2)
    }

    /// Attach a loaded model under `anchor` at a local offset and uniform
    /// scale. None when the anchor no longer exists.
    fn attach_model(
        &mut self,
        anchor: AnchorHandle,
        model: &ModelAsset,
        offset: Vec3,
        scale: f32,
    ) -> Option<EntityHandle>;

    /// Detach and discard an entity. Unknown handles are ignored.
    fn detach(&mut self, entity: EntityHandle);

    /// Start an eased animation of the entity's uniform scale, replacing any
    /// animation already running on it.
    fn animate_scale(&mut self, entity: EntityHandle, target: f32, duration: f32, easing: Easing);

    /// Current (possibly mid-animation) scale.
    fn entity_scale(&self, entity: EntityHandle) -> Option<f32>;

    fn entity_anchor(&self, entity: EntityHandle) -> Option<AnchorHandle>;

    /// Project a normalized screen point (`[0, 1]²`, origin top-left) onto
    /// the nearest detected surface.
    fn raycast(&self, screen: Vec2) -> Option<Mat4>;

    /// Nearest model entity under a normalized screen point.
    fn hit_entity(&self, screen: Vec2) -> Option<EntityHandle>;

    /// Register a detected horizontal surface for raycasts.
    fn register_surface(&mut self, center: Mat4, extent: Vec2);

    /// Advance running animations by `dt` seconds.
    fn advance(&mut self, dt: f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
            assert_eq!(easing.apply(-3.0), 0.0);
        }
    }

    #[test]
    fn test_ease_in_out_symmetric() {
        let e = Easing::EaseInOut;
        assert!((e.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((e.apply(0.25) + e.apply(0.75) - 1.0).abs() < 1e-6);
        assert!(e.apply(0.1) < Easing::Linear.apply(0.1));
    }
}
