//! Rendering-side state kept for each tree.

use crate::scene::{AnchorHandle, EntityHandle};
use crate::sim::{Health, Stage};

/// A model load issued for a record and not yet applied.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSwap {
    pub ticket: u64,
    pub asset: String,
}

/// Anchor, current model entity and the render state it was built for.
///
/// Records live as long as their tree. Only the entity is ever replaced.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityRecord {
    pub anchor: AnchorHandle,
    /// None until the first model load lands.
    pub entity: Option<EntityHandle>,
    pub cached_stage: Option<Stage>,
    pub cached_health: Option<Health>,
    pub cached_asset: Option<String>,
    /// Last scale target handed to the scene.
    pub cached_scale: f32,
    pub pending: Option<PendingSwap>,
}

impl EntityRecord {
    pub fn new(anchor: AnchorHandle) -> Self {
        Self {
            anchor,
            entity: None,
            cached_stage: None,
            cached_health: None,
            cached_asset: None,
            cached_scale: 0.0,
            pending: None,
        }
    }

    pub fn shows(&self, asset: &str) -> bool {
        self.cached_asset.as_deref() == Some(asset)
    }

    pub fn is_loading(&self, asset: &str) -> bool {
        self.pending.as_ref().is_some_and(|p| p.asset == asset)
    }
}
