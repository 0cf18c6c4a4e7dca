//! Entity synchronizer: keeps each tree's scene entity in line with its
//! simulated stage and health.
//!
//! Reconciliation is split in two halves that both run on the owner:
//! [`EntitySynchronizer::reconcile`] compares every tree against its cached
//! render state and issues model loads or scale animations, and
//! [`EntitySynchronizer::apply_completion`] installs a finished load. A
//! completion is only applied if it still answers the record's latest
//! request, under the current scene generation, for the model the tree
//! needs right now. Anything else is dropped and the next reconcile pass
//! asks again.

use std::collections::HashMap;

use crate::scene::{AnchorHandle, Easing, EntityHandle, SceneProvider};
use crate::sim::{RenderConfig, Tree, TreeId, TreeStore};
use crate::streaming::{LoadCompletion, ModelLoader};
use super::record::{EntityRecord, PendingSwap};

/// Counters from one reconcile pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub loads_requested: usize,
    pub scale_animations: usize,
}

/// What happened to a load completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    /// New entity attached and animating in.
    Swapped { id: TreeId, entity: EntityHandle },
    /// Load failed; the old entity stays and the load is retried.
    Failed { id: TreeId },
    /// Completion was stale and discarded.
    Discarded,
}

pub struct EntitySynchronizer {
    config: RenderConfig,
    records: HashMap<TreeId, EntityRecord>,
    generation: u64,
}

impl EntitySynchronizer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            records: HashMap::new(),
            generation: 0,
        }
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidate every in-flight load. Called on teardown.
    pub fn bump_generation(&mut self) {
        self.generation += 1;
        for record in self.records.values_mut() {
            record.pending = None;
        }
    }

    /// Register the record for a newly planted tree. A tree has exactly one
    /// record; a second call keeps the first.
    pub fn create_record(&mut self, id: TreeId, anchor: AnchorHandle) -> bool {
        if self.records.contains_key(&id) {
            return false;
        }
        self.records.insert(id, EntityRecord::new(anchor));
        true
    }

    pub fn record(&self, id: TreeId) -> Option<&EntityRecord> {
        self.records.get(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tree whose current model entity is `entity`.
    pub fn owner_of(&self, entity: EntityHandle) -> Option<TreeId> {
        self.records
            .iter()
            .find(|(_, r)| r.entity == Some(entity))
            .map(|(&id, _)| id)
    }

    /// Whether `ticket` is the latest load of some record.
    pub fn owns_ticket(&self, ticket: u64) -> bool {
        self.records
            .values()
            .any(|r| r.pending.as_ref().is_some_and(|p| p.ticket == ticket))
    }

    pub fn pending_loads(&self) -> usize {
        self.records.values().filter(|r| r.pending.is_some()).count()
    }

    /// Compare every tree against its record.
    pub fn reconcile(
        &mut self,
        store: &TreeStore,
        scene: &mut dyn SceneProvider,
        loader: &mut ModelLoader,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        for tree in store.iter() {
            self.reconcile_tree(tree, scene, loader, &mut report);
        }
        report
    }

    /// Reconcile a single tree, e.g. right after planting.
    pub fn reconcile_tree(
        &mut self,
        tree: &Tree,
        scene: &mut dyn SceneProvider,
        loader: &mut ModelLoader,
        report: &mut ReconcileReport,
    ) {
        let generation = self.generation;
        let epsilon = self.config.scale_epsilon;
        let duration = self.config.animation_duration_secs;
        let Some(record) = self.records.get_mut(&tree.id()) else {
            return;
        };

        let asset = tree.model_name();
        if !record.shows(&asset) {
            if record.is_loading(&asset) {
                return;
            }
            // a pending load for another model is superseded here
            match loader.request(&asset, generation) {
                Ok(ticket) => {
                    record.pending = Some(PendingSwap { ticket, asset });
                    report.loads_requested += 1;
                }
                Err(e) => log::warn!("{}: could not request {}: {}", tree.name, asset, e),
            }
            return;
        }

        // same model, maybe a newer stage; at most scale changes
        record.pending = None;
        record.cached_stage = Some(tree.stage);
        record.cached_health = Some(tree.health);
        let target = tree.target_scale();
        if (target - record.cached_scale).abs() > epsilon {
            if let Some(entity) = record.entity {
                scene.animate_scale(entity, target, duration, Easing::EaseInOut);
                report.scale_animations += 1;
            }
            record.cached_scale = target;
        }
    }

    /// Install a finished load if it is still wanted.
    pub fn apply_completion(
        &mut self,
        completion: LoadCompletion,
        store: &TreeStore,
        scene: &mut dyn SceneProvider,
    ) -> Applied {
        if completion.generation != self.generation {
            log::debug!("dropping {} from generation {}", completion.name, completion.generation);
            return Applied::Discarded;
        }
        let Some((&id, record)) = self
            .records
            .iter_mut()
            .find(|(_, r)| r.pending.as_ref().is_some_and(|p| p.ticket == completion.ticket))
        else {
            log::debug!("dropping superseded load of {}", completion.name);
            return Applied::Discarded;
        };
        record.pending = None;

        let Some(tree) = store.get(id) else {
            return Applied::Discarded;
        };
        if tree.model_name() != completion.name {
            // the tree moved on while loading; the next pass requests again
            log::debug!("{}: {} no longer needed", tree.name, completion.name);
            return Applied::Discarded;
        }

        let asset = match completion.result {
            Ok(asset) => asset,
            Err(e) => {
                log::warn!("{}: failed to load {}: {}", tree.name, completion.name, e);
                return Applied::Failed { id };
            }
        };

        let target = tree.target_scale();
        let start = match record.entity {
            Some(_) => target * self.config.swap_start_fraction,
            None => self.config.initial_scale,
        };
        let Some(entity) = scene.attach_model(record.anchor, &asset, glam::Vec3::ZERO, start) else {
            log::warn!("{}: anchor is gone, cannot attach {}", tree.name, asset.name);
            return Applied::Failed { id };
        };
        scene.animate_scale(
            entity,
            target,
            self.config.animation_duration_secs,
            Easing::EaseInOut,
        );
        if let Some(old) = record.entity.replace(entity) {
            scene.detach(old);
        }
        record.cached_asset = Some(asset.name);
        record.cached_stage = Some(tree.stage);
        record.cached_health = Some(tree.health);
        record.cached_scale = target;

        Applied::Swapped { id, entity }
    }
}
