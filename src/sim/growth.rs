//! Growth simulator: advances every tree's health and growth bookkeeping on
//! each growth tick.
//!
//! Per tree, in order:
//! 1. reset the daily water counter on a new calendar day
//! 2. re-evaluate dryness (edge-triggered dry notification)
//! 3. skip growth entirely while dry
//! 4. update progress (accelerated or linear mapping)
//! 5. recompute the stage, re-deriving default names
//! 6. record the first time the tree is fully grown
//!
//! A tick never fails. Future-dated timestamps clamp elapsed time to zero.

use crate::core::Timestamp;
use super::acceleration::{accelerated_progress, GrowthTuning};
use super::config::SimConfig;
use super::store::TreeStore;
use super::tree::{Health, Stage, Tree, TreeId};

/// Observable outcome of a growth tick for one tree.
#[derive(Clone, Debug, PartialEq)]
pub enum GrowthEvent {
    /// Healthy → dry, first time since the tree was last healthy.
    Dried(TreeId),
    Recovered(TreeId),
    StageChanged { id: TreeId, from: Stage, to: Stage },
    Renamed { id: TreeId, from: String, to: String },
    FullyGrown(TreeId),
}

/// Non-accelerated progress: elapsed time since planting over the current
/// growth duration, clamped to `[0, 1]`.
pub fn linear_progress(tree: &Tree, tuning: &GrowthTuning, now: Timestamp) -> f64 {
    let elapsed = now.saturating_elapsed(tree.planted_at);
    (elapsed / tuning.total_growth_duration_secs()).min(1.0)
}

pub struct GrowthSimulator<'a> {
    config: &'a SimConfig,
    tuning: &'a GrowthTuning,
}

impl<'a> GrowthSimulator<'a> {
    pub fn new(config: &'a SimConfig, tuning: &'a GrowthTuning) -> Self {
        Self { config, tuning }
    }

    /// Advance every tree to `now`.
    pub fn tick(&self, store: &mut TreeStore, now: Timestamp) -> Vec<GrowthEvent> {
        let mut events = Vec::new();
        for id in store.ids() {
            let pending_name = match store.get_mut(id) {
                Some(tree) => self.advance_tree(tree, now, &mut events),
                None => None,
            };

            // Default names are only rewritten when the new one stays unique.
            if let Some(name) = pending_name {
                if !store.name_taken(&name, Some(id)) {
                    if let Some(tree) = store.get_mut(id) {
                        let from = std::mem::replace(&mut tree.name, name.clone());
                        events.push(GrowthEvent::Renamed { id, from, to: name });
                    }
                }
            }
        }
        events
    }

    /// Advance one tree. Returns a default name to apply when the stage
    /// changed and the tree still carries a default name.
    fn advance_tree(
        &self,
        tree: &mut Tree,
        now: Timestamp,
        events: &mut Vec<GrowthEvent>,
    ) -> Option<String> {
        let id = tree.id();
        let growth = &self.config.growth;

        if !tree.last_water_date.same_day(now, self.config.utc_offset_secs) {
            tree.water_count_today = 0;
            tree.last_water_date = now;
        }

        let threshold = if tree.is_accelerated() {
            growth.accelerated_dry_threshold_secs
        } else {
            growth.normal_dry_threshold_secs
        };
        let should_be_dry = now.saturating_elapsed(tree.last_watered) > threshold;
        match (tree.health, should_be_dry) {
            (Health::Healthy, true) => {
                tree.health = Health::Dry;
                if !tree.has_played_dry_sound {
                    tree.has_played_dry_sound = true;
                    events.push(GrowthEvent::Dried(id));
                }
                log::info!("{} dried out", tree.name);
            }
            (Health::Dry, false) => {
                tree.health = Health::Healthy;
                tree.has_played_dry_sound = false;
                events.push(GrowthEvent::Recovered(id));
                log::info!("{} recovered", tree.name);
            }
            _ => {}
        }

        if tree.is_dry() {
            return None;
        }

        let target = match &tree.acceleration {
            Some(accel) => accelerated_progress(accel, growth, now),
            None => linear_progress(tree, self.tuning, now),
        };
        // never regress, e.g. across a clock step backwards
        tree.growth_progress = tree.growth_progress.max(target).clamp(0.0, 1.0);

        let mut pending_name = None;
        let stage = Stage::from_progress(tree.growth_progress, growth);
        if stage != tree.stage {
            log::debug!("{} {:?} -> {:?}", tree.name, tree.stage, stage);
            events.push(GrowthEvent::StageChanged { id, from: tree.stage, to: stage });
            pending_name = tree.stage_name(stage).filter(|n| *n != tree.name);
            tree.stage = stage;
        }

        if tree.growth_progress >= 1.0 && tree.full_grown_at.is_none() {
            tree.full_grown_at = Some(now);
            events.push(GrowthEvent::FullyGrown(id));
        }

        pending_name
    }
}
