//! Impact statistics: aggregates derived from the tree store, and a bounded
//! history of periodic samples.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::Timestamp;
use super::config::SimConfig;
use super::store::TreeStore;

/// Snapshot of garden-wide metrics at one instant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub tree_count: usize,
    /// Σ growth_progress × CO₂ per full tree.
    pub co2_kg: f64,
    pub accelerated_count: usize,
    pub dry_count: usize,
    /// Highest same-day water count over all trees.
    pub max_water_count_today: u32,
    /// Waterings counted today across every tree.
    pub water_total_today: u32,
    /// Trees planted within the recent planting window.
    pub recently_planted: usize,
}

impl Aggregates {
    pub fn compute(store: &TreeStore, config: &SimConfig, now: Timestamp) -> Self {
        let mut agg = Aggregates {
            tree_count: store.len(),
            ..Default::default()
        };
        let window = config.impact.recent_planting_window_secs;

        for tree in store.iter() {
            agg.co2_kg += tree.growth_progress * config.impact.co2_per_full_tree_kg;
            if tree.is_accelerated() {
                agg.accelerated_count += 1;
            }
            if tree.is_dry() {
                agg.dry_count += 1;
            }
            // counters from a previous day are stale until the next growth tick
            if tree.last_water_date.same_day(now, config.utc_offset_secs) {
                agg.max_water_count_today = agg.max_water_count_today.max(tree.water_count_today);
                agg.water_total_today += tree.water_count_today;
            }
            if tree.planted_at <= now && now.saturating_elapsed(tree.planted_at) < window {
                agg.recently_planted += 1;
            }
        }
        agg
    }

    /// CO₂ offset as reported to the score sink (hundredths of a kg).
    pub fn co2_score(&self) -> i64 {
        (self.co2_kg * 100.0) as i64
    }
}

/// One periodic impact sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpactSample {
    pub at: Timestamp,
    pub co2_kg: f64,
    pub tree_count: usize,
    pub water_total: u32,
}

/// Fixed-capacity history, oldest sample evicted first.
#[derive(Clone, Debug)]
pub struct ImpactHistory {
    samples: VecDeque<ImpactSample>,
    cap: usize,
}

impl ImpactHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(cap.min(1024)),
            cap: cap.max(1),
        }
    }

    pub fn record(&mut self, at: Timestamp, agg: &Aggregates) {
        if self.samples.len() == self.cap {
            self.samples.pop_front();
        }
        self.samples.push_back(ImpactSample {
            at,
            co2_kg: agg.co2_kg,
            tree_count: agg.tree_count,
            water_total: agg.water_total_today,
        });
    }

    pub fn latest(&self) -> Option<&ImpactSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImpactSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
