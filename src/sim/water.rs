//! Water scheduler: watering actions, overdue detection and reminder cadence.
//!
//! Overdue thresholds are separate from the dryness thresholds used by the
//! growth tick. A tree can be overdue for a reminder long before it dries, or
//! dry before it is overdue, depending on configuration.

use crate::core::{Error, Result, Timestamp};
use super::config::{SimConfig, WaterConfig};
use super::store::TreeStore;
use super::tree::{Tree, TreeId};

/// Result of watering one tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Watered {
    pub id: TreeId,
    pub count_today: u32,
    /// True when the daily cap was already reached and the count did not move.
    pub capped: bool,
}

/// Outcome of an overdue scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverdueScan {
    pub ids: Vec<TreeId>,
    pub names: Vec<String>,
    /// Smallest positive time until a currently fine tree becomes overdue.
    pub next_due_in: Option<f64>,
}

impl OverdueScan {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Reminder text listing the overdue trees, or None when nothing is due.
    pub fn reminder_message(&self) -> Option<String> {
        match self.names.as_slice() {
            [] => None,
            [name] => Some(format!(
                "Your tree \"{name}\" requires watering to remain healthy. Please water it soon. \
                 Note: Clicking 'Water Now' will water all trees in your garden."
            )),
            names => Some(format!(
                "Your trees {} require watering to remain healthy. Please water them soon. \
                 Note: Clicking 'Water Now' will water all trees in your garden.",
                names.join(", ")
            )),
        }
    }
}

fn overdue_threshold(tree: &Tree, water: &WaterConfig) -> f64 {
    if tree.is_accelerated() {
        water.accelerated_overdue_secs
    } else {
        water.normal_overdue_secs
    }
}

/// Water a single tree.
///
/// Same calendar day as the last watering: the counter increments up to the
/// daily cap. New day: the counter restarts at 1. `last_watered` is always
/// refreshed.
pub fn water_tree(store: &mut TreeStore, id: TreeId, config: &SimConfig, now: Timestamp) -> Result<Watered> {
    let tree = store.get_mut(id).ok_or(Error::TreeNotFound(id))?;
    let cap = config.water.daily_cap;

    let mut capped = false;
    if tree.last_water_date.same_day(now, config.utc_offset_secs) {
        if tree.water_count_today < cap {
            tree.water_count_today += 1;
        } else {
            capped = true;
        }
    } else {
        tree.water_count_today = 1;
        tree.last_water_date = now;
    }
    tree.last_watered = now;

    log::info!("watered {} ({}/{} today)", tree.name, tree.water_count_today, cap);
    Ok(Watered { id, count_today: tree.water_count_today, capped })
}

/// Find every tree whose time since watering reached its overdue threshold.
pub fn scan_overdue(store: &TreeStore, water: &WaterConfig, now: Timestamp) -> OverdueScan {
    let mut scan = OverdueScan::default();
    for tree in store.iter() {
        let threshold = overdue_threshold(tree, water);
        let elapsed = now.saturating_elapsed(tree.last_watered);
        if elapsed >= threshold {
            scan.ids.push(tree.id());
            scan.names.push(tree.name.clone());
        } else {
            let remaining = threshold - elapsed;
            scan.next_due_in = Some(scan.next_due_in.map_or(remaining, |d: f64| d.min(remaining)));
        }
    }
    scan
}

/// Water every currently overdue tree. Returns the watered ids.
pub fn water_all_overdue(store: &mut TreeStore, config: &SimConfig, now: Timestamp) -> Vec<TreeId> {
    let scan = scan_overdue(store, &config.water, now);
    scan.ids
        .into_iter()
        .filter(|&id| water_tree(store, id, config, now).is_ok())
        .collect()
}

/// Delay until the next reminder scan.
pub fn next_reminder_delay(scan: &OverdueScan, reminder_period_secs: f64) -> f64 {
    match scan.next_due_in {
        Some(due) if due > 0.0 => reminder_period_secs.min(due),
        _ => reminder_period_secs,
    }
}
