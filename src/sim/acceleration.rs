//! Acceleration controller: the fast-forward progress mapping for one tree,
//! and the process-wide growth booster.

use crate::core::Timestamp;
use super::config::GrowthConfig;
use super::growth::linear_progress;
use super::tree::{Acceleration, Tree};

/// Shared growth-duration parameter owned by the garden.
///
/// The booster halves the default duration. Because linear progress is
/// always recomputed from the planting time, the change applies
/// retroactively to every non-accelerated tree from the next tick on.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowthTuning {
    total_growth_duration_secs: f64,
    default_growth_duration_secs: f64,
}

impl GrowthTuning {
    pub fn from_config(growth: &GrowthConfig) -> Self {
        Self {
            total_growth_duration_secs: growth.default_growth_duration_secs,
            default_growth_duration_secs: growth.default_growth_duration_secs,
        }
    }

    /// Current duration used by the linear progress formula.
    #[inline]
    pub fn total_growth_duration_secs(&self) -> f64 {
        self.total_growth_duration_secs
    }

    pub fn is_boosted(&self) -> bool {
        self.total_growth_duration_secs < self.default_growth_duration_secs
    }

    /// Set the duration to half the default. Repeated boosts do not stack.
    pub fn apply_booster(&mut self) {
        self.total_growth_duration_secs = self.default_growth_duration_secs / 2.0;
    }
}

/// Progress of an accelerated tree at `now`.
///
/// `base + (1 - base) * min(elapsed / full_duration, 1)`, which equals
/// `base` at the moment acceleration started and reaches 1.0 after
/// `full_duration` seconds.
pub fn accelerated_progress(accel: &Acceleration, growth: &GrowthConfig, now: Timestamp) -> f64 {
    let elapsed = now.saturating_elapsed(accel.start);
    let fraction = (elapsed / growth.accel_full_duration_secs).min(1.0);
    (accel.base_progress + (1.0 - accel.base_progress) * fraction).min(1.0)
}

/// Put a tree into accelerated mode.
///
/// Returns false (and changes nothing) when the tree is already
/// accelerated or dry.
pub fn accelerate(tree: &mut Tree, tuning: &GrowthTuning, now: Timestamp) -> bool {
    if tree.is_accelerated() || tree.is_dry() {
        return false;
    }
    tree.acceleration = Some(Acceleration {
        start: now,
        base_progress: linear_progress(tree, tuning, now),
    });
    true
}
