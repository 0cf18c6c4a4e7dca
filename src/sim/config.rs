//! Simulation configuration.
//!
//! Every tunable constant of the garden lives here, grouped by the component
//! that reads it. The whole struct deserializes from JSON with per-field
//! defaults, so an override file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Growth, stage and dryness parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Seconds for a non-accelerated tree to go from 0 to full growth.
    pub default_growth_duration_secs: f64,
    /// Seconds for an accelerated tree to close the gap to full growth.
    pub accel_full_duration_secs: f64,
    /// Progress below this is a sapling.
    pub sapling_max: f64,
    /// Progress below this (and at least `sapling_max`) is medium.
    pub medium_max: f64,
    /// Seconds without water before a normal tree dries out.
    pub normal_dry_threshold_secs: f64,
    /// Seconds without water before an accelerated tree dries out.
    pub accelerated_dry_threshold_secs: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            default_growth_duration_secs: 600.0,
            accel_full_duration_secs: 10.0,
            sapling_max: 0.33,
            medium_max: 0.66,
            normal_dry_threshold_secs: 172_800.0,
            accelerated_dry_threshold_secs: 120.0,
        }
    }
}

/// Watering and reminder parameters.
///
/// The overdue thresholds are deliberately separate from the dryness
/// thresholds in [`GrowthConfig`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    /// Maximum waterings counted per calendar day.
    pub daily_cap: u32,
    pub normal_overdue_secs: f64,
    pub accelerated_overdue_secs: f64,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            daily_cap: 5,
            normal_overdue_secs: 432_000.0,
            accelerated_overdue_secs: 60.0,
        }
    }
}

/// Periods of the independent schedules driving the garden.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub growth_period_secs: f64,
    pub reconcile_period_secs: f64,
    pub reminder_period_secs: f64,
    pub stats_period_secs: f64,
    /// Lifetime of transient toast messages.
    pub toast_lifetime_secs: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            growth_period_secs: 1.0,
            reconcile_period_secs: 1.0,
            reminder_period_secs: 60.0,
            stats_period_secs: 10.0,
            toast_lifetime_secs: 5.0,
        }
    }
}

/// Entity synchronization parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Fraction of the target scale a freshly swapped model starts at.
    pub swap_start_fraction: f32,
    /// Duration of every eased scale animation.
    pub animation_duration_secs: f32,
    /// Scale differences at or below this are not animated.
    pub scale_epsilon: f32,
    /// Scale of a tree's first model before it animates to its target.
    pub initial_scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            swap_start_fraction: 0.8,
            animation_duration_secs: 0.5,
            scale_epsilon: 0.001,
            initial_scale: 0.01,
        }
    }
}

/// Planting and decoration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Plant requests closer than this to an existing tree are rejected.
    pub min_plant_distance: f32,
    pub decoration_min: u32,
    pub decoration_max: u32,
    pub decoration_seed: u64,
    pub grass_scale: f32,
    pub rock_scale: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_plant_distance: 0.1,
            decoration_min: 5,
            decoration_max: 8,
            decoration_seed: 0x7265_6573,
            grass_scale: 0.008,
            rock_scale: 0.0007,
        }
    }
}

/// Aggregate impact parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// CO₂ offset credited to one fully grown tree, in kg.
    pub co2_per_full_tree_kg: f64,
    /// Number of impact samples kept.
    pub history_cap: usize,
    /// Window used by the "planted recently" aggregate.
    pub recent_planting_window_secs: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            co2_per_full_tree_kg: 50.0,
            history_cap: 360,
            recent_planting_window_secs: 60.0,
        }
    }
}

/// Top-level configuration for a garden.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub growth: GrowthConfig,
    pub water: WaterConfig,
    pub schedule: ScheduleConfig,
    pub render: RenderConfig,
    pub placement: PlacementConfig,
    pub impact: ImpactConfig,
    /// Local timezone offset east of UTC, used for calendar-day bucketing.
    pub utc_offset_secs: i64,
}

impl SimConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("growth.default_growth_duration_secs", self.growth.default_growth_duration_secs),
            ("growth.accel_full_duration_secs", self.growth.accel_full_duration_secs),
            ("schedule.growth_period_secs", self.schedule.growth_period_secs),
            ("schedule.reconcile_period_secs", self.schedule.reconcile_period_secs),
            ("schedule.reminder_period_secs", self.schedule.reminder_period_secs),
            ("schedule.stats_period_secs", self.schedule.stats_period_secs),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("{name} must be positive, got {value}")));
            }
        }

        let g = &self.growth;
        if !(0.0 < g.sapling_max && g.sapling_max < g.medium_max && g.medium_max <= 1.0) {
            return Err(Error::Config(format!(
                "stage breakpoints must satisfy 0 < {} < {} <= 1",
                g.sapling_max, g.medium_max
            )));
        }
        if self.water.daily_cap == 0 {
            return Err(Error::Config("water.daily_cap must be at least 1".into()));
        }
        if self.placement.decoration_min > self.placement.decoration_max {
            return Err(Error::Config("placement.decoration_min exceeds decoration_max".into()));
        }
        Ok(())
    }
}
