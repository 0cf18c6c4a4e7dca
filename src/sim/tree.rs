//! Tree record: the canonical simulated state of one planted organism.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::Timestamp;
use super::config::GrowthConfig;
use super::species::Species;

/// Unique, immutable identity of a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreeId(pub Uuid);

impl TreeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TreeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discrete growth phase derived from progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Sapling,
    Medium,
    Full,
}

impl Stage {
    /// Stage for a progress value. Breakpoints are exclusive upper bounds:
    /// a progress exactly at `sapling_max` is already medium.
    pub fn from_progress(progress: f64, growth: &GrowthConfig) -> Self {
        if progress < growth.sapling_max {
            Stage::Sapling
        } else if progress < growth.medium_max {
            Stage::Medium
        } else {
            Stage::Full
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Health {
    #[default]
    Healthy,
    Dry,
}

/// Present once a tree has been fast-forwarded. Never cleared.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Acceleration {
    pub start: Timestamp,
    /// Linear progress captured at `start`.
    pub base_progress: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    id: TreeId,
    species: Species,
    /// Planting number used to derive default names.
    sequence: u32,
    pub name: String,
    pub stage: Stage,
    pub health: Health,
    /// In `[0, 1]`. Frozen while dry.
    pub growth_progress: f64,
    pub planted_at: Timestamp,
    pub last_watered: Timestamp,
    pub last_water_date: Timestamp,
    pub water_count_today: u32,
    pub full_grown_at: Option<Timestamp>,
    pub acceleration: Option<Acceleration>,
    /// True while continuously dry since the dry notification fired.
    pub has_played_dry_sound: bool,
}

impl Tree {
    pub fn new(species: Species, sequence: u32, name: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: TreeId::new(),
            species,
            sequence,
            name: name.into(),
            stage: Stage::Sapling,
            health: Health::Healthy,
            growth_progress: 0.0,
            planted_at: now,
            last_watered: now,
            last_water_date: now,
            water_count_today: 0,
            full_grown_at: None,
            acceleration: None,
            has_played_dry_sound: false,
        }
    }

    #[inline]
    pub fn id(&self) -> TreeId {
        self.id
    }

    #[inline]
    pub fn species(&self) -> Species {
        self.species
    }

    #[inline]
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    #[inline]
    pub fn is_accelerated(&self) -> bool {
        self.acceleration.is_some()
    }

    #[inline]
    pub fn is_dry(&self) -> bool {
        self.health == Health::Dry
    }

    /// Model this tree should currently be rendered with.
    pub fn model_name(&self) -> String {
        self.species.model_for(self.stage, self.health)
    }

    /// Scale this tree should currently be rendered at.
    pub fn target_scale(&self) -> f32 {
        self.species.scale_for(self.stage, self.health)
    }

    /// Default name for a freshly planted tree.
    pub fn default_name(species: Species, sequence: u32) -> String {
        format!("{} {}", species.label(), sequence)
    }

    /// Name this tree should carry after moving to `stage`, or None when the
    /// current name is user-chosen and must be preserved.
    pub fn stage_name(&self, stage: Stage) -> Option<String> {
        let lowered = self.name.to_lowercase();
        let sapling_stem = super::species::SAPLING_MODEL.trim_end_matches(".usdz");
        let carries_default = lowered.starts_with(sapling_stem)
            || lowered.starts_with(self.species.stem());
        if !carries_default {
            return None;
        }

        let suffix = self.name.trim_start_matches(|c: char| c.is_alphabetic());
        let prefix = match stage {
            Stage::Sapling => "Sapling",
            Stage::Medium | Stage::Full => self.species.label(),
        };
        Some(format!("{prefix}{suffix}"))
    }
}
