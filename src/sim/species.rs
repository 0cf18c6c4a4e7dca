//! Tree species: model names and per-stage scale tables.

use serde::{Deserialize, Serialize};

use super::tree::{Health, Stage};

/// Model shared by every species while a sapling.
pub const SAPLING_MODEL: &str = "sapling.usdz";
/// Model shared by every species while dry.
pub const DRY_MODEL: &str = "treeDry.usdz";

/// Dry scales do not depend on species and are much smaller than the
/// healthy ones.
const DRY_SCALES: [f32; 3] = [0.0007, 0.0009, 0.003];

/// Species (visual asset selector) of a tree. Immutable after planting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Oak,
    Palm,
    #[default]
    Maple,
    Bamboo,
    Pine,
}

impl Species {
    pub const ALL: [Species; 5] = [
        Species::Oak,
        Species::Palm,
        Species::Maple,
        Species::Bamboo,
        Species::Pine,
    ];

    /// Lowercase stem used in model names.
    pub fn stem(self) -> &'static str {
        match self {
            Species::Oak => "oak",
            Species::Palm => "palm",
            Species::Maple => "maple",
            Species::Bamboo => "bamboo",
            Species::Pine => "pine",
        }
    }

    /// Capitalized display label.
    pub fn label(self) -> &'static str {
        match self {
            Species::Oak => "Oak",
            Species::Palm => "Palm",
            Species::Maple => "Maple",
            Species::Bamboo => "Bamboo",
            Species::Pine => "Pine",
        }
    }

    /// Model shown for healthy medium and full trees.
    pub fn grown_model(self) -> String {
        format!("{}.usdz", self.stem())
    }

    /// Species that must be bought before they can be planted.
    pub fn requires_purchase(self) -> bool {
        matches!(self, Species::Pine | Species::Bamboo)
    }

    /// Healthy (sapling, medium, full) scales.
    fn healthy_scales(self) -> [f32; 3] {
        match self {
            Species::Palm => [0.010, 0.003, 0.007],
            Species::Oak => [0.015, 0.003, 0.006],
            Species::Bamboo => [0.012, 0.04, 0.1],
            Species::Pine => [0.013, 0.0028, 0.005],
            Species::Maple => [0.014, 0.028, 0.045],
        }
    }

    /// Model name for a tree of this species in the given state.
    pub fn model_for(self, stage: Stage, health: Health) -> String {
        if health == Health::Dry {
            return DRY_MODEL.to_string();
        }
        match stage {
            Stage::Sapling => SAPLING_MODEL.to_string(),
            Stage::Medium | Stage::Full => self.grown_model(),
        }
    }

    /// Render scale for a tree of this species in the given state.
    pub fn scale_for(self, stage: Stage, health: Health) -> f32 {
        let table = match health {
            Health::Healthy => self.healthy_scales(),
            Health::Dry => DRY_SCALES,
        };
        table[stage.index()]
    }
}
