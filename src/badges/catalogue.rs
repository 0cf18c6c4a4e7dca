//! Fixed badge catalogue and the predicate each badge tests.

use serde::{Deserialize, Serialize};

use crate::sim::Aggregates;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Badge {
    GreenThumb,
    ForestForager,
    Co2Crusader,
    ForestGuardian,
    EcoWarrior,
    NatureProtector,
    TreeHugger,
    SeedSower,
    EcoInnovator,
}

/// Thresholds the predicates compare aggregates against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BadgeThresholds {
    /// Daily water cap; watering one tree this often in a day earns Tree Hugger.
    pub daily_water_cap: u32,
}

impl Badge {
    pub const ALL: [Badge; 9] = [
        Badge::GreenThumb,
        Badge::ForestForager,
        Badge::Co2Crusader,
        Badge::ForestGuardian,
        Badge::EcoWarrior,
        Badge::NatureProtector,
        Badge::TreeHugger,
        Badge::SeedSower,
        Badge::EcoInnovator,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Badge::GreenThumb => "Green Thumb",
            Badge::ForestForager => "Forest Forager",
            Badge::Co2Crusader => "CO₂ Crusader",
            Badge::ForestGuardian => "Forest Guardian",
            Badge::EcoWarrior => "Eco Warrior",
            Badge::NatureProtector => "Nature Protector",
            Badge::TreeHugger => "Tree Hugger",
            Badge::SeedSower => "Seed Sower",
            Badge::EcoInnovator => "Eco Innovator",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Badge::GreenThumb => "Plant your first tree",
            Badge::ForestForager => "Plant 5 trees",
            Badge::Co2Crusader => "Offset 100 kg of CO₂",
            Badge::ForestGuardian => "Plant 10 trees or offset 200 kg of CO₂",
            Badge::EcoWarrior => "Plant 20 trees",
            Badge::NatureProtector => "Offset 500 kg of CO₂",
            Badge::TreeHugger => "Water a tree as often as allowed in one day",
            Badge::SeedSower => "Plant 3 trees within a minute",
            Badge::EcoInnovator => "Accelerate the growth of 5 trees",
        }
    }

    /// Credits awarded the first time the badge is earned.
    pub fn credits(self) -> u32 {
        match self {
            Badge::GreenThumb => 10,
            Badge::ForestForager => 20,
            Badge::Co2Crusader => 30,
            Badge::ForestGuardian => 40,
            Badge::EcoWarrior => 50,
            Badge::NatureProtector => 60,
            Badge::TreeHugger | Badge::SeedSower | Badge::EcoInnovator => 5,
        }
    }

    pub fn is_met(self, agg: &Aggregates, thresholds: &BadgeThresholds) -> bool {
        match self {
            Badge::GreenThumb => agg.tree_count >= 1,
            Badge::ForestForager => agg.tree_count >= 5,
            Badge::Co2Crusader => agg.co2_kg >= 100.0,
            Badge::ForestGuardian => agg.tree_count >= 10 || agg.co2_kg >= 200.0,
            Badge::EcoWarrior => agg.tree_count >= 20,
            Badge::NatureProtector => agg.co2_kg >= 500.0,
            Badge::TreeHugger => agg.max_water_count_today >= thresholds.daily_water_cap,
            Badge::SeedSower => agg.recently_planted >= 3,
            Badge::EcoInnovator => agg.accelerated_count >= 5,
        }
    }
}
