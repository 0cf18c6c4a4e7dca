//! Growth and health simulation: the tree store and everything that mutates it.

pub mod acceleration;
pub mod config;
pub mod growth;
pub mod species;
pub mod stats;
pub mod store;
pub mod tree;
pub mod water;

pub use acceleration::{accelerate, accelerated_progress, GrowthTuning};
pub use config::{
    GrowthConfig, ImpactConfig, PlacementConfig, RenderConfig, ScheduleConfig, SimConfig,
    WaterConfig,
};
pub use growth::{linear_progress, GrowthEvent, GrowthSimulator};
pub use species::{Species, DRY_MODEL, SAPLING_MODEL};
pub use stats::{Aggregates, ImpactHistory, ImpactSample};
pub use store::TreeStore;
pub use tree::{Acceleration, Health, Stage, Tree, TreeId};
pub use water::{next_reminder_delay, scan_overdue, water_all_overdue, water_tree, OverdueScan, Watered};
