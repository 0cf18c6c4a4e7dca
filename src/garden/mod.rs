//! The garden owner and its async driver

pub mod driver;
pub mod owner;

pub use driver::{drive, Command};
pub use owner::{Garden, METRIC_CO2_OFFSET, METRIC_TREES_PLANTED, PLANTED_MESSAGE};
