//! Grove - tree growth simulation kept in sync with an anchored 3D scene

pub mod core;
pub mod math;
pub mod sim;
pub mod badges;
pub mod economy;
pub mod events;
pub mod schedule;
pub mod scene;
pub mod streaming;
pub mod sync;
pub mod placement;
pub mod garden;
