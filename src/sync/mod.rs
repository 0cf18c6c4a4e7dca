//! Tree-to-scene synchronization

pub mod record;
pub mod synchronizer;

pub use record::{EntityRecord, PendingSwap};
pub use synchronizer::{Applied, EntitySynchronizer, ReconcileReport};
