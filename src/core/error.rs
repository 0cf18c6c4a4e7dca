//! Error types for the grove simulation

use thiserror::Error;

use crate::economy::StoreItem;
use crate::sim::{Species, TreeId};

/// Main error type for the simulation core.
///
/// Every variant except `Io`, `Json` and `Config` describes a rejected user
/// action or a recoverable resource failure; none of them leave the garden in
/// an inconsistent state.
#[derive(Debug, Error)]
pub enum Error {
    #[error("tree not found: {0}")]
    TreeNotFound(TreeId),

    #[error("another tree is already named \"{0}\"")]
    DuplicateName(String),

    #[error("tree name must not be empty")]
    EmptyName,

    #[error("too close to an existing tree ({distance:.3} units)")]
    PlantingCollision { distance: f32 },

    #[error("no tree is selected")]
    NoSelection,

    #[error("not enough credits: need {price}, have {available}")]
    InsufficientCredits { price: u32, available: u32 },

    #[error("{0:?} has already been purchased")]
    AlreadyPurchased(StoreItem),

    #[error("{0:?} must be purchased before it can be planted")]
    SpeciesLocked(Species),

    #[error("scene is not available")]
    SceneUnavailable,

    #[error("model asset not found: {0}")]
    AssetNotFound(String),

    #[error("model load error: {0}")]
    AssetLoad(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
