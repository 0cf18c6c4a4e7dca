//! Model assets and asynchronous loading

pub mod library;
pub mod loader;

pub use library::{ModelAsset, ModelLibrary, ModelSource, GRASS_MODEL, ROCK_MODEL};
pub use loader::{LoadCompletion, LoadRequest, ModelLoader};
