//! Model sources: where model assets come from.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::RwLock;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::sim::{Species, DRY_MODEL, SAPLING_MODEL};

/// Decoration models spawned on floor surfaces.
pub const ROCK_MODEL: &str = "rock.usdz";
pub const GRASS_MODEL: &str = "grass.usdz";

/// A loaded model, ready to be attached to the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelAsset {
    pub name: String,
    /// Unscaled bounding size, resting on its origin.
    pub bounds: Vec3,
}

impl ModelAsset {
    pub fn new(name: impl Into<String>, bounds: Vec3) -> Self {
        Self { name: name.into(), bounds }
    }
}

/// Loads models by name. Called off the owning thread.
pub trait ModelSource: Send + Sync + 'static {
    fn load(&self, name: &str) -> Result<ModelAsset>;
}

/// In-memory model catalogue.
///
/// Individual names can be marked as failing, and every load can be given
/// an artificial latency, to exercise the recovery paths.
#[derive(Debug, Default)]
pub struct ModelLibrary {
    models: HashMap<String, ModelAsset>,
    failing: RwLock<HashSet<String>>,
    latency: Option<Duration>,
}

#[derive(Deserialize)]
struct Manifest {
    models: Vec<ModelAsset>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every model the garden references.
    pub fn with_defaults() -> Self {
        let mut lib = Self::new();
        lib.insert(ModelAsset::new(SAPLING_MODEL, Vec3::new(20.0, 30.0, 20.0)));
        lib.insert(ModelAsset::new(DRY_MODEL, Vec3::new(60.0, 120.0, 60.0)));
        for species in Species::ALL {
            lib.insert(ModelAsset::new(species.grown_model(), Vec3::new(50.0, 100.0, 50.0)));
        }
        lib.insert(ModelAsset::new(ROCK_MODEL, Vec3::new(100.0, 60.0, 100.0)));
        lib.insert(ModelAsset::new(GRASS_MODEL, Vec3::new(10.0, 8.0, 10.0)));
        lib
    }

    /// Parse a JSON manifest of the form `{ "models": [{ "name", "bounds" }] }`.
    pub fn from_manifest_json(json: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)?;
        let mut lib = Self::new();
        for model in manifest.models {
            lib.insert(model);
        }
        Ok(lib)
    }

    pub fn from_manifest_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_manifest_json(&json)
    }

    pub fn insert(&mut self, model: ModelAsset) {
        self.models.insert(model.name.clone(), model);
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make loads of `name` fail (or succeed again).
    pub fn set_failing(&self, name: &str, failing: bool) {
        if let Ok(mut set) = self.failing.write() {
            if failing {
                set.insert(name.to_string());
            } else {
                set.remove(name);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ModelSource for ModelLibrary {
    fn load(&self, name: &str) -> Result<ModelAsset> {
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        let failing = self
            .failing
            .read()
            .map(|set| set.contains(name))
            .unwrap_or(false);
        if failing {
            return Err(Error::AssetLoad(format!("{name}: simulated failure")));
        }
        self.models
            .get(name)
            .cloned()
            .ok_or_else(|| Error::AssetNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_cover_every_model() {
        let lib = ModelLibrary::with_defaults();
        assert!(lib.load(SAPLING_MODEL).is_ok());
        assert!(lib.load(DRY_MODEL).is_ok());
        for species in Species::ALL {
            assert!(lib.contains(&species.grown_model()));
        }
        assert!(lib.contains(ROCK_MODEL) && lib.contains(GRASS_MODEL));
    }

    #[test]
    fn test_missing_and_failing() {
        let lib = ModelLibrary::with_defaults();
        assert!(matches!(lib.load("nope.usdz"), Err(Error::AssetNotFound(_))));

        lib.set_failing("oak.usdz", true);
        assert!(matches!(lib.load("oak.usdz"), Err(Error::AssetLoad(_))));
        lib.set_failing("oak.usdz", false);
        assert!(lib.load("oak.usdz").is_ok());
    }

    #[test]
    fn test_manifest_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "models": [ {{ "name": "fern.usdz", "bounds": [1.0, 2.0, 1.0] }} ] }}"#)
            .unwrap();
        let lib = ModelLibrary::from_manifest_file(file.path()).unwrap();
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.load("fern.usdz").unwrap().bounds, Vec3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_bad_manifest() {
        assert!(matches!(ModelLibrary::from_manifest_json("{"), Err(Error::Json(_))));
    }
}
