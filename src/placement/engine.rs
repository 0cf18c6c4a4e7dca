//! Spatial placement: turns taps and detected surfaces into trees and
//! decorations.
//!
//! The only collision rule is a minimum distance between tree anchors.
//! Decoration loads go through the same loader as tree models and are
//! attached when their completion is drained on the owner.

use std::collections::{HashMap, HashSet};

use glam::{Mat4, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::{Error, Result, Timestamp};
use crate::scene::{AnchorHandle, EntityHandle, SceneProvider};
use crate::sim::{PlacementConfig, Species, TreeId, TreeStore};
use crate::streaming::{LoadCompletion, ModelLoader};
use crate::sync::EntitySynchronizer;
use super::decoration::{scatter, DecorationSpawn};
use super::surface::{DetectedSurface, SurfaceClass, SurfaceId};

/// Decorations waiting for their model.
#[derive(Clone, Debug)]
struct PendingDecoration {
    anchor: AnchorHandle,
    spawn: DecorationSpawn,
    generation: u64,
}

pub struct PlacementEngine {
    config: PlacementConfig,
    rng: StdRng,
    surfaces: HashSet<SurfaceId>,
    pending: HashMap<u64, PendingDecoration>,
    decorations: Vec<EntityHandle>,
}

impl PlacementEngine {
    pub fn new(config: PlacementConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.decoration_seed);
        Self {
            config,
            rng,
            surfaces: HashSet::new(),
            pending: HashMap::new(),
            decorations: Vec::new(),
        }
    }

    /// Register a detected surface. Floors also get an anchor and a random
    /// scatter of decorations. Surfaces already seen are ignored.
    pub fn on_surface_detected(
        &mut self,
        surface: &DetectedSurface,
        scene: &mut dyn SceneProvider,
        loader: &mut ModelLoader,
        generation: u64,
    ) -> usize {
        if !self.surfaces.insert(surface.id) {
            return 0;
        }
        if surface.class.is_horizontal() {
            scene.register_surface(surface.transform, surface.extent);
        }
        if surface.class != SurfaceClass::Floor {
            return 0;
        }

        let anchor = scene.add_anchor(surface.transform);
        let spawns = scatter(&mut self.rng, surface.extent, &self.config);
        let mut requested = 0;
        for spawn in spawns {
            match loader.request(spawn.kind.model(), generation) {
                Ok(ticket) => {
                    self.pending.insert(ticket, PendingDecoration { anchor, spawn, generation });
                    requested += 1;
                }
                Err(e) => log::warn!("decoration {} not requested: {}", spawn.kind.model(), e),
            }
        }
        log::debug!("surface {:?}: {} decorations requested", surface.id, requested);
        requested
    }

    pub fn owns_ticket(&self, ticket: u64) -> bool {
        self.pending.contains_key(&ticket)
    }

    /// Attach a decoration whose model finished loading. Returns true when a
    /// decoration was placed. Failed or stale loads are dropped; decorations
    /// are cosmetic and never retried.
    pub fn apply_completion(
        &mut self,
        completion: LoadCompletion,
        scene: &mut dyn SceneProvider,
        generation: u64,
    ) -> bool {
        let Some(pending) = self.pending.remove(&completion.ticket) else {
            return false;
        };
        if pending.generation != generation {
            return false;
        }
        let asset = match completion.result {
            Ok(asset) => asset,
            Err(e) => {
                log::warn!("decoration load failed: {e}");
                return false;
            }
        };
        match scene.attach_model(pending.anchor, &asset, pending.spawn.offset, pending.spawn.scale) {
            Some(entity) => {
                self.decorations.push(entity);
                true
            }
            None => false,
        }
    }

    /// Drop every pending decoration. Called on teardown.
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
    }

    pub fn decoration_count(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_decoration(&self, entity: EntityHandle) -> bool {
        self.decorations.contains(&entity)
    }

    /// Distance to the nearest existing tree anchor that blocks `position`.
    pub fn blocking_distance(
        &self,
        position: Vec3,
        anchors: impl IntoIterator<Item = Vec3>,
    ) -> Option<f32> {
        anchors
            .into_iter()
            .map(|p| p.distance(position))
            .filter(|&d| d < self.config.min_plant_distance)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Plant a tree at a hit transform.
    ///
    /// Rejected with `PlantingCollision` and no mutation when an existing
    /// tree's anchor is closer than the minimum distance. On success exactly
    /// one tree, one anchor and one entity record are created.
    pub fn plant(
        &self,
        hit: Mat4,
        species: Species,
        now: Timestamp,
        store: &mut TreeStore,
        sync: &mut EntitySynchronizer,
        scene: &mut dyn SceneProvider,
    ) -> Result<TreeId> {
        let position = hit.w_axis.truncate();
        let anchors: Vec<Vec3> = store
            .iter()
            .filter_map(|t| sync.record(t.id()))
            .filter_map(|r| scene.anchor_position(r.anchor))
            .collect();
        if let Some(distance) = self.blocking_distance(position, anchors) {
            log::info!("plant rejected: {distance:.3} from an existing tree");
            return Err(Error::PlantingCollision { distance });
        }

        let anchor = scene.add_anchor(hit);
        let id = store.plant(species, now);
        sync.create_record(id, anchor);
        Ok(id)
    }

    /// Which tree a picked entity belongs to. Decorations and unknown
    /// entities select nothing.
    pub fn select(&self, entity: EntityHandle, sync: &EntitySynchronizer) -> Option<TreeId> {
        sync.owner_of(entity)
    }
}
