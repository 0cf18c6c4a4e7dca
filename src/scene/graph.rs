//! Scene graph: headless hierarchy of anchors and model entities.
//!
//! Anchors hang off the root, models hang off anchors. World transforms are
//! composed on demand by walking parents, so picking and raycasts always
//! observe the latest local transforms and tween values.

use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3};

use crate::math::Aabb;
use crate::streaming::ModelAsset;

use super::camera::Camera;
use super::node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};
use super::provider::{AnchorHandle, Easing, EntityHandle, SceneProvider};
use super::tween::ScaleTween;

/// Horizontal surface registered for raycasts.
#[derive(Clone, Debug)]
struct Surface {
    transform: Mat4,
    inverse: Mat4,
    extent: Vec2,
}

pub struct SceneGraph {
    nodes: HashMap<SceneNodeId, SceneNode>,
    root: SceneNodeId,
    next_id: u64,
    tweens: HashMap<SceneNodeId, ScaleTween>,
    surfaces: Vec<Surface>,
    camera: Camera,
}

impl SceneGraph {
    /// Create a new scene graph with a root Group node.
    pub fn new() -> Self {
        let root_id = SceneNodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root_id, SceneNode::new(root_id, "root", NodeContent::Group));

        Self {
            nodes,
            root: root_id,
            next_id: 1,
            tweens: HashMap::new(),
            surfaces: Vec::new(),
            camera: Camera::default(),
        }
    }

    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    fn alloc_id(&mut self) -> SceneNodeId {
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a child node under `parent`. Returns the new node's ID.
    pub fn add_child(
        &mut self,
        parent: SceneNodeId,
        name: impl Into<String>,
        content: NodeContent,
        transform: LocalTransform,
    ) -> SceneNodeId {
        let id = self.alloc_id();
        let mut node = SceneNode::new(id, name, content);
        node.parent = Some(parent);
        node.local_transform = transform;
        self.nodes.insert(id, node);

        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }
        id
    }

    /// Remove a node and its entire subtree. Cannot remove the root.
    pub fn remove(&mut self, id: SceneNodeId) {
        if id == self.root {
            return;
        }

        // Collect subtree IDs (BFS)
        let mut to_remove = vec![id];
        let mut i = 0;
        while i < to_remove.len() {
            if let Some(node) = self.nodes.get(&to_remove[i]) {
                to_remove.extend_from_slice(&node.children);
            }
            i += 1;
        }

        if let Some(parent_id) = self.nodes.get(&id).and_then(|n| n.parent) {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|c| *c != id);
            }
        }

        for nid in to_remove {
            self.nodes.remove(&nid);
            self.tweens.remove(&nid);
        }
    }

    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn children(&self, id: SceneNodeId) -> impl Iterator<Item = SceneNodeId> + '_ {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Model entities currently attached under `anchor`.
    pub fn models_under(&self, anchor: AnchorHandle) -> Vec<EntityHandle> {
        self.children(SceneNodeId(anchor.0))
            .filter(|c| self.nodes.get(c).is_some_and(SceneNode::is_model))
            .map(|c| EntityHandle(c.0))
            .collect()
    }

    /// Name of the model an entity shows.
    pub fn model_name(&self, entity: EntityHandle) -> Option<&str> {
        match &self.nodes.get(&SceneNodeId(entity.0))?.content {
            NodeContent::Model(asset) => Some(asset.name.as_str()),
            _ => None,
        }
    }

    pub fn model_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_model()).count()
    }

    pub fn is_animating(&self, entity: EntityHandle) -> bool {
        self.tweens.contains_key(&SceneNodeId(entity.0))
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Compose the world transform of a node from its ancestors.
    pub fn world_matrix(&self, id: SceneNodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(&id)?;
        let mut world = node.local_transform.to_mat4();
        while let Some(parent) = node.parent.and_then(|p| self.nodes.get(&p)) {
            world = parent.local_transform.to_mat4() * world;
            node = parent;
        }
        Some(world)
    }

    fn model_bounds(&self, node: &SceneNode) -> Option<Aabb> {
        let NodeContent::Model(asset) = &node.content else {
            return None;
        };
        let (scale, _, base) = self.world_matrix(node.id)?.to_scale_rotation_translation();
        Some(Aabb::standing_on(base, asset.bounds * scale.x))
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneProvider for SceneGraph {
    fn add_anchor(&mut self, world: Mat4) -> AnchorHandle {
        let id = self.add_child(self.root, "anchor", NodeContent::Anchor, LocalTransform::from_mat4(world));
        AnchorHandle(id.0)
    }

    fn anchor_transform(&self, anchor: AnchorHandle) -> Option<Mat4> {
        let node = self.nodes.get(&SceneNodeId(anchor.0))?;
        matches!(node.content, NodeContent::Anchor).then(|| node.local_transform.to_mat4())
    }

    fn attach_model(
        &mut self,
        anchor: AnchorHandle,
        model: &ModelAsset,
        offset: Vec3,
        scale: f32,
    ) -> Option<EntityHandle> {
        let parent = SceneNodeId(anchor.0);
        if !matches!(self.nodes.get(&parent)?.content, NodeContent::Anchor) {
            return None;
        }
        let transform = LocalTransform {
            scale,
            ..LocalTransform::from_position(offset)
        };
        let id = self.add_child(parent, model.name.clone(), NodeContent::Model(model.clone()), transform);
        Some(EntityHandle(id.0))
    }

    fn detach(&mut self, entity: EntityHandle) {
        let id = SceneNodeId(entity.0);
        if self.nodes.get(&id).is_some_and(SceneNode::is_model) {
            self.remove(id);
        }
    }

    fn animate_scale(&mut self, entity: EntityHandle, target: f32, duration: f32, easing: Easing) {
        let id = SceneNodeId(entity.0);
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        if duration <= 0.0 {
            node.local_transform.scale = target;
            self.tweens.remove(&id);
            return;
        }
        let from = node.local_transform.scale;
        self.tweens.insert(id, ScaleTween::new(from, target, duration, easing));
    }

    fn entity_scale(&self, entity: EntityHandle) -> Option<f32> {
        self.nodes
            .get(&SceneNodeId(entity.0))
            .map(|n| n.local_transform.scale)
    }

    fn entity_anchor(&self, entity: EntityHandle) -> Option<AnchorHandle> {
        let parent = self.nodes.get(&SceneNodeId(entity.0))?.parent?;
        matches!(self.nodes.get(&parent)?.content, NodeContent::Anchor).then_some(AnchorHandle(parent.0))
    }

    fn raycast(&self, screen: Vec2) -> Option<Mat4> {
        let ray = self.camera.screen_ray(screen);
        self.surfaces
            .iter()
            .filter_map(|s| {
                let height = s.transform.w_axis.y;
                let t = ray.intersects_horizontal_plane(height)?;
                let hit = ray.at(t);
                let local = s.inverse.transform_point3(hit);
                let inside = local.x.abs() <= s.extent.x * 0.5 && local.z.abs() <= s.extent.y * 0.5;
                inside.then_some((t, hit))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, hit)| Mat4::from_translation(hit))
    }

    fn hit_entity(&self, screen: Vec2) -> Option<EntityHandle> {
        let ray = self.camera.screen_ray(screen);
        self.nodes
            .values()
            .filter_map(|n| {
                let bounds = self.model_bounds(n)?;
                let (t_near, _) = ray.intersects_aabb(&bounds)?;
                Some((t_near, n.id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| EntityHandle(id.0))
    }

    fn register_surface(&mut self, center: Mat4, extent: Vec2) {
        self.surfaces.push(Surface {
            transform: center,
            inverse: center.inverse(),
            extent,
        });
    }

    fn advance(&mut self, dt: f32) {
        let mut finished = Vec::new();
        for (id, tween) in self.tweens.iter_mut() {
            let value = tween.update(dt);
            if let Some(node) = self.nodes.get_mut(id) {
                node.local_transform.scale = value;
            }
            if tween.is_finished() {
                finished.push(*id);
            }
        }
        for id in finished {
            self.tweens.remove(&id);
        }
    }
}
