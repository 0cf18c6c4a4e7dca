//! Nodes of the headless scene: the root group, anchors pinned to world
//! poses, and model instances hanging below anchors.

use glam::{Mat4, Quat, Vec3};

use crate::streaming::ModelAsset;

/// Unique identifier for a scene graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneNodeId(pub u64);

/// Pose relative to the parent. Models only ever scale uniformly, so a
/// single factor is kept.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl LocalTransform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Decompose a world matrix. Non-uniform scale collapses to its x axis.
    pub fn from_mat4(m: Mat4) -> Self {
        let (scale, rotation, position) = m.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale: scale.x,
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.position,
        )
    }
}

#[derive(Clone, Debug)]
pub enum NodeContent {
    /// The root. Holds anchors only.
    Group,
    Anchor,
    Model(ModelAsset),
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub id: SceneNodeId,
    pub name: String,
    pub parent: Option<SceneNodeId>,
    pub children: Vec<SceneNodeId>,
    pub local_transform: LocalTransform,
    pub content: NodeContent,
}

impl SceneNode {
    pub fn new(id: SceneNodeId, name: impl Into<String>, content: NodeContent) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local_transform: LocalTransform::default(),
            content,
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self.content, NodeContent::Model(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_transform_is_identity() {
        let t = LocalTransform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.to_mat4(), Mat4::IDENTITY);
    }

    #[test]
    fn test_local_transform_mat4_roundtrip_with_scale() {
        let t = LocalTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.5),
            scale: 0.02,
        };
        let back = LocalTransform::from_mat4(t.to_mat4());
        assert!((back.position - t.position).length() < 1e-5);
        assert!((back.scale - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_scene_node_new() {
        let node = SceneNode::new(SceneNodeId(4), "anchor", NodeContent::Anchor);
        assert_eq!(node.id, SceneNodeId(4));
        assert!(node.parent.is_none());
        assert!(node.children.is_empty());
        assert!(!node.is_model());
    }
}
