//! Scene graph boundary and its headless implementation

pub mod camera;
pub mod graph;
pub mod node;
pub mod provider;
pub mod tween;

pub use camera::Camera;
pub use graph::SceneGraph;
pub use node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};
pub use provider::{AnchorHandle, Easing, EntityHandle, SceneProvider};
pub use tween::ScaleTween;
