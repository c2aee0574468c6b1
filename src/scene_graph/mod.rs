pub mod error;
pub mod light;
pub mod node;
pub mod scene;
pub mod transform;

// Re-export main types for convenience
pub use error::SceneError;
pub use light::Light;
pub use node::{Material, Node, NodeId, NodeKind, Renderable};
pub use scene::SceneGraph;
pub use transform::Transform;
