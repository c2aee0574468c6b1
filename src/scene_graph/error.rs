use crate::scene_graph::node::NodeId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("node {0:?} does not exist in this scene")]
    UnknownNode(NodeId),

    #[error("geometry for mesh '{0}' does not exist in this scene")]
    MissingGeometry(String),
}
