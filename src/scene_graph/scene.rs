use glam::Mat4;
use id_arena::Arena;

use crate::frame::FrameState;
use crate::geometry::{Geometry, GeometryId};
use crate::scene_graph::error::SceneError;
use crate::scene_graph::node::{Material, Node, NodeId, NodeKind, Renderable};

/// A forest of nodes plus the geometry they reference.
///
/// Nodes are owned by the arena; the tree is expressed with parent and child
/// ids, so a node has at most one parent and the graph is kept acyclic by
/// [`SceneGraph::add_child`].
pub struct SceneGraph {
    nodes: Arena<Node>,
    geometries: Arena<Geometry>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            geometries: Arena::new(),
        }
    }

    /// Inserts a detached node.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.nodes.alloc(node)
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.alloc(geometry)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id)
    }

    /// Inserts a detached mesh node, checking that its geometry belongs to this scene.
    pub fn spawn_mesh(
        &mut self,
        name: impl Into<String>,
        geometry: GeometryId,
        material: Material,
    ) -> Result<NodeId, SceneError> {
        let name = name.into();

        if self.geometries.get(geometry).is_none() {
            return Err(SceneError::MissingGeometry(name));
        }

        let node = Node::new(name, NodeKind::Mesh(Renderable { geometry, material }));
        Ok(self.add_node(node))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent_id().is_none())
            .map(|(id, _)| id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(Node::parent_id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(Node::child_ids).unwrap_or(&[])
    }

    /// Returns true if `ancestor` is `node` itself or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);

        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }

        false
    }

    /// Attaches `child` as the last child of `parent`, moving it away from
    /// its previous parent if it had one. The graph is left untouched on error.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        for id in [parent, child] {
            if !self.contains(id) {
                return Err(SceneError::UnknownNode(id));
            }
        }

        if self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { parent, child });
        }

        if let Some(old_parent) = self.nodes[child].parent_id() {
            self.nodes[old_parent].remove_child(child);
        }

        self.nodes[child].set_parent_id(Some(parent));
        self.nodes[parent].push_child(child);

        log::trace!(
            "Attached '{}' under '{}'",
            self.nodes[child].name,
            self.nodes[parent].name
        );

        Ok(())
    }

    /// Removes `node` from its parent, making it a root.
    pub fn detach(&mut self, node: NodeId) -> Result<(), SceneError> {
        if !self.contains(node) {
            return Err(SceneError::UnknownNode(node));
        }

        if let Some(parent) = self.nodes[node].parent_id() {
            self.nodes[parent].remove_child(node);
            self.nodes[node].set_parent_id(None);
        }

        Ok(())
    }

    /// Resolves `world = parent world × local` for every node into `frame`,
    /// visiting parents before their children.
    ///
    /// Walks the forest with an explicit stack so arbitrarily deep chains
    /// cannot exhaust the call stack.
    pub fn compute_world_transforms(&self, frame: &mut FrameState) {
        frame.begin_transforms(self.nodes.len());

        let mut stack: Vec<(NodeId, Mat4, bool)> = self
            .roots()
            .map(|root| (root, Mat4::IDENTITY, true))
            .collect();
        stack.reverse();

        while let Some((id, parent_world_matrix, parent_visible)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };

            let world_matrix = parent_world_matrix * node.transform.local_matrix();
            let visible = parent_visible && node.visible;
            frame.record_world_transform(id, world_matrix, visible);

            // Reversed so the first child is popped first
            for &child_id in node.child_ids().iter().rev() {
                stack.push((child_id, world_matrix, visible));
            }
        }
    }
}
