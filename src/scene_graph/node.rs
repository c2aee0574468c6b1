use glam::{Quat, Vec3};
use id_arena::Id;

use crate::geometry::GeometryId;
use crate::scene_graph::light::{color_from_hex, Light};
use crate::scene_graph::transform::Transform;

pub type NodeId = Id<Node>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Vec3,
    pub casts_shadow: bool,
    pub receives_shadow: bool,
}

impl Material {
    pub fn from_hex(hex: u32) -> Self {
        Self {
            color: color_from_hex(hex),
            casts_shadow: false,
            receives_shadow: false,
        }
    }

    pub fn with_shadows(mut self, casts_shadow: bool, receives_shadow: bool) -> Self {
        self.casts_shadow = casts_shadow;
        self.receives_shadow = receives_shadow;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    pub geometry: GeometryId,
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh(Renderable),
    Light(Light),
    /// Attachment point for a [`crate::camera::Camera`].
    Camera,
}

pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    /// Hidden nodes hide their whole subtree.
    pub visible: bool,
    parent_id: Option<NodeId>,
    child_ids: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            kind,
            visible: true,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn light(name: impl Into<String>, light: Light) -> Self {
        Self::new(name, NodeKind::Light(light))
    }

    pub fn camera(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Camera)
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform.set_translation(translation);
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.set_rotation(rotation);
        self
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }

    pub fn child_ids(&self) -> &[NodeId] {
        &self.child_ids
    }

    pub(super) fn set_parent_id(&mut self, parent_id: Option<NodeId>) {
        self.parent_id = parent_id;
    }

    pub(super) fn push_child(&mut self, child_id: NodeId) {
        self.child_ids.push(child_id);
    }

    pub(super) fn remove_child(&mut self, child_id: NodeId) {
        self.child_ids.retain(|&id| id != child_id);
    }
}
