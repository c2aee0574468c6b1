use std::time::Duration;

use glam::{Mat4, Vec3};

use crate::geometry::GeometryId;
use crate::scene_graph::{Material, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Viewport {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// A mesh that survived culling this frame.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub node: NodeId,
    pub geometry: GeometryId,
    pub world: Mat4,
    pub material: Material,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLighting {
    /// Direction the light travels in, world space.
    pub direction: Vec3,
    pub directional: Vec3,
    pub ambient: Vec3,
    /// View-projection of the shadow map when the directional light casts shadows.
    pub shadow: Option<Mat4>,
}

impl Default for FrameLighting {
    fn default() -> Self {
        Self {
            direction: Vec3::NEG_Y,
            directional: Vec3::ZERO,
            ambient: Vec3::ZERO,
            shadow: None,
        }
    }
}

/// Everything resolved for a single frame iteration. Built at the start of
/// the iteration and dropped at its end.
pub struct FrameState {
    pub index: u64,
    pub delta_time: Duration,
    pub viewport: Viewport,
    pub view: Mat4,
    pub projection: Mat4,
    pub lighting: FrameLighting,
    pub draws: Vec<DrawItem>,
    pub culled: usize,
    /// Visible shadow-casting meshes, whether or not the camera sees them.
    pub shadow_casters: Vec<DrawItem>,
    world_transforms: Vec<Mat4>,
    visible: Vec<bool>,
    order: Vec<NodeId>,
}

impl FrameState {
    pub fn new(index: u64, delta_time: Duration, viewport: Viewport) -> Self {
        Self {
            index,
            delta_time,
            viewport,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            lighting: FrameLighting::default(),
            draws: Vec::new(),
            culled: 0,
            shadow_casters: Vec::new(),
            world_transforms: Vec::new(),
            visible: Vec::new(),
            order: Vec::new(),
        }
    }

    pub(crate) fn begin_transforms(&mut self, node_count: usize) {
        self.world_transforms.clear();
        self.world_transforms.resize(node_count, Mat4::IDENTITY);
        self.visible.clear();
        self.visible.resize(node_count, false);
        self.order.clear();
        self.order.reserve(node_count);
    }

    pub(crate) fn record_world_transform(&mut self, id: NodeId, world: Mat4, visible: bool) {
        let index = id.index();

        if index >= self.world_transforms.len() {
            self.world_transforms.resize(index + 1, Mat4::IDENTITY);
            self.visible.resize(index + 1, false);
        }

        self.world_transforms[index] = world;
        self.visible[index] = visible;
        self.order.push(id);
    }

    pub fn world_transform(&self, id: NodeId) -> Option<Mat4> {
        self.world_transforms.get(id.index()).copied()
    }

    /// False for nodes that are hidden themselves or sit below a hidden node.
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.visible.get(id.index()).copied().unwrap_or(false)
    }

    /// Nodes in the order their world transforms were resolved.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_aspect_handles_zero_height() {
        assert_eq!(Viewport::new(800, 400).aspect(), 2.0);
        assert_eq!(Viewport::new(800, 0).aspect(), 1.0);
        assert!(Viewport::new(0, 400).is_empty());
    }
}
