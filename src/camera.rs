use glam::Mat4;

use crate::scene_graph::NodeId;

/// Perspective projection parameters for a camera node.
///
/// The camera's placement is the world transform of `node`, resolved each
/// frame; only the projection lives here.
#[derive(Debug, Clone)]
pub struct Camera {
    pub node: NodeId,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Mat4,
}

impl Camera {
    pub fn new(node: NodeId, fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            node,
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self, world: Mat4) -> Mat4 {
        world.inverse()
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }
}
