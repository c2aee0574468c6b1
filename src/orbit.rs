use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::config::OrbitConfig;
use crate::scene_graph::{NodeId, SceneGraph};

// Keeps the camera off the poles, where the up vector degenerates
const POLAR_MARGIN: f32 = 0.01;

/// Orbits a camera node around a target point.
pub struct OrbitControls {
    target: Vec3,
    radius: f32,
    azimuth: f32,
    polar: f32,
    config: OrbitConfig,
    dragging: bool,
    last_cursor: Option<Vec2>,
}

impl OrbitControls {
    pub fn new(position: Vec3, target: Vec3, config: OrbitConfig) -> Self {
        let offset = position - target;
        let radius = offset
            .length()
            .clamp(config.min_distance, config.max_distance);

        let polar = if offset.length_squared() > 0.0 {
            (offset.y / offset.length()).clamp(-1.0, 1.0).acos()
        } else {
            PI * 0.5
        };

        Self {
            target,
            radius,
            azimuth: offset.x.atan2(offset.z),
            polar: polar.clamp(POLAR_MARGIN, PI - POLAR_MARGIN),
            config,
            dragging: false,
            last_cursor: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();

        self.target
            + Vec3::new(
                sin_polar * sin_azimuth,
                cos_polar,
                sin_polar * cos_azimuth,
            ) * self.radius
    }

    /// Dragging right swings the camera left around the target, like a turntable.
    pub fn rotate(&mut self, pixels: Vec2) {
        self.azimuth -= pixels.x * self.config.rotate_speed;
        self.polar = (self.polar - pixels.y * self.config.rotate_speed)
            .clamp(POLAR_MARGIN, PI - POLAR_MARGIN);
    }

    /// Positive `lines` move towards the target.
    pub fn zoom(&mut self, lines: f32) {
        self.radius = (self.radius * self.config.zoom_factor.powf(lines))
            .clamp(self.config.min_distance, self.config.max_distance);
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub fn cursor_moved(&mut self, cursor: Vec2) {
        if let Some(last) = self.last_cursor {
            if self.dragging {
                self.rotate(cursor - last);
            }
        }
        self.last_cursor = Some(cursor);
    }

    /// Writes the orbit position and orientation into the camera node's local transform.
    pub fn apply(&self, scene: &mut SceneGraph, camera_node: NodeId) {
        if let Some(node) = scene.get_mut(camera_node) {
            node.transform.set_translation(self.position());
            node.transform.look_at(self.target, Vec3::Y);
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::Node;

    fn controls(position: Vec3) -> OrbitControls {
        OrbitControls::new(position, Vec3::ZERO, OrbitConfig::default())
    }

    #[test]
    fn starting_position_is_preserved() {
        let start = Vec3::new(0.0, 1.0, 5.0);
        let controls = controls(start);

        assert!(controls.position().abs_diff_eq(start, 1e-5));
    }

    #[test]
    fn rotation_keeps_distance_to_target() {
        let target = Vec3::new(1.0, 0.0, 0.0);
        let start = Vec3::new(1.0, 2.0, 4.0);
        let mut controls = OrbitControls::new(start, target, OrbitConfig::default());
        let radius = controls.radius();

        controls.rotate(Vec2::new(120.0, -40.0));

        assert!((controls.position().distance(target) - radius).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_stays_off_the_poles() {
        let mut controls = controls(Vec3::new(0.0, 0.0, 5.0));

        controls.rotate(Vec2::new(0.0, 100_000.0));

        let direction = (controls.position() - Vec3::ZERO).normalize();
        assert!(direction.y < 1.0);
        assert!(direction.y > 0.99);
    }

    #[test]
    fn zoom_is_clamped() {
        let config = OrbitConfig::default();
        let start = Vec3::new(0.0, 0.0, 5.0);
        let mut controls = OrbitControls::new(start, Vec3::ZERO, config.clone());

        controls.zoom(1_000.0);
        assert_eq!(controls.radius(), config.min_distance);

        controls.zoom(-1_000.0);
        assert_eq!(controls.radius(), config.max_distance);
    }

    #[test]
    fn cursor_only_rotates_while_dragging() {
        let mut controls = controls(Vec3::new(0.0, 0.0, 5.0));
        let start = controls.position();

        controls.cursor_moved(Vec2::new(10.0, 10.0));
        controls.cursor_moved(Vec2::new(200.0, 10.0));
        assert!(controls.position().abs_diff_eq(start, 1e-6));

        controls.set_dragging(true);
        controls.cursor_moved(Vec2::new(300.0, 10.0));
        assert!(!controls.position().abs_diff_eq(start, 1e-3));
    }

    #[test]
    fn apply_points_camera_node_at_target() {
        let mut scene = SceneGraph::new();
        let node = scene.add_node(Node::camera("camera"));
        let controls = controls(Vec3::new(3.0, 2.0, 1.0));

        controls.apply(&mut scene, node);

        let transform = scene.get(node).unwrap().transform;
        let forward = transform.rotation() * Vec3::NEG_Z;
        let position = controls.position();
        assert!(transform.translation().abs_diff_eq(position, 1e-6));
        assert!(forward.abs_diff_eq(-position.normalize(), 1e-4));
    }
}
