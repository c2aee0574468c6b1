use crate::camera::Camera;
use crate::frame::Viewport;
use crate::rendering::FrameRenderer;

/// Applies viewport changes to the camera projection and the render targets.
///
/// Resizes are handled synchronously inside the event dispatch, so the next
/// frame iteration always reads the updated projection.
pub struct ResizeController {
    current: Viewport,
}

impl Default for ResizeController {
    fn default() -> Self {
        Self::new()
    }
}

impl ResizeController {
    pub fn new() -> Self {
        Self {
            current: Viewport::new(0, 0),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.current
    }

    /// Returns true if the change was applied. Empty viewports (minimized
    /// windows) and repeated sizes are ignored.
    pub fn handle_resize<R: FrameRenderer + ?Sized>(
        &mut self,
        viewport: Viewport,
        camera: &mut Camera,
        renderer: &mut R,
    ) -> bool {
        if viewport.is_empty() {
            log::debug!("Ignoring resize to {}x{}", viewport.width, viewport.height);
            return false;
        }

        if viewport == self.current {
            return false;
        }

        camera.set_aspect(viewport.aspect());
        renderer.resize(viewport);
        self.current = viewport;

        log::debug!(
            "Resized to {}x{} (aspect {:.3})",
            viewport.width,
            viewport.height,
            camera.aspect()
        );

        true
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::geometry::primitives;
    use crate::rendering::testing::RecordingRenderer;
    use crate::scene_graph::{Material, Node, SceneGraph};
    use crate::scheduler::{FrameScheduler, StopSignal};

    fn scene_with_camera() -> (SceneGraph, Camera) {
        let mut scene = SceneGraph::new();
        let cube = scene.add_geometry(primitives::cuboid(1.0, 1.0, 1.0));
        scene
            .spawn_mesh("cube", cube, Material::from_hex(0xffffff))
            .unwrap();

        let camera = Node::camera("camera").with_translation(Vec3::new(0.0, 0.0, 5.0));
        let node = scene.add_node(camera);
        (scene, Camera::new(node, 60.0, 1.0, 0.1, 100.0))
    }

    #[test]
    fn resize_between_frames_shows_in_next_projection() {
        let (scene, mut camera) = scene_with_camera();
        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let mut scheduler = FrameScheduler::new(StopSignal::new(), None);
        let mut controller = ResizeController::new();

        scheduler.tick(&scene, &camera, &mut renderer);
        let before = renderer.last_frame().projection;

        let wide = Viewport::new(1600, 800);
        let resized = controller.handle_resize(wide, &mut camera, &mut renderer);
        assert!(resized);
        scheduler.tick(&scene, &camera, &mut renderer);

        let expected = Mat4::perspective_rh(60f32.to_radians(), 2.0, 0.1, 100.0);
        assert_ne!(renderer.last_frame().projection, before);
        assert!(renderer.last_frame().projection.abs_diff_eq(expected, 1e-6));
        assert_eq!(renderer.viewport, Viewport::new(1600, 800));
    }

    #[test]
    fn minimized_window_leaves_camera_untouched() {
        let (_scene, mut camera) = scene_with_camera();
        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let mut controller = ResizeController::new();
        let projection = camera.projection();

        let resized = controller.handle_resize(Viewport::new(0, 0), &mut camera, &mut renderer);
        assert!(!resized);

        assert_eq!(camera.projection(), projection);
        assert!(renderer.resizes.is_empty());
    }

    #[test]
    fn repeated_size_is_a_no_op() {
        let (_scene, mut camera) = scene_with_camera();
        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let mut controller = ResizeController::new();

        let size = Viewport::new(640, 480);
        assert!(controller.handle_resize(size, &mut camera, &mut renderer));
        assert!(!controller.handle_resize(size, &mut camera, &mut renderer));

        assert_eq!(renderer.resizes.len(), 1);
        assert_eq!(controller.viewport(), Viewport::new(640, 480));
    }
}
