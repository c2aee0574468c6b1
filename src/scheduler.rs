use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::frame::{DrawItem, FrameLighting, FrameState};
use crate::math::frustum::Frustum;
use crate::rendering::{FrameRenderer, RenderError};
use crate::scene_graph::{Light, NodeKind, SceneGraph};

/// Cloneable request to end the render loop. Observed only between frames.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub index: u64,
    pub delta_time: Duration,
    pub drawn: usize,
    pub culled: usize,
    pub shadow_casters: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Rendered(FrameStats),
    /// The renderer failed in a recoverable way; the frame was not presented.
    Dropped,
    /// Nothing to draw into, e.g. a minimized window.
    Skipped,
    Stopped,
}

/// Runs one compute-cull-submit-present iteration per display refresh.
///
/// The host calls [`FrameScheduler::tick`] from its frame-timing callback.
/// `tick` borrows the scheduler mutably and runs to completion, so iterations
/// never overlap.
pub struct FrameScheduler {
    stop: StopSignal,
    frame_index: u64,
    frames_rendered: u64,
    frame_limit: Option<u64>,
    last_frame: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(stop: StopSignal, frame_limit: Option<u64>) -> Self {
        Self {
            stop,
            frame_index: 0,
            frames_rendered: 0,
            frame_limit,
            last_frame: None,
        }
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn tick<R: FrameRenderer + ?Sized>(
        &mut self,
        scene: &SceneGraph,
        camera: &Camera,
        renderer: &mut R,
    ) -> TickOutcome {
        if self.frame_limit_reached() && !self.stop.is_stopped() {
            log::info!("Frame limit of {} reached", self.frames_rendered);
            self.stop.stop();
        }

        if self.stop.is_stopped() {
            return TickOutcome::Stopped;
        }

        if !scene.contains(camera.node) {
            log::error!("Camera node {:?} is not part of the scene", camera.node);
            self.stop.stop();
            return TickOutcome::Stopped;
        }

        let viewport = renderer.viewport();
        if viewport.is_empty() {
            return TickOutcome::Skipped;
        }

        let now = Instant::now();
        let delta_time = self
            .last_frame
            .map(|last| now.duration_since(last))
            .unwrap_or_default();
        self.last_frame = Some(now);

        let mut frame = FrameState::new(self.frame_index, delta_time, viewport);
        self.frame_index += 1;

        scene.compute_world_transforms(&mut frame);

        let camera_world = frame
            .world_transform(camera.node)
            .unwrap_or(Mat4::IDENTITY);
        frame.view = camera.view_matrix(camera_world);
        frame.projection = camera.projection();

        cull(scene, &mut frame);

        if let Err(error) = renderer.submit(scene, &frame) {
            return self.handle_render_error(error, renderer);
        }
        renderer.present();

        self.frames_rendered += 1;

        let stats = FrameStats {
            index: frame.index,
            delta_time: frame.delta_time,
            drawn: frame.draws.len(),
            culled: frame.culled,
            shadow_casters: frame.shadow_casters.len(),
        };
        log::trace!("Frame {:?}", stats);

        TickOutcome::Rendered(stats)
    }

    fn frame_limit_reached(&self) -> bool {
        self.frame_limit
            .is_some_and(|limit| self.frames_rendered >= limit)
    }

    fn handle_render_error<R: FrameRenderer + ?Sized>(
        &mut self,
        error: RenderError,
        renderer: &mut R,
    ) -> TickOutcome {
        match error {
            RenderError::SurfaceLost => {
                log::warn!("Surface lost, reconfiguring");
                renderer.resize(renderer.viewport());
                TickOutcome::Dropped
            }
            error if error.is_fatal() => {
                log::error!("{}", error);
                self.stop.stop();
                TickOutcome::Stopped
            }
            error => {
                log::warn!("Dropping frame: {}", error);
                TickOutcome::Dropped
            }
        }
    }
}

/// Collects visible meshes inside the camera frustum and resolves lighting.
///
/// Shadow casters are gathered separately, since a mesh outside the camera's
/// view can still throw a shadow into it.
fn cull(scene: &SceneGraph, frame: &mut FrameState) {
    let frustum = Frustum::from_view_projection(frame.view_projection());

    let mut draws = Vec::new();
    let mut shadow_casters = Vec::new();
    let mut culled = 0;
    let mut lighting = FrameLighting::default();
    let mut has_directional = false;

    for &id in frame.order() {
        if !frame.is_visible(id) {
            continue;
        }

        let (Some(node), Some(world)) = (scene.get(id), frame.world_transform(id)) else {
            continue;
        };

        match &node.kind {
            NodeKind::Mesh(renderable) => {
                let Some(geometry) = scene.geometry(renderable.geometry) else {
                    continue;
                };

                let draw = DrawItem {
                    node: id,
                    geometry: renderable.geometry,
                    world,
                    material: renderable.material,
                };

                if renderable.material.casts_shadow {
                    shadow_casters.push(draw);
                }

                let bounds = geometry.bounds().transform(&world);
                if bounds.intersects_frustum(&frustum) {
                    draws.push(draw);
                } else {
                    culled += 1;
                }
            }
            NodeKind::Light(light @ Light::Directional { target, .. }) => {
                // Only one directional light is shaded
                if !has_directional {
                    let position = world.transform_point3(Vec3::ZERO);
                    let direction = *target - position;
                    lighting.direction = direction.try_normalize().unwrap_or(Vec3::NEG_Y);
                    lighting.directional = light.radiance();
                    lighting.shadow = light.shadow_view_projection(position);
                    has_directional = true;
                }
            }
            NodeKind::Light(light @ Light::Ambient { .. }) => {
                lighting.ambient += light.radiance();
            }
            NodeKind::Group | NodeKind::Camera => {}
        }
    }

    if lighting.shadow.is_none() {
        shadow_casters.clear();
    }

    frame.draws = draws;
    frame.culled = culled;
    frame.shadow_casters = shadow_casters;
    frame.lighting = lighting;
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::frame::Viewport;
    use crate::geometry::primitives;
    use crate::rendering::testing::RecordingRenderer;
    use crate::scene_graph::{Material, Node, NodeId};

    struct TestScene {
        scene: SceneGraph,
        camera: Camera,
        front: NodeId,
        behind: NodeId,
    }

    fn test_scene() -> TestScene {
        let mut scene = SceneGraph::new();
        let cube = scene.add_geometry(primitives::cuboid(1.0, 1.0, 1.0));

        let position = Vec3::new(0.0, 0.0, 5.0);
        let camera_node = Node::camera("camera").with_translation(position);
        let camera_node = scene.add_node(camera_node);
        let camera = Camera::new(camera_node, 60.0, 1.0, 0.1, 100.0);

        let front = scene
            .spawn_mesh("front", cube, Material::from_hex(0xff0000))
            .unwrap();
        let behind = scene
            .spawn_mesh("behind", cube, Material::from_hex(0x00ff00))
            .unwrap();
        scene
            .get_mut(behind)
            .unwrap()
            .transform
            .set_translation(Vec3::new(0.0, 0.0, 20.0));

        TestScene {
            scene,
            camera,
            front,
            behind,
        }
    }

    fn rendered(outcome: TickOutcome) -> FrameStats {
        match outcome {
            TickOutcome::Rendered(stats) => stats,
            other => panic!("expected a rendered frame, got {:?}", other),
        }
    }

    #[test]
    fn tick_submits_visible_meshes_and_presents() {
        let test = test_scene();
        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let mut scheduler = FrameScheduler::new(StopSignal::new(), None);

        let stats = rendered(scheduler.tick(&test.scene, &test.camera, &mut renderer));

        assert_eq!(stats.index, 0);
        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.culled, 1);
        assert_eq!(renderer.presented, 1);
        assert_eq!(renderer.last_frame().draws, vec![test.front]);
        assert!(!renderer.last_frame().draws.contains(&test.behind));
    }

    #[test]
    fn frame_indices_increase() {
        let test = test_scene();
        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let mut scheduler = FrameScheduler::new(StopSignal::new(), None);

        for _ in 0..3 {
            scheduler.tick(&test.scene, &test.camera, &mut renderer);
        }

        let indices: Vec<u64> = renderer.frames.iter().map(|frame| frame.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(scheduler.frames_rendered(), 3);
    }

    #[test]
    fn hidden_meshes_are_not_submitted() {
        let mut test = test_scene();
        let group = test.scene.add_node(Node::group("group"));
        test.scene.add_child(group, test.front).unwrap();
        test.scene.get_mut(group).unwrap().visible = false;

        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let mut scheduler = FrameScheduler::new(StopSignal::new(), None);

        let stats = rendered(scheduler.tick(&test.scene, &test.camera, &mut renderer));

        assert_eq!(stats.drawn, 0);
        assert!(renderer.last_frame().draws.is_empty());
    }

    #[test]
    fn stop_before_tick_renders_nothing() {
        let test = test_scene();
        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let stop = StopSignal::new();
        let mut scheduler = FrameScheduler::new(stop.clone(), None);

        stop.stop();

        assert_eq!(
            scheduler.tick(&test.scene, &test.camera, &mut renderer),
            TickOutcome::Stopped
        );
        assert!(renderer.frames.is_empty());
        assert_eq!(renderer.presented, 0);
    }

    #[test]
    fn stop_during_iteration_lets_the_frame_finish() {
        let test = test_scene();
        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let stop = StopSignal::new();
        let mut scheduler = FrameScheduler::new(stop.clone(), None);

        let submits = Rc::new(Cell::new(0));
        let submits_seen = submits.clone();
        let stop_from_renderer = stop.clone();
        renderer.on_submit = Some(Box::new(move || {
            submits_seen.set(submits_seen.get() + 1);
            stop_from_renderer.stop();
        }));

        let outcome = scheduler.tick(&test.scene, &test.camera, &mut renderer);

        assert!(matches!(outcome, TickOutcome::Rendered(_)));
        assert!(stop.is_stopped());
        assert_eq!(renderer.presented, 1);

        assert_eq!(
            scheduler.tick(&test.scene, &test.camera, &mut renderer),
            TickOutcome::Stopped
        );
        assert_eq!(submits.get(), 1);
        assert_eq!(renderer.presented, 1);
    }

    #[test]
    fn empty_viewport_is_skipped() {
        let test = test_scene();
        let mut renderer = RecordingRenderer::new(Viewport::new(0, 600));
        let mut scheduler = FrameScheduler::new(StopSignal::new(), None);

        assert_eq!(
            scheduler.tick(&test.scene, &test.camera, &mut renderer),
            TickOutcome::Skipped
        );
        assert!(renderer.frames.is_empty());
    }

    #[test]
    fn lost_surface_drops_frame_and_reconfigures() {
        let test = test_scene();
        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        renderer.fail_next_submit = Some(RenderError::SurfaceLost);
        let mut scheduler = FrameScheduler::new(StopSignal::new(), None);

        assert_eq!(
            scheduler.tick(&test.scene, &test.camera, &mut renderer),
            TickOutcome::Dropped
        );
        assert_eq!(renderer.presented, 0);
        assert_eq!(renderer.resizes, vec![Viewport::new(800, 800)]);

        rendered(scheduler.tick(&test.scene, &test.camera, &mut renderer));
        assert_eq!(renderer.presented, 1);
    }

    #[test]
    fn out_of_memory_stops_the_loop() {
        let test = test_scene();
        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        renderer.fail_next_submit = Some(RenderError::OutOfMemory);
        let stop = StopSignal::new();
        let mut scheduler = FrameScheduler::new(stop.clone(), None);

        assert_eq!(
            scheduler.tick(&test.scene, &test.camera, &mut renderer),
            TickOutcome::Stopped
        );
        assert!(stop.is_stopped());
    }

    #[test]
    fn frame_limit_raises_stop_signal() {
        let test = test_scene();
        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let mut scheduler = FrameScheduler::new(StopSignal::new(), Some(2));

        rendered(scheduler.tick(&test.scene, &test.camera, &mut renderer));
        rendered(scheduler.tick(&test.scene, &test.camera, &mut renderer));

        assert_eq!(
            scheduler.tick(&test.scene, &test.camera, &mut renderer),
            TickOutcome::Stopped
        );
        assert_eq!(renderer.frames.len(), 2);
    }

    #[test]
    fn zero_frame_limit_renders_nothing() {
        let test = test_scene();
        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let mut scheduler = FrameScheduler::new(StopSignal::new(), Some(0));

        assert_eq!(
            scheduler.tick(&test.scene, &test.camera, &mut renderer),
            TickOutcome::Stopped
        );
        assert!(renderer.frames.is_empty());
    }

    #[test]
    fn camera_outside_the_scene_stops_the_loop() {
        let test = test_scene();
        let mut other = SceneGraph::new();
        let foreign_node = other.add_node(Node::camera("elsewhere"));
        let camera = Camera::new(foreign_node, 60.0, 1.0, 0.1, 100.0);

        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let stop = StopSignal::new();
        let mut scheduler = FrameScheduler::new(stop.clone(), None);

        assert_eq!(
            scheduler.tick(&test.scene, &camera, &mut renderer),
            TickOutcome::Stopped
        );
        assert!(stop.is_stopped());
        assert!(renderer.frames.is_empty());
    }

    fn add_sun(scene: &mut SceneGraph, casts_shadow: bool) {
        let sun = Light::Directional {
            color: Vec3::ONE,
            intensity: 5.0,
            target: Vec3::ZERO,
            casts_shadow,
        };
        let position = Vec3::new(3.0, 4.0, 5.0);
        let sun = Node::light("sun", sun).with_translation(position);
        scene.add_node(sun);
    }

    fn spawn_caster(test: &mut TestScene, translation: Vec3) -> NodeId {
        let cube = test.scene.add_geometry(primitives::cuboid(1.0, 1.0, 1.0));
        let material = Material::from_hex(0xffffff).with_shadows(true, true);
        let caster = test.scene.spawn_mesh("caster", cube, material).unwrap();
        test.scene
            .get_mut(caster)
            .unwrap()
            .transform
            .set_translation(translation);
        caster
    }

    #[test]
    fn shadow_casters_include_meshes_the_camera_cannot_see() {
        let mut test = test_scene();
        add_sun(&mut test.scene, true);
        let caster = spawn_caster(&mut test, Vec3::new(0.0, 0.0, 20.0));

        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let mut scheduler = FrameScheduler::new(StopSignal::new(), None);

        let stats = rendered(scheduler.tick(&test.scene, &test.camera, &mut renderer));
        let frame = renderer.last_frame();

        assert_eq!(stats.shadow_casters, 1);
        assert_eq!(frame.shadow_casters, vec![caster]);
        assert!(!frame.draws.contains(&caster));
        assert!(frame.shadow.is_some());
    }

    #[test]
    fn hidden_casters_throw_no_shadow() {
        let mut test = test_scene();
        add_sun(&mut test.scene, true);
        let caster = spawn_caster(&mut test, Vec3::ZERO);
        test.scene.get_mut(caster).unwrap().visible = false;

        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let mut scheduler = FrameScheduler::new(StopSignal::new(), None);

        rendered(scheduler.tick(&test.scene, &test.camera, &mut renderer));

        assert!(renderer.last_frame().shadow_casters.is_empty());
    }

    #[test]
    fn light_without_shadows_submits_no_casters() {
        let mut test = test_scene();
        add_sun(&mut test.scene, false);
        spawn_caster(&mut test, Vec3::ZERO);

        let mut renderer = RecordingRenderer::new(Viewport::new(800, 800));
        let mut scheduler = FrameScheduler::new(StopSignal::new(), None);

        rendered(scheduler.tick(&test.scene, &test.camera, &mut renderer));
        let frame = renderer.last_frame();

        assert!(frame.shadow_casters.is_empty());
        assert!(frame.shadow.is_none());
    }

    #[test]
    fn lighting_is_resolved_from_light_nodes() {
        let mut test = test_scene();
        let mut sun = Light::directional(Vec3::ONE, 5.0);
        if let Light::Directional { target, .. } = &mut sun {
            *target = Vec3::ZERO;
        }
        let position = Vec3::new(0.0, 10.0, 0.0);
        let sun = Node::light("sun", sun).with_translation(position);
        test.scene.add_node(sun);
        let ambient = Node::light("ambient", Light::ambient(Vec3::ONE, 0.25));
        test.scene.add_node(ambient);

        let mut frame = FrameState::new(0, Duration::ZERO, Viewport::new(800, 800));
        test.scene.compute_world_transforms(&mut frame);
        cull(&test.scene, &mut frame);

        assert!(frame.lighting.direction.abs_diff_eq(Vec3::NEG_Y, 1e-6));
        assert_eq!(frame.lighting.directional, Vec3::splat(5.0));
        assert_eq!(frame.lighting.ambient, Vec3::splat(0.25));
        assert!(frame.lighting.shadow.is_none());
    }
}
