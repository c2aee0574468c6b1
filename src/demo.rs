use std::f32::consts::FRAC_PI_2;

use anyhow::Context;
use glam::{Quat, Vec3};

use crate::{
    camera::Camera,
    config::ViewerConfig,
    geometry::{primitives, ExtrudeSettings, Geometry, Shape},
    orbit::OrbitControls,
    scene_graph::{Light, Material, Node, NodeId, SceneError, SceneGraph},
};

const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 1.0, 5.0);
const SUN_POSITION: Vec3 = Vec3::new(3.0, 4.0, 5.0);

pub struct DemoState {
    pub scene: SceneGraph,
    pub camera: Camera,
    pub orbit: OrbitControls,
}

impl DemoState {
    pub fn new(config: &ViewerConfig) -> anyhow::Result<Self> {
        let mut scene = SceneGraph::new();

        let camera_node = Node::camera("Camera").with_translation(CAMERA_POSITION);
        let camera_node = scene.add_node(camera_node);
        let aspect = config.initial_width as f32 / config.initial_height.max(1) as f32;
        let camera = Camera::new(
            camera_node,
            config.fov_y_degrees,
            aspect,
            config.near,
            config.far,
        );

        let orbit = OrbitControls::new(CAMERA_POSITION, Vec3::ZERO, config.orbit.clone());
        orbit.apply(&mut scene, camera_node);

        spawn_lights(&mut scene);
        spawn_meshes(&mut scene).context("Failed to build demo meshes")?;

        log::info!("Demo scene has {} nodes", scene.len());

        Ok(Self {
            scene,
            camera,
            orbit,
        })
    }

    /// Runs between frames, before the scheduler resolves transforms.
    pub fn update(&mut self) {
        self.orbit.apply(&mut self.scene, self.camera.node);
    }
}

fn spawn_lights(scene: &mut SceneGraph) {
    let sun = Light::Directional {
        color: Vec3::ONE,
        intensity: 5.0,
        target: Vec3::ZERO,
        casts_shadow: true,
    };
    let sun = Node::light("Directional light", sun).with_translation(SUN_POSITION);
    scene.add_node(sun);

    let ambient = Light::ambient(Vec3::ONE, 0.4);
    scene.add_node(Node::light("Ambient light", ambient));
}

fn star_shape() -> Shape {
    Shape::new()
        .move_to(0.0, 1.0)
        .line_to(0.2, 0.2)
        .line_to(1.0, 0.2)
        .line_to(0.3, -0.2)
        .line_to(0.6, -1.0)
        .line_to(0.0, -0.5)
        .line_to(-0.6, -1.0)
        .line_to(-0.3, -0.2)
        .line_to(-1.0, 0.2)
        .line_to(-0.2, 0.2)
}

fn star_extrusion() -> ExtrudeSettings {
    ExtrudeSettings::new(0.1).with_bevel(0.3, 0.5, 100)
}

fn spawn_mesh(
    scene: &mut SceneGraph,
    name: &str,
    geometry: Geometry,
    material: Material,
    translation: Vec3,
) -> Result<NodeId, SceneError> {
    let geometry = scene.add_geometry(geometry);
    let id = scene.spawn_mesh(name, geometry, material)?;

    if let Some(node) = scene.get_mut(id) {
        node.transform.set_translation(translation);
    }

    Ok(id)
}

fn spawn_meshes(scene: &mut SceneGraph) -> Result<(), SceneError> {
    let shadowed = |hex| Material::from_hex(hex).with_shadows(true, true);

    let floor = spawn_mesh(
        scene,
        "Floor",
        primitives::plane(20.0, 20.0),
        shadowed(0xbbbbbb),
        Vec3::ZERO,
    )?;
    if let Some(node) = scene.get_mut(floor) {
        let rotation = Quat::from_rotation_x(-FRAC_PI_2);
        node.transform.set_rotation(rotation);
    }

    spawn_mesh(
        scene,
        "Box",
        primitives::cuboid(1.0, 1.0, 1.0),
        shadowed(0x897800),
        Vec3::new(0.0, 0.5, 0.0),
    )?;
    spawn_mesh(
        scene,
        "Capsule",
        primitives::capsule(1.0, 2.0, 20, 30),
        shadowed(0xffff00),
        Vec3::new(3.0, 1.75, 0.0),
    )?;
    spawn_mesh(
        scene,
        "Torus",
        primitives::torus(0.5, 0.1, 16, 100),
        shadowed(0x0000ff),
        Vec3::new(0.0, 0.5, 1.0),
    )?;
    spawn_mesh(
        scene,
        "Cylinder",
        primitives::cylinder(1.0, 1.0, 2.0, 32),
        shadowed(0x00ff00),
        Vec3::new(-3.0, 1.0, 0.0),
    )?;
    spawn_mesh(
        scene,
        "Star",
        star_shape().to_geometry(),
        Material::from_hex(0xff00ff),
        Vec3::new(0.0, 1.0, 2.0),
    )?;
    spawn_mesh(
        scene,
        "Extruded star",
        star_shape().extrude(&star_extrusion()),
        shadowed(0x0ddaaf),
        Vec3::new(2.0, 1.5, 3.0),
    )?;
    spawn_mesh(
        scene,
        "Sphere",
        primitives::sphere(1.0, 32, 32),
        Material::from_hex(0x98daaf),
        Vec3::new(0.0, 1.0, -3.0),
    )?;

    Ok(())
}
