use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use wgpu::CommandEncoderDescriptor;
use winit::window::Window;

use crate::{
    config::ViewerConfig,
    frame::{FrameState, Viewport},
    geometry::GeometryId,
    rendering::{
        gpu_mesh::GpuMesh,
        scene_pass::{ScenePass, SceneTextureViews},
        shadow_pass::ShadowPass,
        texture::{DepthTexture, ShadowMap},
        FrameRenderer, RenderError,
    },
    scene_graph::SceneGraph,
};

/// Draws frames into a window surface with wgpu.
pub struct Renderer {
    pub window: Arc<Window>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,

    depth_texture: DepthTexture,
    shadow_map: ShadowMap,
    shadow_pass: ShadowPass,
    scene_pass: ScenePass,
    meshes: HashMap<GeometryId, GpuMesh>,
    clear_color: wgpu::Color,

    pending_output: Option<wgpu::SurfaceTexture>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, config: &ViewerConfig) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No compatible graphics adapter")?;

        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("Surface reports no supported formats")?;

        let present_mode = if config.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_texture = DepthTexture::new(&device, Viewport::from(size), "Depth Texture");
        let shadow_map = ShadowMap::new(&device, config.shadow_map_size);
        let shadow_pass = ShadowPass::new(&device);
        let scene_pass = ScenePass::new(&device, surface_format, &shadow_map);

        let [r, g, b] = config.clear_color;

        Ok(Self {
            window,
            surface,
            device,
            queue,
            surface_config,
            depth_texture,
            shadow_map,
            shadow_pass,
            scene_pass,
            meshes: HashMap::new(),
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
            pending_output: None,
        })
    }

    /// Uploads geometry the first time a draw or shadow caster references it.
    fn upload_meshes(&mut self, scene: &SceneGraph, frame: &FrameState) {
        for draw in frame.draws.iter().chain(&frame.shadow_casters) {
            if let Entry::Vacant(entry) = self.meshes.entry(draw.geometry) {
                if let Some(geometry) = scene.geometry(draw.geometry) {
                    log::debug!(
                        "Uploading geometry {} ({} triangles)",
                        geometry.name,
                        geometry.triangle_count()
                    );
                    entry.insert(GpuMesh::from_geometry(&self.device, geometry));
                }
            }
        }
    }
}

impl FrameRenderer for Renderer {
    fn viewport(&self) -> Viewport {
        Viewport::from(self.window.inner_size())
    }

    fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }

        self.surface_config.width = viewport.width;
        self.surface_config.height = viewport.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_texture.resize(&self.device, viewport);
    }

    fn submit(&mut self, scene: &SceneGraph, frame: &FrameState) -> Result<(), RenderError> {
        self.upload_meshes(scene, frame);
        self.shadow_pass.prepare(&self.device, &self.queue, frame);
        self.scene_pass.prepare(&self.device, &self.queue, frame);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.shadow_pass
            .render(&mut encoder, &self.shadow_map, frame, &self.meshes);
        self.scene_pass.render(
            &mut encoder,
            &SceneTextureViews {
                color: &view,
                depth: self.depth_texture.view(),
            },
            self.clear_color,
            frame,
            &self.meshes,
        );

        self.queue.submit([encoder.finish()]);
        self.pending_output = Some(output);

        Ok(())
    }

    fn present(&mut self) {
        if let Some(output) = self.pending_output.take() {
            self.window.pre_present_notify();
            output.present();
        }
    }
}
