use std::collections::HashMap;

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;
use wgpu::{DepthBiasState, MultisampleState, PipelineCompilationOptions, StencilState};

use crate::frame::FrameState;
use crate::geometry::GeometryId;
use crate::rendering::{
    gpu_mesh::{GpuMesh, GPU_MESH_VBL},
    texture::{ShadowMap, DEPTH_FORMAT},
    uniforms::{DrawUniformBuffer, ShadowUniform},
};

const SHADOW_SHADER: &str = include_str!("shaders/shadow.wgsl");

/// Depth-only pass rendering shadow casters from the directional light.
pub struct ShadowPass {
    pipeline: wgpu::RenderPipeline,
    shadow_buffer: wgpu::Buffer,
    shadow_bind_group: wgpu::BindGroup,
    draw_uniforms: DrawUniformBuffer,
}

impl ShadowPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let shadow_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shadow uniform buffer"),
            contents: bytemuck::cast_slice(&[ShadowUniform::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let light_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow bind group"),
            layout: &light_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shadow_buffer.as_entire_binding(),
            }],
        });

        let draw_uniforms = DrawUniformBuffer::new(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow pipeline layout"),
            bind_group_layouts: &[&light_bind_group_layout, draw_uniforms.bind_group_layout()],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow shader"),
            source: wgpu::ShaderSource::Wgsl(SHADOW_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow render pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GPU_MESH_VBL],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: None,
            // Flat shapes cast shadows from either side
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: StencilState::default(),
                bias: DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            shadow_buffer,
            shadow_bind_group,
            draw_uniforms,
        }
    }

    /// Uploads the light's view-projection and the casters' model data.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: &FrameState) {
        if frame.lighting.shadow.is_none() {
            return;
        }

        queue.write_buffer(
            &self.shadow_buffer,
            0,
            bytemuck::cast_slice(&[ShadowUniform::from_frame(frame)]),
        );
        self.draw_uniforms
            .update(device, queue, &frame.shadow_casters);
    }

    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        shadow_map: &ShadowMap,
        frame: &FrameState,
        meshes: &HashMap<GeometryId, GpuMesh>,
    ) {
        if frame.lighting.shadow.is_none() {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: shadow_map.view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.shadow_bind_group, &[]);

        for (i, caster) in frame.shadow_casters.iter().enumerate() {
            let Some(mesh) = meshes.get(&caster.geometry) else {
                continue;
            };

            if mesh.num_indices == 0 {
                continue;
            }

            render_pass.set_bind_group(
                1,
                self.draw_uniforms.bind_group(),
                &[self.draw_uniforms.offset(i)],
            );
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
        }
    }
}
