use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::frame::{DrawItem, FrameState};

// Light-space depth offset that keeps lit surfaces from shadowing themselves
const SHADOW_DEPTH_BIAS: f32 = 0.0001;

fn flag(value: bool) -> f32 {
    f32::from(u8::from(value))
}

/// Per-frame camera and lighting data (must match `SceneUniform` in WGSL).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SceneUniform {
    view_proj: Mat4,
    light_view_proj: Mat4,
    light_direction: Vec4,
    light_color: Vec4,
    ambient_color: Vec4,
    /// x: shadows enabled, y: depth bias
    shadow: Vec4,
}

impl SceneUniform {
    pub fn from_frame(frame: &FrameState) -> Self {
        let lighting = &frame.lighting;
        let shadows_enabled = flag(lighting.shadow.is_some());

        Self {
            view_proj: frame.view_projection(),
            light_view_proj: lighting.shadow.unwrap_or(Mat4::IDENTITY),
            light_direction: lighting.direction.extend(0.0),
            light_color: lighting.directional.extend(1.0),
            ambient_color: lighting.ambient.extend(1.0),
            shadow: Vec4::new(shadows_enabled, SHADOW_DEPTH_BIAS, 0.0, 0.0),
        }
    }
}

/// Light view-projection used while rendering the shadow map.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ShadowUniform {
    light_view_proj: Mat4,
}

impl ShadowUniform {
    pub fn from_frame(frame: &FrameState) -> Self {
        Self {
            light_view_proj: frame.lighting.shadow.unwrap_or(Mat4::IDENTITY),
        }
    }
}

/// Per-draw model data (must match `DrawUniform` in WGSL).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct DrawUniform {
    model: Mat4,
    normal_matrix: Mat4,
    color: Vec4,
    /// x: receives shadows
    flags: Vec4,
}

impl DrawUniform {
    pub fn from_draw(draw: &DrawItem) -> Self {
        Self {
            model: draw.world,
            normal_matrix: normal_matrix(draw.world),
            color: draw.material.color.extend(1.0),
            flags: Vec4::new(flag(draw.material.receives_shadow), 0.0, 0.0, 0.0),
        }
    }
}

fn normal_matrix(world: Mat4) -> Mat4 {
    if world.determinant().abs() <= f32::EPSILON {
        return Mat4::IDENTITY;
    }
    world.inverse().transpose()
}

/// Per-draw uniforms packed into one buffer and selected with dynamic offsets.
pub struct DrawUniformBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    bind_group_layout: wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
    staging: Vec<u8>,
}

impl DrawUniformBuffer {
    const INITIAL_CAPACITY: usize = 64;

    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw uniform bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(size_of::<DrawUniform>() as u64),
                },
                count: None,
            }],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = (size_of::<DrawUniform>() as u64).next_multiple_of(alignment);

        let (buffer, bind_group) =
            Self::create_buffer(device, &bind_group_layout, stride, Self::INITIAL_CAPACITY);

        Self {
            buffer,
            bind_group,
            bind_group_layout,
            stride,
            capacity: Self::INITIAL_CAPACITY,
            staging: Vec::new(),
        }
    }

    fn create_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw uniform buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw uniform bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<DrawUniform>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn offset(&self, draw_index: usize) -> wgpu::DynamicOffset {
        (draw_index as u64 * self.stride) as wgpu::DynamicOffset
    }

    pub fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, draws: &[DrawItem]) {
        if draws.is_empty() {
            return;
        }

        if draws.len() > self.capacity {
            let capacity = draws.len().next_power_of_two();
            log::debug!("Growing draw uniform buffer to {} entries", capacity);

            let (buffer, bind_group) =
                Self::create_buffer(device, &self.bind_group_layout, self.stride, capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
        }

        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(draws.len() * stride, 0);

        for (i, draw) in draws.iter().enumerate() {
            let uniform = DrawUniform::from_draw(draw);
            let bytes = bytemuck::bytes_of(&uniform);
            self.staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }

        queue.write_buffer(&self.buffer, 0, &self.staging);
    }
}
