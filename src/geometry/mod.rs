use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use id_arena::Id;

use crate::math::bounds::BoundingSphere;

pub mod primitives;
pub mod shape;

pub use shape::{ExtrudeSettings, Shape};

pub type GeometryId = Id<Geometry>;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// An indexed triangle list in local space.
pub struct Geometry {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    bounds: BoundingSphere,
}

impl Geometry {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let bounds = BoundingSphere::from_points(vertices.iter().map(|vertex| vertex.position));

        Self {
            name: name.into(),
            vertices,
            indices,
            bounds,
        }
    }

    pub fn bounds(&self) -> &BoundingSphere {
        &self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
