//! Procedural primitive meshes.
//!
//! Conventions: +Y is up, triangles wind counter-clockwise when seen from the
//! side their normals face, and every primitive is centered on the origin.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Vec2, Vec3};

use crate::geometry::{Geometry, Vertex};

const DEGENERATE_RADIUS: f32 = 1e-6;

/// Flat rectangle in the XY plane facing +Z.
pub fn plane(width: f32, height: f32) -> Geometry {
    let (half_width, half_height) = (width * 0.5, height * 0.5);

    let vertices = [
        Vec3::new(-half_width, -half_height, 0.0),
        Vec3::new(half_width, -half_height, 0.0),
        Vec3::new(half_width, half_height, 0.0),
        Vec3::new(-half_width, half_height, 0.0),
    ]
    .map(|position| Vertex::new(position, Vec3::Z))
    .to_vec();

    Geometry::new("Plane", vertices, vec![0, 1, 2, 0, 2, 3])
}

pub fn cuboid(width: f32, height: f32, depth: f32) -> Geometry {
    let half = Vec3::new(width, height, depth) * 0.5;

    // (normal, u, v) with u × v = normal
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in faces {
        let base = vertices.len() as u32;

        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = (normal + u * su + v * sv) * half;
            vertices.push(Vertex::new(position, normal));
        }

        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Geometry::new("Box", vertices, indices)
}

pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let height_segments = height_segments.max(2);

    let profile = (0..=height_segments)
        .map(|i| {
            let angle = -FRAC_PI_2 + PI * i as f32 / height_segments as f32;
            ProfilePoint::on_arc(Vec2::ZERO, radius, angle)
        })
        .collect::<Vec<_>>();

    lathe("Sphere", &[profile], width_segments)
}

pub fn cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> Geometry {
    let half_height = height * 0.5;
    let side_normal = Vec2::new(height, radius_bottom - radius_top).normalize_or_zero();

    let bottom_cap = vec![
        ProfilePoint::new(0.0, -half_height, Vec2::NEG_Y),
        ProfilePoint::new(radius_bottom, -half_height, Vec2::NEG_Y),
    ];
    let side = vec![
        ProfilePoint::new(radius_bottom, -half_height, side_normal),
        ProfilePoint::new(radius_top, half_height, side_normal),
    ];
    let top_cap = vec![
        ProfilePoint::new(radius_top, half_height, Vec2::Y),
        ProfilePoint::new(0.0, half_height, Vec2::Y),
    ];

    lathe("Cylinder", &[bottom_cap, side, top_cap], radial_segments)
}

/// A cylinder of `length` with hemispherical caps; total height is `length + 2 * radius`.
pub fn capsule(radius: f32, length: f32, cap_segments: u32, radial_segments: u32) -> Geometry {
    let cap_segments = cap_segments.max(1);
    let half_length = length * 0.5;

    let bottom = (0..=cap_segments).map(|i| {
        let angle = -FRAC_PI_2 + FRAC_PI_2 * i as f32 / cap_segments as f32;
        ProfilePoint::on_arc(Vec2::new(0.0, -half_length), radius, angle)
    });
    let top = (0..=cap_segments).map(|i| {
        let angle = FRAC_PI_2 * i as f32 / cap_segments as f32;
        ProfilePoint::on_arc(Vec2::new(0.0, half_length), radius, angle)
    });

    lathe("Capsule", &[bottom.chain(top).collect()], radial_segments)
}

/// A ring around the Z axis with major radius `radius` and minor radius `tube`.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Geometry {
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);
    let columns = tubular_segments + 1;

    let mut vertices = Vec::with_capacity(((radial_segments + 1) * columns) as usize);
    let mut indices = Vec::with_capacity((radial_segments * tubular_segments * 6) as usize);

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        let (sin_v, cos_v) = v.sin_cos();

        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let (sin_u, cos_u) = u.sin_cos();

            let ring = radius + tube * cos_v;
            let position = Vec3::new(ring * cos_u, ring * sin_u, tube * sin_v);
            let normal = Vec3::new(cos_v * cos_u, cos_v * sin_u, sin_v);
            vertices.push(Vertex::new(position, normal));
        }
    }

    for j in 0..radial_segments {
        for i in 0..tubular_segments {
            let a = j * columns + i;
            let b = a + 1;
            let c = b + columns;
            let d = a + columns;
            indices.extend([a, b, c, a, c, d]);
        }
    }

    Geometry::new("Torus", vertices, indices)
}

/// A point of a lathe profile: distance from the Y axis, height, and the
/// outward normal within the profile plane (x = radial, y = up).
#[derive(Debug, Clone, Copy)]
struct ProfilePoint {
    radius: f32,
    y: f32,
    normal: Vec2,
}

impl ProfilePoint {
    fn new(radius: f32, y: f32, normal: Vec2) -> Self {
        Self { radius, y, normal }
    }

    fn on_arc(center: Vec2, radius: f32, angle: f32) -> Self {
        let normal = Vec2::from_angle(angle);
        let point = center + normal * radius;
        Self::new(point.x.max(0.0), point.y, normal)
    }
}

/// Revolves each profile strip around the Y axis. Strips are kept apart so
/// that hard edges (cylinder rims) get separate normals.
fn lathe(name: &str, strips: &[Vec<ProfilePoint>], segments: u32) -> Geometry {
    let segments = segments.max(3);
    let columns = segments + 1;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for strip in strips {
        let base = vertices.len() as u32;

        for point in strip {
            for s in 0..=segments {
                let theta = s as f32 / segments as f32 * TAU;
                let (sin, cos) = theta.sin_cos();

                let position = Vec3::new(point.radius * sin, point.y, point.radius * cos);
                let normal = Vec3::new(point.normal.x * sin, point.normal.y, point.normal.x * cos);
                vertices.push(Vertex::new(position, normal.normalize()));
            }
        }

        for (row, pair) in strip.windows(2).enumerate() {
            let (lower, upper) = (pair[0], pair[1]);

            for s in 0..segments {
                let a = base + row as u32 * columns + s;
                let b = a + 1;
                let c = b + columns;
                let d = a + columns;

                // Rows collapsed onto the axis would only produce slivers
                if lower.radius > DEGENERATE_RADIUS {
                    indices.extend([a, b, c]);
                }
                if upper.radius > DEGENERATE_RADIUS {
                    indices.extend([a, c, d]);
                }
            }
        }
    }

    Geometry::new(name, vertices, indices)
}
