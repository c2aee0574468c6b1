use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};

use crate::geometry::{Geometry, Vertex};

/// A closed 2D outline in the XY plane.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    points: Vec<Vec2>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the outline over at `(x, y)`. Only a single outline is kept.
    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        self.points.clear();
        self.points.push(Vec2::new(x, y));
        self
    }

    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        let point = Vec2::new(x, y);
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
        self
    }

    /// Outline points in counter-clockwise order, without a repeated closing point.
    pub fn outline(&self) -> Vec<Vec2> {
        let mut points = self.points.clone();

        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        if signed_area(&points) < 0.0 {
            points.reverse();
        }

        points
    }

    /// Flat geometry filling the outline, facing +Z.
    pub fn to_geometry(&self) -> Geometry {
        let outline = self.outline();
        let vertices = outline
            .iter()
            .map(|point| Vertex::new(point.extend(0.0), Vec3::Z))
            .collect();

        Geometry::new("Shape", vertices, triangulate(&outline))
    }

    /// Extrudes the outline from z = 0 to z = `settings.depth` with capped
    /// ends, optionally rounding the rims with a bevel.
    ///
    /// A bevel grows the solid by `thickness` past both ends and by `size`
    /// outwards around the outline. The caps keep the outline's own size.
    pub fn extrude(&self, settings: &ExtrudeSettings) -> Geometry {
        let outline = self.outline();
        let directions = bevel_directions(&outline);
        let rings = settings.rings();
        let cap = triangulate(&outline);
        let count = outline.len() as u32;

        let back_z = rings.first().map_or(0.0, |ring| ring.z);
        let front_z = rings.last().map_or(settings.depth, |ring| ring.z);

        let mut vertices = Vec::with_capacity(outline.len() * (2 + (rings.len() - 1) * 4));
        let mut indices = Vec::with_capacity(cap.len() * 2 + outline.len() * rings.len() * 6);

        // Back cap faces -Z, so its winding is flipped
        vertices.extend(
            outline
                .iter()
                .map(|point| Vertex::new(point.extend(back_z), Vec3::NEG_Z)),
        );
        let flipped = cap.chunks_exact(3).flat_map(|t| [t[0], t[2], t[1]]);
        indices.extend(flipped);

        vertices.extend(
            outline
                .iter()
                .map(|point| Vertex::new(point.extend(front_z), Vec3::Z)),
        );
        indices.extend(cap.iter().map(|index| index + count));

        // Side walls get their own vertices for flat shading
        let ring_point = |ring: &Ring, i: usize| {
            let point = outline[i] + directions[i] * ring.offset;
            point.extend(ring.z)
        };

        for band in rings.windows(2) {
            for i in 0..outline.len() {
                let next = (i + 1) % outline.len();
                let corners = [
                    ring_point(&band[0], i),
                    ring_point(&band[0], next),
                    ring_point(&band[1], next),
                    ring_point(&band[1], i),
                ];

                let along = corners[1] - corners[0];
                let across = corners[2] - corners[0];
                let Some(normal) = along.cross(across).try_normalize() else {
                    continue;
                };

                let base = vertices.len() as u32;
                vertices.extend(corners.map(|corner| Vertex::new(corner, normal)));
                indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
            }
        }

        Geometry::new("Extrusion", vertices, indices)
    }
}

/// Rounded rim added around an extrusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bevel {
    /// How far the bevel reaches past each end along Z.
    pub thickness: f32,
    /// How far the bevel pushes the walls out from the outline.
    pub size: f32,
    pub segments: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeSettings {
    pub depth: f32,
    pub bevel: Option<Bevel>,
}

impl ExtrudeSettings {
    pub fn new(depth: f32) -> Self {
        Self { depth, bevel: None }
    }

    pub fn with_bevel(mut self, thickness: f32, size: f32, segments: u32) -> Self {
        self.bevel = Some(Bevel {
            thickness,
            size,
            segments: segments.max(1),
        });
        self
    }

    /// Cross sections of the side wall from back to front.
    fn rings(&self) -> Vec<Ring> {
        let Some(bevel) = self.bevel else {
            return vec![Ring::new(0.0, 0.0), Ring::new(0.0, self.depth)];
        };

        // Quarter circle from the cap rim out to the full bevel size
        let profile = |segment: u32| {
            let angle = segment as f32 / bevel.segments as f32 * FRAC_PI_2;
            (bevel.size * angle.sin(), bevel.thickness * angle.cos())
        };

        let back = (0..bevel.segments).map(|segment| {
            let (offset, z) = profile(segment);
            Ring::new(offset, -z)
        });
        let front = (0..bevel.segments).rev().map(|segment| {
            let (offset, z) = profile(segment);
            Ring::new(offset, self.depth + z)
        });

        let wall = [0.0, self.depth].map(|z| Ring::new(bevel.size, z));
        back.chain(wall).chain(front).collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct Ring {
    offset: f32,
    z: f32,
}

impl Ring {
    fn new(offset: f32, z: f32) -> Self {
        Self { offset, z }
    }
}

fn edge_normal(edge: Vec2) -> Vec2 {
    Vec2::new(edge.y, -edge.x).normalize_or_zero()
}

/// Per-point offsets that move each outline edge outwards by one unit.
fn bevel_directions(outline: &[Vec2]) -> Vec<Vec2> {
    let len = outline.len();

    (0..len)
        .map(|i| {
            let previous = outline[(i + len - 1) % len];
            let current = outline[i];
            let next = outline[(i + 1) % len];

            let before = edge_normal(current - previous);
            let after = edge_normal(next - current);

            let Some(miter) = (before + after).try_normalize() else {
                return before;
            };

            let cos_half_angle = miter.dot(before);
            if cos_half_angle <= f32::EPSILON {
                before
            } else {
                miter / cos_half_angle
            }
        })
        .collect()
}

fn signed_area(points: &[Vec2]) -> f32 {
    let mut area = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        area += a.perp_dot(b);
    }
    area * 0.5
}

fn point_in_triangle(point: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(point - a);
    let d2 = (c - b).perp_dot(point - b);
    let d3 = (a - c).perp_dot(point - c);
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}

/// Ear-clipping triangulation of a simple counter-clockwise polygon.
fn triangulate(points: &[Vec2]) -> Vec<u32> {
    if points.len() < 3 {
        return Vec::new();
    }

    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut indices = Vec::with_capacity((points.len() - 2) * 3);

    while remaining.len() > 3 {
        let len = remaining.len();

        let ear = (0..len).find(|&i| {
            let prev = remaining[(i + len - 1) % len];
            let current = remaining[i];
            let next = remaining[(i + 1) % len];
            let (a, b, c) = (points[prev], points[current], points[next]);

            if (b - a).perp_dot(c - b) <= f32::EPSILON {
                return false;
            }

            !remaining.iter().any(|&other| {
                other != prev
                    && other != current
                    && other != next
                    && point_in_triangle(points[other], a, b, c)
            })
        });

        let Some(i) = ear else {
            log::warn!("Polygon is not simple, falling back to a triangle fan");
            break;
        };

        let prev = remaining[(i + len - 1) % len];
        let next = remaining[(i + 1) % len];
        indices.extend([prev as u32, remaining[i] as u32, next as u32]);
        remaining.remove(i);
    }

    for i in 1..remaining.len() - 1 {
        indices.extend([
            remaining[0] as u32,
            remaining[i] as u32,
            remaining[i + 1] as u32,
        ]);
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::test_util::assert_well_formed;

    fn star() -> Shape {
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

    fn triangle_area(geometry: &Geometry, triangle: &[u32]) -> f32 {
        let [a, b, c] = [0, 1, 2].map(|k| geometry.vertices[triangle[k] as usize].position);
        (b - a).cross(c - a).z * 0.5
    }

    #[test]
    fn outline_is_counter_clockwise() {
        let clockwise = Shape::new()
            .move_to(0.0, 0.0)
            .line_to(0.0, 1.0)
            .line_to(1.0, 1.0)
            .line_to(1.0, 0.0);

        assert!(signed_area(&clockwise.outline()) > 0.0);
    }

    #[test]
    fn closing_point_is_dropped() {
        let shape = Shape::new()
            .move_to(0.0, 0.0)
            .line_to(1.0, 0.0)
            .line_to(0.0, 1.0)
            .line_to(0.0, 0.0);

        assert_eq!(shape.outline().len(), 3);
    }

    #[test]
    fn star_triangulation_covers_polygon_area() {
        let shape = star();
        let geometry = shape.to_geometry();
        assert_well_formed(&geometry);

        // A simple polygon with n vertices always splits into n - 2 triangles
        assert_eq!(geometry.triangle_count(), 8);

        let total: f32 = geometry
            .indices
            .chunks_exact(3)
            .map(|triangle| {
                let area = triangle_area(&geometry, triangle);
                assert!(area > -1e-6, "triangle wound clockwise");
                area
            })
            .sum();

        assert!((total - signed_area(&shape.outline())).abs() < 1e-4);
    }

    #[test]
    fn extrusion_spans_depth() {
        let geometry = star().extrude(&ExtrudeSettings::new(0.1));
        assert_well_formed(&geometry);

        let outline_len = star().outline().len();
        assert_eq!(geometry.vertices.len(), outline_len * 2 + outline_len * 4);
        assert_eq!(
            geometry.triangle_count(),
            (outline_len - 2) * 2 + outline_len * 2
        );

        for vertex in &geometry.vertices {
            assert!(vertex.position.z >= 0.0 && vertex.position.z <= 0.1 + 1e-6);
        }
    }

    #[test]
    fn side_walls_face_outwards() {
        let square = Shape::new()
            .move_to(-1.0, -1.0)
            .line_to(1.0, -1.0)
            .line_to(1.0, 1.0)
            .line_to(-1.0, 1.0);
        let geometry = square.extrude(&ExtrudeSettings::new(1.0));

        for vertex in &geometry.vertices[8..] {
            let outwards = vertex.position.truncate().dot(vertex.normal.truncate());
            assert!(
                outwards > 0.0,
                "wall normal {:?} points inwards",
                vertex.normal
            );
        }
    }

    #[test]
    fn bevel_extends_past_outline() {
        let settings = ExtrudeSettings::new(0.1).with_bevel(0.3, 0.5, 8);
        let geometry = star().extrude(&settings);
        assert_well_formed(&geometry);

        let outline_reach = star()
            .outline()
            .iter()
            .map(|point| point.x.abs())
            .fold(0.0, f32::max);
        let bevel_reach = geometry
            .vertices
            .iter()
            .map(|vertex| vertex.position.x.abs())
            .fold(0.0, f32::max);
        assert!(bevel_reach >= outline_reach + 0.5 - 1e-4);

        let min_z = geometry
            .vertices
            .iter()
            .map(|vertex| vertex.position.z)
            .fold(f32::MAX, f32::min);
        let max_z = geometry
            .vertices
            .iter()
            .map(|vertex| vertex.position.z)
            .fold(f32::MIN, f32::max);
        assert!((min_z + 0.3).abs() < 1e-5);
        assert!((max_z - 0.4).abs() < 1e-5);
    }

    #[test]
    fn bevel_rings_round_from_cap_to_wall() {
        let settings = ExtrudeSettings::new(1.0).with_bevel(0.2, 0.1, 4);
        let rings = settings.rings();

        // Four back segments, two body rings, four front segments
        assert_eq!(rings.len(), 10);
        assert_eq!(rings[0].offset, 0.0);
        assert!((rings[0].z + 0.2).abs() < 1e-6);
        assert!(rings.windows(2).all(|pair| pair[0].z <= pair[1].z));
        assert!((rings[9].z - 1.2).abs() < 1e-6);
        assert!(rings[4..6].iter().all(|ring| ring.offset == 0.1));
    }

    #[test]
    fn degenerate_shapes_produce_no_triangles() {
        let line = Shape::new().move_to(0.0, 0.0).line_to(1.0, 0.0);
        assert!(triangulate(&line.outline()).is_empty());
    }
}
