use glam::{Mat4, Vec3};

use crate::math::frustum::Frustum;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere around the center of the points' axis-aligned bounds.
    pub fn from_points(points: impl Iterator<Item = Vec3> + Clone) -> BoundingSphere {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);

        for point in points.clone() {
            min = min.min(point);
            max = max.max(point);
        }

        if min.x > max.x {
            return BoundingSphere {
                center: Vec3::ZERO,
                radius: 0.0,
            };
        }

        let center = (min + max) * 0.5;
        let radius = points
            .map(|point| point.distance(center))
            .fold(0.0, f32::max);

        BoundingSphere { center, radius }
    }

    pub fn transform(&self, matrix: &Mat4) -> BoundingSphere {
        let center = matrix.transform_point3(self.center);
        let scale = matrix.to_scale_rotation_translation().0.abs();
        let radius = self.radius * scale.max_element();
        BoundingSphere { center, radius }
    }

    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum
            .planes
            .iter()
            .all(|plane| plane.signed_distance_to_point(self.center) >= -self.radius)
    }
}
