use glam::{Vec3, Vec4};

/// A plane in Hessian normal form: `normal · p + distance = 0`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Builds a plane from packed `(a, b, c, d)` coefficients, normalizing them.
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        let normal = coefficients.truncate();
        let length = normal.length();

        if length <= f32::EPSILON {
            return Self::new(Vec3::ZERO, 0.0);
        }

        Self::new(normal / length, coefficients.w / length)
    }

    pub fn signed_distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_on_positive_side_have_positive_distance() {
        let plane = Plane::new(Vec3::Z, 0.0);

        let above = plane.signed_distance_to_point(Vec3::new(0.0, 0.0, 2.0));
        let below = plane.signed_distance_to_point(Vec3::new(1.0, 1.0, -2.0));
        assert!(above > 1.99);
        assert!(below < -1.99);
    }

    #[test]
    fn coefficients_are_normalized() {
        let plane = Plane::from_coefficients(Vec4::new(0.0, 2.0, 0.0, -4.0));

        assert!(plane.normal.abs_diff_eq(Vec3::Y, 1e-6));
        assert!((plane.distance + 2.0).abs() < 1e-6);
        let distance = plane.signed_distance_to_point(Vec3::new(5.0, 2.0, 1.0));
        assert!(distance.abs() < 1e-6);
    }
}
