use glam::{Mat3, Mat4, Quat, Vec3};

/// Local transform of a node, relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Rotates so that local -Z points from the current translation towards `target`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        if target.abs_diff_eq(self.translation, f32::EPSILON) {
            return;
        }

        let view = Mat4::look_at_rh(self.translation, target, up);
        let rotation = Mat3::from_mat4(view).transpose();
        self.rotation = Quat::from_mat3(&rotation).normalize();
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(translation: Vec3) -> Transform {
        let mut transform = Transform::IDENTITY;
        transform.set_translation(translation);
        transform
    }

    #[test]
    fn identity_has_identity_matrix() {
        assert_eq!(Transform::default().local_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn local_matrix_applies_scale_then_rotation_then_translation() {
        let mut transform = at(Vec3::new(1.0, 0.0, 0.0));
        transform.set_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        transform.set_scale(Vec3::splat(2.0));

        let point = transform.local_matrix().transform_point3(Vec3::X);
        assert!(point.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn look_at_points_negative_z_at_target() {
        let mut transform = at(Vec3::new(0.0, 1.0, 5.0));
        transform.look_at(Vec3::ZERO, Vec3::Y);

        let forward = transform.rotation() * Vec3::NEG_Z;
        let expected = (Vec3::ZERO - Vec3::new(0.0, 1.0, 5.0)).normalize();
        assert!(forward.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn look_at_own_position_keeps_rotation() {
        let mut transform = at(Vec3::ONE);
        transform.look_at(Vec3::ONE, Vec3::Y);
        assert_eq!(transform.rotation(), Quat::IDENTITY);
    }
}
