use glam::Mat4;

use crate::math::plane::Plane;

#[derive(Debug, Copy, Clone)]
pub struct Frustum {
    // Planes are in the order: left, right, bottom, top, near, far
    // Normals point into the frustum.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the clip planes of a view-projection matrix with a `[0, 1]` depth range.
    pub fn from_view_projection(view_projection: Mat4) -> Frustum {
        let row0 = view_projection.row(0);
        let row1 = view_projection.row(1);
        let row2 = view_projection.row(2);
        let row3 = view_projection.row(3);

        let planes = [
            // Left
            Plane::from_coefficients(row3 + row0),
            // Right
            Plane::from_coefficients(row3 - row0),
            // Bottom
            Plane::from_coefficients(row3 + row1),
            // Top
            Plane::from_coefficients(row3 - row1),
            // Near
            Plane::from_coefficients(row2),
            // Far
            Plane::from_coefficients(row3 - row2),
        ];

        Frustum { planes }
    }
}
