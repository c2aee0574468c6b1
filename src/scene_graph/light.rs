use glam::{Mat4, Vec3};

// Orthographic shadow volume, centred on the light's line of sight
const SHADOW_HALF_EXTENT: f32 = 5.0;
const SHADOW_NEAR: f32 = 0.5;
const SHADOW_FAR: f32 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Parallel light shining from the node's world position towards `target`.
    Directional {
        color: Vec3,
        intensity: f32,
        target: Vec3,
        casts_shadow: bool,
    },
    Ambient {
        color: Vec3,
        intensity: f32,
    },
}

impl Light {
    pub fn directional(color: Vec3, intensity: f32) -> Self {
        Light::Directional {
            color,
            intensity,
            target: Vec3::ZERO,
            casts_shadow: false,
        }
    }

    pub fn ambient(color: Vec3, intensity: f32) -> Self {
        Light::Ambient { color, intensity }
    }

    /// Color premultiplied by intensity.
    pub fn radiance(&self) -> Vec3 {
        match *self {
            Light::Directional {
                color, intensity, ..
            }
            | Light::Ambient { color, intensity } => color * intensity,
        }
    }

    /// View-projection of the shadow map seen from a light at `position`.
    ///
    /// `None` unless this is a directional light that casts shadows.
    pub fn shadow_view_projection(&self, position: Vec3) -> Option<Mat4> {
        let Light::Directional {
            target,
            casts_shadow: true,
            ..
        } = *self
        else {
            return None;
        };

        let direction = (target - position).try_normalize()?;
        let up = if direction.y.abs() > 0.99 {
            Vec3::Z
        } else {
            Vec3::Y
        };

        let view = Mat4::look_at_rh(position, target, up);
        let projection = Mat4::orthographic_rh(
            -SHADOW_HALF_EXTENT,
            SHADOW_HALF_EXTENT,
            -SHADOW_HALF_EXTENT,
            SHADOW_HALF_EXTENT,
            SHADOW_NEAR,
            SHADOW_FAR,
        );

        Some(projection * view)
    }
}

/// Converts an sRGB `0xRRGGBB` color to linear RGB.
pub fn color_from_hex(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}
