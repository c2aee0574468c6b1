use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct OrbitConfig {
    /// Radians of rotation per pixel dragged.
    pub rotate_speed: f32,
    /// Radius multiplier per scroll line.
    pub zoom_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_factor: 0.95,
            min_distance: 0.5,
            max_distance: 50.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub window_title: String,
    pub initial_width: u32,
    pub initial_height: u32,
    pub clear_color: [f64; 3],
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub vsync: bool,
    /// Width and height of the directional light's shadow map, in texels.
    pub shadow_map_size: u32,
    /// Stop after this many rendered frames.
    pub frame_limit: Option<u64>,
    pub orbit: OrbitConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_title: "Scene viewer".to_string(),
            initial_width: 1280,
            initial_height: 720,
            clear_color: [0.0, 0.0, 0.0],
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 100.0,
            vsync: true,
            shadow_map_size: 2048,
            frame_limit: None,
            orbit: OrbitConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Defaults overridden by `VIEWER_FRAME_LIMIT` and `VIEWER_VSYNC`.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = env::var("VIEWER_FRAME_LIMIT") {
            config.frame_limit = Some(parse_frame_limit(&value)?);
        }

        if let Ok(value) = env::var("VIEWER_VSYNC") {
            config.vsync = parse_flag(&value)
                .with_context(|| format!("Invalid VIEWER_VSYNC '{}'", value))?;
        }

        Ok(config)
    }
}

fn parse_frame_limit(value: &str) -> anyhow::Result<u64> {
    let limit: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid VIEWER_FRAME_LIMIT '{}'", value))?;
    anyhow::ensure!(limit > 0, "VIEWER_FRAME_LIMIT must be at least 1");

    Ok(limit)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
