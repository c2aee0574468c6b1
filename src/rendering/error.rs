#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface lost or outdated")]
    SurfaceLost,

    #[error("timed out waiting for the next surface texture")]
    Timeout,

    #[error("out of GPU memory")]
    OutOfMemory,

    #[error("render error: {0}")]
    Other(String),
}

impl RenderError {
    /// Errors after which rendering cannot continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::OutOfMemory)
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(error: wgpu::SurfaceError) -> Self {
        match error {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => RenderError::SurfaceLost,
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::Other(other.to_string()),
        }
    }
}
