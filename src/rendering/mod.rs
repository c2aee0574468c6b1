pub mod error;
pub mod gpu_mesh;
pub mod renderer;
pub mod scene_pass;
pub mod shadow_pass;
pub mod texture;
pub mod uniforms;

pub use error::RenderError;

use crate::{frame::FrameState, frame::Viewport, scene_graph::SceneGraph};

/// The drawing backend driven by [`crate::scheduler::FrameScheduler`].
pub trait FrameRenderer {
    fn viewport(&self) -> Viewport;

    /// Reconfigures render targets; called synchronously from resize handling.
    fn resize(&mut self, viewport: Viewport);

    /// Records and submits the draw calls of a resolved frame.
    fn submit(&mut self, scene: &SceneGraph, frame: &FrameState) -> Result<(), RenderError>;

    /// Shows the most recently submitted frame.
    fn present(&mut self);
}
