//! A small real-time 3D viewer: an arena-backed scene graph, a frame
//! scheduler that resolves, culls, submits and presents one frame per
//! display refresh, and a resize controller that keeps the camera
//! projection in step with the window.

pub mod camera;
pub mod config;
pub mod demo;
pub mod frame;
pub mod geometry;
pub mod math;
pub mod orbit;
pub mod rendering;
pub mod resize;
pub mod scene_graph;
pub mod scheduler;
pub mod window;
