//! Rendering module
//!
//! `frame` turns race state into triangles in viewport pixel space;
//! `pipeline` uploads them to a WebGPU surface.

pub mod frame;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use frame::{FrameOptions, build_frame};
pub use pipeline::RenderState;
pub use vertex::Vertex;
