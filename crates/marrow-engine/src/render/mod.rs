//! GPU rendering subsystem.
//!
//! The skeleton renderer consumes `scene` draw streams and issues GPU
//! commands via wgpu. It owns its GPU resources (pipelines, buffers,
//! registered textures).
//!
//! Convention:
//! - mesh vertices arrive in skeleton space and are mapped to logical pixels
//!   with the command's transform on the CPU
//! - logical pixels use a top-left origin with +Y down
//! - the vertex shader converts to NDC using a viewport uniform

mod common;
mod ctx;
mod skeleton;

pub use ctx::{RenderCtx, RenderTarget};
pub use skeleton::SkeletonRenderer;
