//! Headless GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a surface
//! - providing offscreen color targets the skeleton renderer can draw into

mod gpu;
mod init;
mod offscreen;

pub use gpu::Gpu;
pub use init::GpuInit;
pub use offscreen::OffscreenTarget;
