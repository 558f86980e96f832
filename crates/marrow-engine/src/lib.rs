//! Marrow engine crate.
//!
//! Skeletal-animation runtime pieces: time drivers, the skeleton model,
//! animated entities with slot-bound overlay nodes, the draw-order
//! compositor, and a headless wgpu renderer for the resulting draw stream.

pub mod compose;
pub mod coords;
pub mod device;
pub mod entity;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod skeleton;
pub mod time;
