//! Skeleton compositor.
//!
//! Turns a posed [`Skeleton`](crate::skeleton::Skeleton) into draw commands:
//! - merged mode: the whole draw order becomes batched meshes
//! - split mode: the draw order is cut after every slot that carries an
//!   overlay binding, and the bound node is visited between the two halves
//!
//! Batching, vertex coloring and debug geometry live here; the entity only
//! decides which mode applies and owns the state.

mod batch;
mod compositor;
mod config;
mod debug;

pub use batch::{MAX_BATCH_INDICES, MAX_BATCH_VERTICES, MeshBatcher};
pub use compositor::{Compositor, DrawMode, SplitDrawCommand};
pub use config::RenderConfig;
pub use debug::build_debug;
