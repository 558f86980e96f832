//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - store renderer-agnostic draw commands produced by the compositor
//! - provide deterministic ordering (z-index + insertion order)
//! - define the capability interface of externally owned overlay nodes

mod cmd;
mod debug;
mod key;
mod list;
mod mesh;
mod overlay;
mod z_index;

pub use cmd::DrawCmd;
pub use debug::{DebugCmd, DebugLine, DebugPoint};
pub use key::SortKey;
pub use list::{DrawItem, DrawList, RenderQueue};
pub use mesh::{MeshCmd, SkeletonVertex};
pub use overlay::{GroupNode, NodeRef, OverlayNode, OwnerId};
pub use z_index::ZIndex;
