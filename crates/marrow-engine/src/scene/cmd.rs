use super::{DebugCmd, MeshCmd};

/// Renderer-agnostic draw command stream.
///
/// Extending the scene:
/// - add the payload type in its own module under `scene`
/// - add a new variant here
/// - handle it in `render::SkeletonRenderer`
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Textured, indexed triangle batch with one blend function.
    Mesh(MeshCmd),
    /// Immediate-mode outlines, lines and points.
    Debug(DebugCmd),
}
