//! Geometry types shared by the skeleton model, the compositor and renderers.
//!
//! Skeleton space is whatever the pose provider writes into bone world
//! transforms. The host maps it to logical pixels with an [`Affine2`] passed to
//! the draw call; renderers convert logical pixels to NDC in the shader.

mod rect;
mod transform;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use transform::Affine2;
pub use vec2::Vec2;
pub use viewport::Viewport;
