//! Color and blend state shared by the skeleton model, compositor and renderers.
//!
//! Colors in the skeleton model are straight (non-premultiplied) `f32` RGBA.
//! Vertex colors produced by the compositor are bytes; whether they are
//! premultiplied depends on the entity's render configuration.

pub mod blend;
pub mod color;

pub use blend::{BlendFactor, BlendFunc, BlendMode};
pub use color::{Color, Color8, Rgb8};
