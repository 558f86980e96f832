use core::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::coords::Affine2;
use crate::paint::{BlendFunc, Color8};
use crate::skeleton::TextureId;

/// Skeleton-space vertex with texture coordinates and a byte color.
///
/// Layout (20 bytes): `position` at 0, `uv` at 8, `color` at 16.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SkeletonVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: Color8,
}

/// One flushed batch: a single texture, a single blend function.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCmd {
    pub texture: TextureId,
    pub blend: BlendFunc,
    pub vertices: Vec<SkeletonVertex>,
    /// Triangle list indexing into `vertices`.
    pub indices: Vec<u16>,
    /// Maps skeleton space to logical pixels.
    pub transform: Affine2,
    /// Draw-order range of the skeleton pass that produced this batch.
    pub slots: Range<usize>,
}

impl MeshCmd {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
