use core::ops::Range;

use crate::coords::Affine2;
use crate::paint::{BlendFunc, Color8};
use crate::scene::{DrawCmd, MeshCmd, RenderQueue, SkeletonVertex, ZIndex};
use crate::skeleton::TextureId;

/// Vertex capacity of one batch.
pub const MAX_BATCH_VERTICES: usize = 2000;
/// Index capacity of one batch.
pub const MAX_BATCH_INDICES: usize = 6000;

/// Accumulates slot geometry into [`MeshCmd`]s.
///
/// A batch holds one texture and one blend function. It is flushed to the
/// queue when either changes, when the next slot would overflow the
/// capacity, or explicitly at the end of a range.
#[derive(Debug)]
pub struct MeshBatcher {
    vertices: Vec<SkeletonVertex>,
    indices: Vec<u16>,
    state: Option<(TextureId, BlendFunc)>,
    slots: Option<Range<usize>>,

    z: ZIndex,
    transform: Affine2,

    warned_oversized: bool,
    warned_bad_index: bool,
}

impl MeshBatcher {
    pub fn new() -> Self {
        Self {
            vertices: Vec::with_capacity(MAX_BATCH_VERTICES),
            indices: Vec::with_capacity(MAX_BATCH_INDICES),
            state: None,
            slots: None,
            z: ZIndex::default(),
            transform: Affine2::IDENTITY,
            warned_oversized: false,
            warned_bad_index: false,
        }
    }

    /// Sets the z-index and transform stamped on the following batches.
    ///
    /// Pending geometry is discarded; call [`flush`](Self::flush) first.
    pub fn begin(&mut self, z: ZIndex, transform: Affine2) {
        self.reset();
        self.z = z;
        self.transform = transform;
    }

    #[inline]
    pub fn pending_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn pending_indices(&self) -> usize {
        self.indices.len()
    }

    /// Appends one slot's geometry.
    ///
    /// `positions` and `uvs` are `x, y` pairs; missing UVs read as zero.
    /// Returns `false` when the slot was rejected (too large for a batch or
    /// indices out of range).
    #[allow(clippy::too_many_arguments)]
    pub fn push_slot(
        &mut self,
        queue: &mut dyn RenderQueue,
        draw_index: usize,
        texture: TextureId,
        blend: BlendFunc,
        positions: &[f32],
        uvs: &[f32],
        triangles: &[u16],
        color: Color8,
    ) -> bool {
        let vertex_count = positions.len() / 2;
        if vertex_count > MAX_BATCH_VERTICES || triangles.len() > MAX_BATCH_INDICES {
            if !self.warned_oversized {
                log::warn!(
                    "slot {draw_index}: {vertex_count} vertices / {} indices exceed batch capacity; skipped",
                    triangles.len()
                );
                self.warned_oversized = true;
            }
            return false;
        }
        if triangles.iter().any(|&t| t as usize >= vertex_count) {
            if !self.warned_bad_index {
                log::warn!("slot {draw_index}: triangle index out of range; skipped");
                self.warned_bad_index = true;
            }
            return false;
        }

        let state_changed = self.state.is_some_and(|s| s != (texture, blend));
        let overflow = self.vertices.len() + vertex_count > MAX_BATCH_VERTICES
            || self.indices.len() + triangles.len() > MAX_BATCH_INDICES;
        if state_changed || overflow {
            self.flush(queue);
        }
        self.state = Some((texture, blend));

        let base = self.vertices.len() as u16;
        for (i, xy) in positions.chunks_exact(2).enumerate() {
            let uv = [
                uvs.get(i * 2).copied().unwrap_or(0.0),
                uvs.get(i * 2 + 1).copied().unwrap_or(0.0),
            ];
            self.vertices.push(SkeletonVertex {
                position: [xy[0], xy[1]],
                uv,
                color,
            });
        }
        self.indices.extend(triangles.iter().map(|&t| base + t));

        self.slots = Some(match self.slots.take() {
            Some(r) => r.start..draw_index + 1,
            None => draw_index..draw_index + 1,
        });
        true
    }

    /// Emits pending geometry as one [`MeshCmd`]. No-op when empty.
    pub fn flush(&mut self, queue: &mut dyn RenderQueue) {
        let Some((texture, blend)) = self.state else {
            return;
        };
        if self.indices.is_empty() {
            self.reset();
            return;
        }

        let cmd = MeshCmd {
            texture,
            blend,
            vertices: self.vertices.drain(..).collect(),
            indices: self.indices.drain(..).collect(),
            transform: self.transform,
            slots: self.slots.take().unwrap_or(0..0),
        };
        self.state = None;
        queue.push(self.z, DrawCmd::Mesh(cmd));
    }

    fn reset(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.state = None;
        self.slots = None;
    }
}

impl Default for MeshBatcher {
    fn default() -> Self {
        Self::new()
    }
}
