//! GPU types and conversions shared by the skeleton renderer.

use bytemuck::{Pod, Zeroable};

use crate::coords::Viewport;
use crate::paint::{BlendFactor, BlendFunc};
use crate::scene::SkeletonVertex;

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn wgpu_factor(factor: BlendFactor) -> wgpu::BlendFactor {
    match factor {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
    }
}

/// Same factors for color and alpha, additive operation.
pub(super) fn blend_state(func: BlendFunc) -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu_factor(func.src),
        dst_factor: wgpu_factor(func.dst),
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

// ── viewport uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ViewportUniform {
    pub viewport: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

impl ViewportUniform {
    pub(super) fn new(viewport: Viewport) -> Self {
        Self {
            viewport: [viewport.width.max(1.0), viewport.height.max(1.0)],
            _pad: [0.0; 2],
        }
    }
}

pub(super) fn viewport_ubo_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<ViewportUniform>() as u64)
        .unwrap_or(std::num::NonZeroU64::MIN)
}

// ── vertex layouts ────────────────────────────────────────────────────────

pub(super) const MESH_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x2, // position
    1 => Float32x2, // uv
    2 => Unorm8x4   // color
];

pub(super) fn mesh_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SkeletonVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &MESH_ATTRS,
    }
}

/// Debug line vertex in logical pixels.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct LineVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl LineVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x4  // color
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── buffers ───────────────────────────────────────────────────────────────

/// Rounds a byte length up to `wgpu::COPY_BUFFER_ALIGNMENT`.
#[inline]
pub(super) fn aligned_len(bytes: usize) -> u64 {
    let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
    bytes.div_ceil(align).saturating_mul(align) as u64
}

/// Growable GPU buffer; capacity doubles and never shrinks.
pub(super) struct DynamicBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
}

impl DynamicBuffer {
    pub(super) const fn new(label: &'static str, usage: wgpu::BufferUsages) -> Self {
        Self {
            label,
            usage,
            buffer: None,
            capacity: 0,
        }
    }

    /// Uploads `bytes`, padded to copy alignment, reallocating if needed.
    pub(super) fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        let len = aligned_len(bytes.len());
        if len == 0 {
            return;
        }
        if self.buffer.is_none() || len > self.capacity {
            let capacity = len.next_power_of_two().max(1024);
            log::debug!("renderer: {} grows to {capacity} bytes", self.label);
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: capacity,
                usage: self.usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = capacity;
        }
        let Some(buffer) = self.buffer.as_ref() else { return };

        if len as usize == bytes.len() {
            queue.write_buffer(buffer, 0, bytes);
        } else {
            let mut padded = bytes.to_vec();
            padded.resize(len as usize, 0);
            queue.write_buffer(buffer, 0, &padded);
        }
    }

    pub(super) fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiplied_maps_to_one_one_minus_src_alpha() {
        let s = blend_state(BlendFunc::PREMULTIPLIED);
        assert_eq!(s.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(s.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(s.alpha, s.color);
    }

    #[test]
    fn additive_destination_is_one() {
        let s = blend_state(BlendFunc::STRAIGHT.with_mode(crate::paint::BlendMode::Additive));
        assert_eq!(s.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(s.color.dst_factor, wgpu::BlendFactor::One);
    }

    #[test]
    fn copy_lengths_are_aligned() {
        assert_eq!(aligned_len(0), 0);
        assert_eq!(aligned_len(6), 8);
        assert_eq!(aligned_len(12), 12);
    }

    #[test]
    fn skeleton_vertex_matches_layout_stride() {
        assert_eq!(std::mem::size_of::<SkeletonVertex>(), 20);
        assert_eq!(MESH_ATTRS[2].offset, 16);
    }
}
