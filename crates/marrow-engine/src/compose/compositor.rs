use core::ops::Range;

use crate::coords::Affine2;
use crate::entity::SlotBindings;
use crate::paint::Color8;
use crate::scene::{DrawCmd, RenderQueue, ZIndex};
use crate::skeleton::Skeleton;

use super::{build_debug, MeshBatcher, RenderConfig};

/// How a draw pass walked the skeleton.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawMode {
    /// No overlay bindings: the whole draw order in one range.
    Merged,
    /// At least one binding: ranges interleaved with overlay visits.
    Split,
}

/// One contiguous draw-order range emitted by a split pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitDrawCommand {
    pub z: ZIndex,
    pub range: Range<usize>,
}

/// Per-entity draw state: batcher, split command pool and vertex scratch.
///
/// The split pool only grows; commands are rewritten in place each frame.
#[derive(Debug, Default)]
pub struct Compositor {
    batcher: MeshBatcher,
    split_pool: Vec<SplitDrawCommand>,
    split_used: usize,
    world: Vec<f32>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pooled command, including ones unused by the last pass.
    #[inline]
    pub fn split_pool(&self) -> &[SplitDrawCommand] {
        &self.split_pool
    }

    /// Commands emitted by the last split pass.
    #[inline]
    pub fn split_commands(&self) -> &[SplitDrawCommand] {
        &self.split_pool[..self.split_used]
    }

    /// Draws `skeleton`, picking the mode from `bindings`.
    pub fn draw(
        &mut self,
        skeleton: &Skeleton,
        bindings: &SlotBindings,
        config: &RenderConfig,
        queue: &mut dyn RenderQueue,
        transform: &Affine2,
    ) -> DrawMode {
        let mode = if bindings.is_empty() {
            self.split_used = 0;
            self.emit_range(skeleton, config, queue, transform, 0..skeleton.draw_order.len());
            DrawMode::Merged
        } else {
            self.draw_split(skeleton, bindings, config, queue, transform);
            DrawMode::Split
        };

        if config.debug_enabled() {
            let debug = build_debug(skeleton, config, transform, &mut self.world);
            queue.push(config.z, DrawCmd::Debug(debug));
        }
        mode
    }

    /// Emits batched meshes for draw-order positions in `range`.
    ///
    /// Slots without an attachment, a texture or a valid bone are skipped.
    pub fn emit_range(
        &mut self,
        skeleton: &Skeleton,
        config: &RenderConfig,
        queue: &mut dyn RenderQueue,
        transform: &Affine2,
        range: Range<usize>,
    ) {
        let skeleton_color = config.skeleton_color();
        let blend = config.blend_func();
        self.batcher.begin(config.z, *transform);

        for i in range {
            let Some(slot) = skeleton.slot_in_draw_order(i) else { continue };
            let Some(attachment) = slot.attachment.as_ref() else { continue };
            let Some(texture) = attachment.texture() else { continue };
            let Some(bone) = skeleton.slot_bone(slot) else { continue };

            attachment.compute_world_vertices(skeleton.origin, bone, &skeleton.bones, &mut self.world);

            let c = skeleton_color.modulate(slot.color).modulate(attachment.color());
            let alpha = (c.a * 255.0) as u8;
            let m = if config.premultiplied_alpha { alpha as f32 } else { 255.0 };
            let color = Color8::new((c.r * m) as u8, (c.g * m) as u8, (c.b * m) as u8, alpha);

            self.batcher.push_slot(
                queue,
                i,
                texture,
                blend.with_mode(slot.blend_mode),
                &self.world,
                attachment.uvs(),
                attachment.triangles(),
                color,
            );
        }

        self.batcher.flush(queue);
    }

    fn draw_split(
        &mut self,
        skeleton: &Skeleton,
        bindings: &SlotBindings,
        config: &RenderConfig,
        queue: &mut dyn RenderQueue,
        transform: &Affine2,
    ) {
        self.split_used = 0;
        let len = skeleton.draw_order.len();
        let mut range_start = 0;

        for i in 0..len {
            let last = i + 1 == len;
            let slot_index = skeleton.draw_order[i];
            let slot = skeleton.slots.get(slot_index);

            if slot.is_none_or(|s| s.attachment.is_none()) && !last {
                continue;
            }
            let node = bindings.get(slot_index);
            if node.is_none() && !last {
                continue;
            }

            let range = range_start..i + 1;
            self.take_split_command(config.z, range.clone());
            self.emit_range(skeleton, config, queue, transform, range);
            range_start = i + 1;

            let (Some(node), Some(slot)) = (node, slot) else { continue };
            let Some(bone) = skeleton.slot_bone(slot) else { continue };
            let Ok(mut node) = node.try_borrow_mut() else {
                log::warn!("overlay for slot '{}' is already borrowed; not drawn", slot.name);
                continue;
            };

            node.set_position(bone.world_position() + skeleton.origin);
            node.set_rotation(-bone.world_rotation);
            node.set_scale(bone.world_scale_x, bone.world_scale_y);
            node.set_opacity(slot.color.alpha8());
            node.set_color(slot.color.to_rgb8());
            node.set_visible(true);
            node.visit(queue, transform, config.z);
            node.set_visible(false);
        }
    }

    fn take_split_command(&mut self, z: ZIndex, range: Range<usize>) {
        if self.split_used == self.split_pool.len() {
            self.split_pool.push(SplitDrawCommand::default());
        }
        let cmd = &mut self.split_pool[self.split_used];
        cmd.z = z;
        cmd.range = range;
        self.split_used += 1;
    }
}
