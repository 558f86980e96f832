//! Skeleton pose model consumed by the compositor.
//!
//! The engine does not load skeleton data or solve bone hierarchies. A
//! [`PoseSource`] owns the animation state and writes bone world transforms,
//! slot colors, attachments and the draw order into a [`Skeleton`] every time
//! it is advanced. Everything here is plain data plus the per-attachment world
//! vertex computation.

mod attachment;
mod bone;
mod pose;
mod slot;

pub use attachment::{
    Attachment, BoneWeight, MeshAttachment, RegionAttachment, SkinnedMeshAttachment, TextureId,
    QUAD_TRIANGLES,
};
pub use bone::Bone;
pub use pose::{PoseSource, StaticPose};
pub use slot::Slot;

use crate::coords::{Rect, Vec2};

/// Current pose of one skeleton instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
    pub slots: Vec<Slot>,
    /// Slot indices in paint order (back to front). Frame-varying.
    pub draw_order: Vec<usize>,
    /// Skeleton position added to every world vertex.
    pub origin: Vec2,
}

impl Skeleton {
    /// Creates a skeleton whose draw order is the slot order.
    pub fn new(bones: Vec<Bone>, slots: Vec<Slot>) -> Self {
        let draw_order = (0..slots.len()).collect();
        Self {
            bones,
            slots,
            draw_order,
            origin: Vec2::zero(),
        }
    }

    pub fn find_bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn find_bone_mut(&mut self, name: &str) -> Option<&mut Bone> {
        self.bones.iter_mut().find(|b| b.name == name)
    }

    pub fn find_slot_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    pub fn find_slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn find_slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.name == name)
    }

    /// Slot at draw-order position `i`.
    #[inline]
    pub fn slot_in_draw_order(&self, i: usize) -> Option<&Slot> {
        self.draw_order.get(i).and_then(|&s| self.slots.get(s))
    }

    /// Bone owning `slot`, if the index is valid.
    #[inline]
    pub fn slot_bone(&self, slot: &Slot) -> Option<&Bone> {
        self.bones.get(slot.bone)
    }

    /// Axis-aligned bounds of every attachment's world vertices, in skeleton space.
    ///
    /// Returns `None` when no slot in the draw order shows geometry.
    pub fn bounds(&self) -> Option<Rect> {
        let mut scratch = Vec::new();
        let mut bounds: Option<Rect> = None;

        for i in 0..self.draw_order.len() {
            let Some(slot) = self.slot_in_draw_order(i) else { continue };
            let Some(attachment) = slot.attachment.as_ref() else { continue };
            let Some(bone) = self.slot_bone(slot) else { continue };

            attachment.compute_world_vertices(self.origin, bone, &self.bones, &mut scratch);
            let points = scratch.chunks_exact(2).map(|p| Vec2::new(p[0], p[1]));
            if let Some(r) = Rect::from_points(points) {
                bounds = Some(bounds.map_or(r, |b| b.union(r)));
            }
        }

        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;

    fn quad(texture: u32) -> Attachment {
        Attachment::Region(RegionAttachment {
            name: format!("quad{texture}"),
            offset: [-1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0],
            uvs: [0.0; 8],
            color: Color::WHITE,
            texture: Some(TextureId(texture)),
        })
    }

    fn skeleton() -> Skeleton {
        let root = Bone::new("root", None, 10.0);
        let mut arm = Bone::new("arm", Some(0), 5.0);
        arm.set_world_transform(Vec2::new(10.0, 0.0), 0.0, Vec2::new(1.0, 1.0));
        Skeleton::new(
            vec![root, arm],
            vec![
                Slot::new("body", 0).with_attachment(quad(1)),
                Slot::new("hand", 1).with_attachment(quad(2)),
                Slot::new("empty", 1),
            ],
        )
    }

    #[test]
    fn new_uses_setup_draw_order() {
        assert_eq!(skeleton().draw_order, vec![0, 1, 2]);
    }

    #[test]
    fn lookups_by_name() {
        let s = skeleton();
        assert_eq!(s.find_slot_index("hand"), Some(1));
        assert!(s.find_slot("missing").is_none());
        assert_eq!(s.find_bone("arm").map(|b| b.length), Some(5.0));
        assert!(s.find_bone("missing").is_none());
    }

    #[test]
    fn slot_in_draw_order_follows_permutation() {
        let mut s = skeleton();
        s.draw_order = vec![2, 0, 1];
        assert_eq!(s.slot_in_draw_order(0).map(|s| s.name.as_str()), Some("empty"));
        assert!(s.slot_in_draw_order(3).is_none());
    }

    #[test]
    fn bounds_cover_all_attachments() {
        let s = skeleton();
        assert_eq!(s.bounds(), Some(Rect::new(-1.0, -1.0, 12.0, 2.0)));
    }

    #[test]
    fn bounds_none_without_geometry() {
        let s = Skeleton::new(vec![Bone::new("root", None, 0.0)], vec![Slot::new("a", 0)]);
        assert!(s.bounds().is_none());
    }
}
