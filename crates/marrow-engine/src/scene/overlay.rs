use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::coords::{Affine2, Vec2};
use crate::paint::Rgb8;

use super::{RenderQueue, ZIndex};

/// Shared handle to an externally owned overlay node.
pub type NodeRef = Rc<RefCell<dyn OverlayNode>>;

/// Identity of whatever currently parents an overlay node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocates a process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Capability interface of a scene node that can be drawn in a slot's place.
///
/// The engine only positions, tints and visits nodes; it never creates their
/// content or destroys them.
pub trait OverlayNode {
    fn set_position(&mut self, position: Vec2);
    /// Degrees, clockwise (node convention; bones rotate counter-clockwise).
    fn set_rotation(&mut self, degrees: f32);
    fn set_scale(&mut self, scale_x: f32, scale_y: f32);
    fn set_opacity(&mut self, opacity: u8);
    fn set_color(&mut self, color: Rgb8);
    fn set_visible(&mut self, visible: bool);
    fn is_visible(&self) -> bool;

    fn parent(&self) -> Option<OwnerId>;
    fn set_parent(&mut self, parent: Option<OwnerId>);

    /// Renders the node and its subtree immediately, submitting to `queue`.
    ///
    /// Invisible nodes must submit nothing.
    fn visit(&mut self, queue: &mut dyn RenderQueue, parent_transform: &Affine2, z: ZIndex);
}

/// Default overlay node: an empty container that forwards visits to its children.
pub struct GroupNode {
    position: Vec2,
    rotation: f32,
    scale: Vec2,
    opacity: u8,
    color: Rgb8,
    visible: bool,
    parent: Option<OwnerId>,
    children: Vec<NodeRef>,
}

impl GroupNode {
    pub fn new() -> Self {
        Self {
            position: Vec2::zero(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            opacity: 255,
            color: Rgb8::WHITE,
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Wraps a new group in a [`NodeRef`].
    pub fn new_ref() -> NodeRef {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn add_child(&mut self, child: NodeRef) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    pub fn color(&self) -> Rgb8 {
        self.color
    }

    /// Local transform: translate, rotate (clockwise), scale.
    pub fn local_transform(&self) -> Affine2 {
        Affine2::from_trs(self.position, -self.rotation, self.scale)
    }
}

impl Default for GroupNode {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayNode for GroupNode {
    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    fn set_scale(&mut self, scale_x: f32, scale_y: f32) {
        self.scale = Vec2::new(scale_x, scale_y);
    }

    fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity;
    }

    fn set_color(&mut self, color: Rgb8) {
        self.color = color;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn parent(&self) -> Option<OwnerId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<OwnerId>) {
        self.parent = parent;
    }

    fn visit(&mut self, queue: &mut dyn RenderQueue, parent_transform: &Affine2, z: ZIndex) {
        if !self.visible {
            return;
        }
        let transform = parent_transform.then(&self.local_transform());
        for child in &self.children {
            child.borrow_mut().visit(queue, &transform, z);
        }
    }
}

impl std::fmt::Debug for GroupNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupNode")
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("scale", &self.scale)
            .field("opacity", &self.opacity)
            .field("color", &self.color)
            .field("visible", &self.visible)
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color8;
    use crate::scene::{DebugCmd, DrawCmd, DrawList};

    /// Leaf that emits one debug point at its transformed origin.
    struct Pin {
        visible: bool,
        parent: Option<OwnerId>,
    }

    impl OverlayNode for Pin {
        fn set_position(&mut self, _: Vec2) {}
        fn set_rotation(&mut self, _: f32) {}
        fn set_scale(&mut self, _: f32, _: f32) {}
        fn set_opacity(&mut self, _: u8) {}
        fn set_color(&mut self, _: Rgb8) {}
        fn set_visible(&mut self, visible: bool) {
            self.visible = visible;
        }
        fn is_visible(&self) -> bool {
            self.visible
        }
        fn parent(&self) -> Option<OwnerId> {
            self.parent
        }
        fn set_parent(&mut self, parent: Option<OwnerId>) {
            self.parent = parent;
        }
        fn visit(&mut self, queue: &mut dyn RenderQueue, parent_transform: &Affine2, z: ZIndex) {
            if !self.visible {
                return;
            }
            let mut d = DebugCmd::new(*parent_transform);
            d.push_point(parent_transform.apply(Vec2::zero()), Color8::WHITE, 1.0);
            queue.push(z, DrawCmd::Debug(d));
        }
    }

    fn pin() -> NodeRef {
        Rc::new(RefCell::new(Pin { visible: true, parent: None }))
    }

    #[test]
    fn owner_ids_are_unique() {
        assert_ne!(OwnerId::next(), OwnerId::next());
    }

    #[test]
    fn group_forwards_visit_with_composed_transform() {
        let mut group = GroupNode::new();
        group.set_position(Vec2::new(5.0, 6.0));
        group.add_child(pin());

        let mut list = DrawList::new();
        group.visit(&mut list, &Affine2::translation(1.0, 1.0), ZIndex(2));

        let items = list.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key.z, ZIndex(2));
        match &items[0].cmd {
            DrawCmd::Debug(d) => assert_eq!(d.points[0].at, Vec2::new(6.0, 7.0)),
            DrawCmd::Mesh(_) => panic!("expected debug output"),
        }
    }

    #[test]
    fn hidden_group_emits_nothing() {
        let mut group = GroupNode::new();
        group.add_child(pin());
        group.set_visible(false);

        let mut list = DrawList::new();
        group.visit(&mut list, &Affine2::IDENTITY, ZIndex(0));
        assert!(list.is_empty());
    }
}
