use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::compose::{Compositor, DrawMode, RenderConfig, SplitDrawCommand};
use crate::coords::{Affine2, Rect, Vec2};
use crate::paint::{BlendFunc, Rgb8};
use crate::scene::{GroupNode, NodeRef, OwnerId, RenderQueue, ZIndex};
use crate::skeleton::{PoseSource, Skeleton};
use crate::time::{Animatable, AnimatableWeak, Clock, FrameScheduler};

use super::SlotBindings;

/// Shared handle to an entity, as held by hosts.
pub type EntityRef = Rc<RefCell<AnimatedEntity>>;

/// One skeleton instance driven by a [`Clock`] or the [`FrameScheduler`].
///
/// Entities start self-scheduled. Exactly one driver is active at a time and
/// both hold the entity weakly; dropping the last handle deregisters it.
pub struct AnimatedEntity {
    self_ref: Weak<RefCell<AnimatedEntity>>,
    id: OwnerId,

    skeleton: Skeleton,
    pose: Box<dyn PoseSource>,

    clock: Clock,
    scheduler: FrameScheduler,
    running: bool,

    bindings: SlotBindings,
    config: RenderConfig,
    compositor: Compositor,
}

impl AnimatedEntity {
    /// Creates an entity and subscribes it to `scheduler`.
    pub fn new(
        skeleton: Skeleton,
        pose: impl PoseSource + 'static,
        clock: &Clock,
        scheduler: &FrameScheduler,
    ) -> EntityRef {
        Self::with_config(skeleton, pose, clock, scheduler, RenderConfig::default())
    }

    pub fn with_config(
        skeleton: Skeleton,
        pose: impl PoseSource + 'static,
        clock: &Clock,
        scheduler: &FrameScheduler,
        config: RenderConfig,
    ) -> EntityRef {
        Rc::new_cyclic(|weak: &Weak<RefCell<AnimatedEntity>>| {
            let as_animatable: AnimatableWeak = weak.clone();
            scheduler.schedule_weak(as_animatable);

            RefCell::new(Self {
                self_ref: weak.clone(),
                id: OwnerId::next(),
                skeleton,
                pose: Box::new(pose),
                clock: clock.clone(),
                scheduler: scheduler.clone(),
                running: true,
                bindings: SlotBindings::new(),
                config,
                compositor: Compositor::new(),
            })
        })
    }

    #[inline]
    pub fn owner_id(&self) -> OwnerId {
        self.id
    }

    #[inline]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    #[inline]
    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }

    fn as_animatable(&self) -> AnimatableWeak {
        self.self_ref.clone()
    }

    // ── time driver ───────────────────────────────────────────────────────

    /// Switches between clock-driven and self-scheduled advancement.
    ///
    /// The current mode is read from the clock, so an entity the host removed
    /// from the clock (`remove`, `remove_all`, `reset`) can be re-registered.
    pub fn set_advance_time_by_clock(&mut self, enabled: bool) {
        let me = self.as_animatable();
        let was_by_clock = self.clock.contains_weak(&me);
        if enabled {
            self.scheduler.unschedule_weak(&me);
            self.clock.add_weak(me);
        } else {
            self.clock.remove_weak(&me);
            self.scheduler.schedule_weak(me);
        }
        if was_by_clock != enabled {
            log::debug!(
                "entity {:?}: advanced by {}",
                self.id,
                if enabled { "clock" } else { "frame scheduler" }
            );
        }
    }

    /// Whether the entity is currently registered with its clock.
    pub fn is_advance_time_by_clock(&self) -> bool {
        self.clock.contains_weak(&self.as_animatable())
    }

    pub fn pause_animation(&mut self) {
        self.running = false;
    }

    pub fn resume_animation(&mut self) {
        self.running = true;
    }

    #[inline]
    pub fn is_running_animation(&self) -> bool {
        self.running
    }

    // ── overlay bindings ──────────────────────────────────────────────────

    /// Node bound to `slot_name`.
    pub fn slot_node(&self, slot_name: &str) -> Option<NodeRef> {
        let slot = self.skeleton.find_slot_index(slot_name)?;
        self.bindings.get(slot).cloned()
    }

    /// Binds an overlay node to a slot; with `None` an empty [`GroupNode`] is
    /// created.
    ///
    /// If the slot is already bound the existing node is returned and `node`
    /// is ignored. The node is hidden and parented to this entity. Returns
    /// `None` for unknown slots and for nodes owned by someone else.
    pub fn bind_slot_node(&mut self, slot_name: &str, node: Option<NodeRef>) -> Option<NodeRef> {
        let slot = self.skeleton.find_slot_index(slot_name)?;
        if let Some(existing) = self.bindings.get(slot) {
            return Some(existing.clone());
        }

        let node = node.unwrap_or_else(GroupNode::new_ref);
        if let Some(other) = self.bindings.slot_of(&node) {
            log::warn!(
                "entity {:?}: node already bound to slot '{}'; refusing '{slot_name}'",
                self.id,
                self.skeleton.slots[other].name
            );
            return None;
        }
        {
            let Ok(mut n) = node.try_borrow_mut() else {
                log::warn!("entity {:?}: node for slot '{slot_name}' is borrowed; not bound", self.id);
                return None;
            };
            if let Some(parent) = n.parent().filter(|&p| p != self.id) {
                log::warn!(
                    "entity {:?}: node for slot '{slot_name}' already has parent {parent:?}; not bound",
                    self.id
                );
                return None;
            }
            n.set_parent(Some(self.id));
            n.set_visible(false);
        }

        self.bindings.insert(slot, node.clone());
        log::debug!("entity {:?}: bound node to slot '{slot_name}'", self.id);
        Some(node)
    }

    /// Removes the binding of `slot_name`. The node is detached, not destroyed.
    pub fn unbind_slot_node(&mut self, slot_name: &str) {
        let Some(slot) = self.skeleton.find_slot_index(slot_name) else { return };
        let Some(node) = self.bindings.remove(slot) else { return };
        self.detach(&node);
        log::debug!("entity {:?}: unbound slot '{slot_name}'", self.id);
    }

    /// Name of the slot `node` is bound to.
    pub fn slot_for_node(&self, node: &NodeRef) -> Option<&str> {
        let slot = self.bindings.slot_of(node)?;
        self.skeleton.slots.get(slot).map(|s| s.name.as_str())
    }

    #[inline]
    pub fn bindings(&self) -> &SlotBindings {
        &self.bindings
    }

    fn detach(&self, node: &NodeRef) {
        if let Ok(mut n) = node.try_borrow_mut() {
            if n.parent() == Some(self.id) {
                n.set_parent(None);
            }
        }
    }

    // ── queries ───────────────────────────────────────────────────────────

    pub fn has_bone(&self, name: &str) -> bool {
        self.skeleton.find_bone(name).is_some()
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.pose.has_animation(name)
    }

    /// World position of a bone including the skeleton origin; zero if unknown.
    pub fn bone_world_position(&self, name: &str) -> Vec2 {
        self.skeleton
            .find_bone(name)
            .map_or(Vec2::zero(), |b| b.world_position() + self.skeleton.origin)
    }

    /// Bounds of all visible attachment geometry in skeleton space.
    pub fn inner_bounding_box(&self) -> Rect {
        self.skeleton.bounds().unwrap_or(Rect::zero())
    }

    // ── render settings ───────────────────────────────────────────────────

    #[inline]
    pub fn render_config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_render_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    pub fn set_premultiplied_alpha(&mut self, premultiplied: bool) {
        self.config.premultiplied_alpha = premultiplied;
    }

    /// `None` restores the default for the current alpha convention.
    pub fn set_blend_func(&mut self, blend: Option<BlendFunc>) {
        self.config.blend = blend;
    }

    pub fn blend_func(&self) -> BlendFunc {
        self.config.blend_func()
    }

    pub fn set_debug_slots(&mut self, enabled: bool) {
        self.config.debug_slots = enabled;
    }

    pub fn set_debug_bones(&mut self, enabled: bool) {
        self.config.debug_bones = enabled;
    }

    pub fn set_z_index(&mut self, z: ZIndex) {
        self.config.z = z;
    }

    pub fn set_tint(&mut self, tint: Rgb8) {
        self.config.tint = tint;
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.config.opacity = opacity;
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Submits this frame's draw commands. `transform` maps skeleton space
    /// to logical pixels.
    pub fn draw(&mut self, queue: &mut dyn RenderQueue, transform: &Affine2) -> DrawMode {
        self.compositor
            .draw(&self.skeleton, &self.bindings, &self.config, queue, transform)
    }

    /// Ranges emitted by the last split pass.
    pub fn split_commands(&self) -> &[SplitDrawCommand] {
        self.compositor.split_commands()
    }
}

impl Animatable for AnimatedEntity {
    fn advance_time(&mut self, dt: f64) {
        if !self.running {
            return;
        }
        self.pose.update(dt as f32, &mut self.skeleton);
    }
}

impl Drop for AnimatedEntity {
    fn drop(&mut self) {
        let me = self.as_animatable();
        self.clock.remove_weak(&me);
        self.scheduler.unschedule_weak(&me);

        let nodes: Vec<NodeRef> = self.bindings.drain().map(|(_, node)| node).collect();
        for node in &nodes {
            self.detach(node);
        }
        log::debug!("entity {:?}: dropped ({} overlay nodes released)", self.id, nodes.len());
    }
}

impl std::fmt::Debug for AnimatedEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedEntity")
            .field("id", &self.id)
            .field("bones", &self.skeleton.bones.len())
            .field("slots", &self.skeleton.slots.len())
            .field("by_clock", &self.is_advance_time_by_clock())
            .field("running", &self.running)
            .field("bindings", &self.bindings)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::coords::Vec2;
    use crate::paint::Color;
    use crate::scene::DrawList;
    use crate::skeleton::{Attachment, Bone, RegionAttachment, Slot, StaticPose, TextureId};

    // ── fixtures ──────────────────────────────────────────────────────────

    /// Accumulates every delta it is handed and nudges the root bone.
    struct ScriptedPose {
        total: Rc<Cell<f32>>,
    }

    impl PoseSource for ScriptedPose {
        fn update(&mut self, dt: f32, skeleton: &mut Skeleton) {
            self.total.set(self.total.get() + dt);
            if let Some(root) = skeleton.bones.first_mut() {
                root.world_x += dt;
            }
        }

        fn has_animation(&self, name: &str) -> bool {
            name == "walk"
        }
    }

    fn quad() -> Attachment {
        Attachment::Region(RegionAttachment {
            name: "quad".to_string(),
            offset: [0.0, 0.0, 4.0, 0.0, 4.0, 2.0, 0.0, 2.0],
            uvs: [0.0; 8],
            color: Color::WHITE,
            texture: Some(TextureId(1)),
        })
    }

    fn skeleton() -> Skeleton {
        let root = Bone::new("root", None, 0.0);
        let mut arm = Bone::new("arm", Some(0), 3.0);
        arm.set_world_transform(Vec2::new(5.0, 1.0), 0.0, Vec2::new(1.0, 1.0));
        Skeleton::new(
            vec![root, arm],
            vec![
                Slot::new("body", 0).with_attachment(quad()),
                Slot::new("hand", 1).with_attachment(quad()),
                Slot::new("hat", 0).with_attachment(quad()),
            ],
        )
    }

    struct Fixture {
        clock: Clock,
        scheduler: FrameScheduler,
        total: Rc<Cell<f32>>,
        entity: EntityRef,
    }

    fn fixture() -> Fixture {
        let clock = Clock::new();
        let scheduler = FrameScheduler::new();
        let total = Rc::new(Cell::new(0.0));
        let pose = ScriptedPose { total: total.clone() };
        let entity = AnimatedEntity::new(skeleton(), pose, &clock, &scheduler);
        Fixture { clock, scheduler, total, entity }
    }

    // ── scheduling ────────────────────────────────────────────────────────

    #[test]
    fn starts_self_scheduled() {
        let f = fixture();
        assert!(!f.entity.borrow().is_advance_time_by_clock());
        assert_eq!(f.scheduler.len(), 1);
        assert!(f.clock.is_empty());

        f.scheduler.update(0.25);
        assert_eq!(f.total.get(), 0.25);
        assert_eq!(f.entity.borrow().skeleton().bones[0].world_x, 0.25);
    }

    #[test]
    fn switching_modes_moves_registration() {
        let f = fixture();
        f.entity.borrow_mut().set_advance_time_by_clock(true);
        assert!(f.clock.contains(&f.entity));
        assert!(!f.scheduler.is_scheduled(&f.entity));

        f.clock.set_time_scale(2.0);
        f.clock.advance_time(0.5);
        f.scheduler.update(10.0);
        assert_eq!(f.total.get(), 1.0);

        f.entity.borrow_mut().set_advance_time_by_clock(false);
        assert!(!f.clock.contains(&f.entity));
        assert!(f.scheduler.is_scheduled(&f.entity));
    }

    #[test]
    fn repeated_mode_switch_is_noop() {
        let f = fixture();
        f.entity.borrow_mut().set_advance_time_by_clock(true);
        f.entity.borrow_mut().set_advance_time_by_clock(true);
        assert_eq!(f.clock.len(), 1);

        f.entity.borrow_mut().set_advance_time_by_clock(false);
        f.entity.borrow_mut().set_advance_time_by_clock(false);
        assert_eq!(f.scheduler.len(), 1);
        assert!(f.clock.is_empty());
    }

    #[test]
    fn clock_mode_recovers_after_remove_all() {
        let f = fixture();
        f.entity.borrow_mut().set_advance_time_by_clock(true);
        f.clock.remove_all();
        assert!(!f.entity.borrow().is_advance_time_by_clock());

        f.entity.borrow_mut().set_advance_time_by_clock(true);
        assert!(f.clock.contains(&f.entity));
        assert!(!f.scheduler.is_scheduled(&f.entity));

        f.clock.advance_time(0.1);
        f.scheduler.update(0.1);
        assert_eq!(f.total.get(), 0.1);
    }

    #[test]
    fn mode_follows_external_clock_removal() {
        let f = fixture();
        f.entity.borrow_mut().set_advance_time_by_clock(true);
        f.clock.remove(&f.entity);
        assert!(!f.entity.borrow().is_advance_time_by_clock());

        f.entity.borrow_mut().set_advance_time_by_clock(false);
        assert!(f.scheduler.is_scheduled(&f.entity));
        f.scheduler.update(0.5);
        assert_eq!(f.total.get(), 0.5);

        f.entity.borrow_mut().set_advance_time_by_clock(true);
        f.clock.reset();
        f.entity.borrow_mut().set_advance_time_by_clock(true);
        assert_eq!(f.clock.len(), 1);
        assert!(f.scheduler.is_empty());
    }

    #[test]
    fn paused_entity_ignores_time() {
        let f = fixture();
        f.entity.borrow_mut().pause_animation();
        f.scheduler.update(1.0);
        assert_eq!(f.total.get(), 0.0);

        f.entity.borrow_mut().resume_animation();
        assert!(f.entity.borrow().is_running_animation());
        f.scheduler.update(1.0);
        assert_eq!(f.total.get(), 1.0);
    }

    #[test]
    fn drop_deregisters_from_active_driver() {
        let f = fixture();
        f.entity.borrow_mut().set_advance_time_by_clock(true);
        let Fixture { clock, scheduler, entity, .. } = f;

        drop(entity);
        assert!(clock.is_empty());
        assert!(scheduler.is_empty());
        clock.advance_time(1.0);
    }

    // ── bindings ──────────────────────────────────────────────────────────

    #[test]
    fn bind_twice_returns_same_node() {
        let f = fixture();
        let mut e = f.entity.borrow_mut();

        let first = e.bind_slot_node("hand", None).unwrap();
        let second = e.bind_slot_node("hand", Some(GroupNode::new_ref())).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(e.bindings().len(), 1);

        let n = first.borrow();
        assert!(!n.is_visible());
        assert_eq!(n.parent(), Some(e.owner_id()));
    }

    #[test]
    fn unknown_slot_is_ignored() {
        let f = fixture();
        let mut e = f.entity.borrow_mut();
        assert!(e.bind_slot_node("tail", None).is_none());
        assert!(e.slot_node("tail").is_none());
        e.unbind_slot_node("tail");
        assert!(e.bindings().is_empty());
    }

    #[test]
    fn unbind_detaches_without_destroying() {
        let f = fixture();
        let node = GroupNode::new_ref();
        let mut e = f.entity.borrow_mut();

        e.bind_slot_node("body", Some(node.clone()));
        assert_eq!(e.slot_for_node(&node), Some("body"));

        e.unbind_slot_node("body");
        assert!(e.slot_node("body").is_none());
        assert_eq!(e.slot_for_node(&node), None);
        assert_eq!(node.borrow().parent(), None);

        e.unbind_slot_node("body");
    }

    #[test]
    fn node_owned_by_another_entity_is_refused() {
        let a = fixture();
        let b = fixture();
        let node = GroupNode::new_ref();

        assert!(a.entity.borrow_mut().bind_slot_node("body", Some(node.clone())).is_some());
        assert!(b.entity.borrow_mut().bind_slot_node("body", Some(node.clone())).is_none());
        assert!(b.entity.borrow().bindings().is_empty());
    }

    #[test]
    fn node_cannot_fill_two_slots() {
        let f = fixture();
        let node = GroupNode::new_ref();
        let mut e = f.entity.borrow_mut();

        assert!(e.bind_slot_node("body", Some(node.clone())).is_some());
        assert!(e.bind_slot_node("hat", Some(node.clone())).is_none());
        assert_eq!(e.slot_for_node(&node), Some("body"));
    }

    #[test]
    fn dropping_entity_releases_bound_nodes() {
        let f = fixture();
        let node = GroupNode::new_ref();
        f.entity.borrow_mut().bind_slot_node("hat", Some(node.clone()));

        drop(f);
        assert_eq!(node.borrow().parent(), None);
        assert_eq!(Rc::strong_count(&node), 1);
    }

    // ── queries ───────────────────────────────────────────────────────────

    #[test]
    fn bone_and_animation_queries() {
        let f = fixture();
        let mut e = f.entity.borrow_mut();
        assert!(e.has_bone("arm"));
        assert!(!e.has_bone("leg"));
        assert!(e.has_animation("walk"));
        assert!(!e.has_animation("run"));

        e.skeleton_mut().origin = Vec2::new(10.0, 0.0);
        assert_eq!(e.bone_world_position("arm"), Vec2::new(15.0, 1.0));
        assert_eq!(e.bone_world_position("leg"), Vec2::zero());
    }

    #[test]
    fn bounding_box_covers_attachments() {
        let f = fixture();
        let bbox = f.entity.borrow().inner_bounding_box();
        assert_eq!(bbox.min(), Vec2::new(0.0, 0.0));
        assert_eq!(bbox.max(), Vec2::new(9.0, 3.0));
    }

    #[test]
    fn empty_skeleton_has_empty_bounds() {
        let clock = Clock::new();
        let scheduler = FrameScheduler::new();
        let e = AnimatedEntity::new(Skeleton::default(), StaticPose::new(), &clock, &scheduler);
        assert_eq!(e.borrow().inner_bounding_box(), Rect::zero());
    }

    // ── drawing ───────────────────────────────────────────────────────────

    #[test]
    fn draw_mode_follows_bindings() {
        let f = fixture();
        let mut e = f.entity.borrow_mut();
        let mut list = DrawList::new();

        assert_eq!(e.draw(&mut list, &Affine2::IDENTITY), DrawMode::Merged);
        assert_eq!(list.len(), 1);

        e.bind_slot_node("hand", None);
        list.clear();
        assert_eq!(e.draw(&mut list, &Affine2::IDENTITY), DrawMode::Split);
        let ranges: Vec<_> = e.split_commands().iter().map(|s| s.range.clone()).collect();
        assert_eq!(ranges, vec![0..2, 2..3]);
        // An empty group emits nothing between the ranges.
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn render_setters_update_config() {
        let f = fixture();
        let mut e = f.entity.borrow_mut();
        e.set_premultiplied_alpha(false);
        assert_eq!(e.blend_func(), BlendFunc::STRAIGHT);
        e.set_z_index(ZIndex(4));
        e.set_opacity(10);
        e.set_tint(Rgb8::new(1, 2, 3));
        e.set_debug_bones(true);

        let c = e.render_config();
        assert_eq!(c.z, ZIndex(4));
        assert_eq!(c.opacity, 10);
        assert_eq!(c.tint, Rgb8::new(1, 2, 3));
        assert!(c.debug_enabled());
    }
}
