use std::collections::HashMap;
use std::rc::Rc;

use crate::scene::NodeRef;

/// Slot ↔ overlay node bindings of one entity.
///
/// Both directions are updated together so a slot and its node always agree.
/// Slots are keyed by their index in `Skeleton::slots`; nodes by allocation
/// address, which stays unique while the binding holds a strong reference.
#[derive(Default)]
pub struct SlotBindings {
    by_slot: HashMap<usize, NodeRef>,
    by_node: HashMap<*const (), usize>,
}

#[inline]
fn node_key(node: &NodeRef) -> *const () {
    Rc::as_ptr(node) as *const ()
}

impl SlotBindings {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_slot.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_slot.is_empty()
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<&NodeRef> {
        self.by_slot.get(&slot)
    }

    /// Slot index bound to `node`.
    #[inline]
    pub fn slot_of(&self, node: &NodeRef) -> Option<usize> {
        self.by_node.get(&node_key(node)).copied()
    }

    /// Binds `node` to `slot`. Returns `false` without changes when either
    /// side is already bound.
    pub fn insert(&mut self, slot: usize, node: NodeRef) -> bool {
        let key = node_key(&node);
        if self.by_slot.contains_key(&slot) || self.by_node.contains_key(&key) {
            return false;
        }
        self.by_node.insert(key, slot);
        self.by_slot.insert(slot, node);
        true
    }

    pub fn remove(&mut self, slot: usize) -> Option<NodeRef> {
        let node = self.by_slot.remove(&slot)?;
        self.by_node.remove(&node_key(&node));
        Some(node)
    }

    /// Removes every binding, yielding the released nodes.
    pub fn drain(&mut self) -> impl Iterator<Item = (usize, NodeRef)> + '_ {
        self.by_node.clear();
        self.by_slot.drain()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &NodeRef)> {
        self.by_slot.iter().map(|(&slot, node)| (slot, node))
    }
}

impl std::fmt::Debug for SlotBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut slots: Vec<usize> = self.by_slot.keys().copied().collect();
        slots.sort_unstable();
        f.debug_struct("SlotBindings").field("slots", &slots).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::GroupNode;

    #[test]
    fn both_directions_stay_in_lockstep() {
        let mut b = SlotBindings::new();
        let node = GroupNode::new_ref();

        assert!(b.insert(3, node.clone()));
        assert_eq!(b.slot_of(&node), Some(3));
        assert!(Rc::ptr_eq(b.get(3).unwrap(), &node));

        let removed = b.remove(3).unwrap();
        assert!(Rc::ptr_eq(&removed, &node));
        assert_eq!(b.slot_of(&node), None);
        assert!(b.is_empty());
    }

    #[test]
    fn occupied_slot_or_node_is_refused() {
        let mut b = SlotBindings::new();
        let first = GroupNode::new_ref();
        let second = GroupNode::new_ref();

        assert!(b.insert(0, first.clone()));
        assert!(!b.insert(0, second.clone()));
        assert!(!b.insert(1, first.clone()));
        assert_eq!(b.len(), 1);
        assert_eq!(b.slot_of(&second), None);
    }

    #[test]
    fn drain_empties_both_maps() {
        let mut b = SlotBindings::new();
        let node = GroupNode::new_ref();
        b.insert(2, node.clone());

        let drained: Vec<usize> = b.drain().map(|(slot, _)| slot).collect();
        assert_eq!(drained, vec![2]);
        assert!(b.is_empty());
        assert_eq!(b.slot_of(&node), None);
    }
}
