use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Something advanced by a time driver once per frame.
pub trait Animatable {
    /// Advances internal state by `dt` seconds (already scaled by the driver).
    fn advance_time(&mut self, dt: f64);
}

pub(crate) type AnimatableWeak = Weak<RefCell<dyn Animatable>>;

/// Weak, type-erased registration handle for `target`.
pub(crate) fn downgrade<A: Animatable + 'static>(target: &Rc<RefCell<A>>) -> AnimatableWeak {
    let weak: Weak<RefCell<A>> = Rc::downgrade(target);
    weak
}

/// Ordered, tombstone-tolerant list of weak registrations.
///
/// Invariants:
/// - at most one live entry per target (identity is the allocation address)
/// - `remove` never shifts entries; it writes a tombstone and marks the list dirty
/// - `compact` is the only operation that moves entries, and it keeps their order
#[derive(Default)]
pub(crate) struct Registry {
    entries: RefCell<Vec<Option<AnimatableWeak>>>,
    dirty: Cell<bool>,
}

impl Registry {
    pub(crate) fn contains(&self, target: &AnimatableWeak) -> bool {
        self.entries
            .borrow()
            .iter()
            .flatten()
            .any(|entry| Weak::ptr_eq(entry, target))
    }

    /// Appends `target` unless it is already registered. Returns `true` if added.
    pub(crate) fn add(&self, target: AnimatableWeak) -> bool {
        if self.contains(&target) {
            return false;
        }
        self.entries.borrow_mut().push(Some(target));
        true
    }

    /// Tombstones `target`. Returns `true` if it was registered.
    pub(crate) fn remove(&self, target: &AnimatableWeak) -> bool {
        let mut entries = self.entries.borrow_mut();
        let found = entries
            .iter_mut()
            .find(|entry| entry.as_ref().is_some_and(|w| Weak::ptr_eq(w, target)));

        match found {
            Some(entry) => {
                *entry = None;
                self.dirty.set(true);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&self) {
        self.entries.borrow_mut().clear();
        self.dirty.set(false);
    }

    /// Raw length including tombstones.
    pub(crate) fn raw_len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Registrations whose target is still alive.
    pub(crate) fn live_len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .flatten()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Advances every live entry that was registered when the pass started.
    ///
    /// Iterates by index and holds no borrow of the list while a target runs,
    /// so targets may add or remove registrations (including their own).
    /// Entries appended during the pass are first advanced on the next pass.
    /// Each target is kept alive by a strong reference for the duration of its call.
    pub(crate) fn advance_all(&self, dt: f64) {
        let len = self.raw_len();

        for i in 0..len {
            let target = match self.entries.borrow().get(i) {
                Some(Some(weak)) => weak.clone(),
                Some(None) => continue,
                // `clear` ran during the pass.
                None => break,
            };

            // Dropped without deregistering: treat as a tombstone.
            let Some(target) = target.upgrade() else {
                self.dirty.set(true);
                continue;
            };

            match target.try_borrow_mut() {
                Ok(mut animatable) => animatable.advance_time(dt),
                Err(_) => log::warn!("skipping animatable at index {i}: already borrowed"),
            }
        }
    }

    /// Removes tombstones and dead entries if any were recorded, preserving order.
    pub(crate) fn compact(&self) {
        if !self.dirty.get() {
            return;
        }

        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| entry.as_ref().is_some_and(|w| w.strong_count() > 0));
        self.dirty.set(false);

        log::trace!("compacted registry: {} -> {} entries", before, entries.len());
    }

    #[cfg(test)]
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.get()
    }
}
