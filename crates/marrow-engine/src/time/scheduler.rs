use std::cell::RefCell;
use std::rc::Rc;

use super::registry::{downgrade, AnimatableWeak, Registry};
use super::{sanitize_delta, Animatable};

/// Ambient per-frame scheduler.
///
/// Subscribers are advanced with the raw frame delta every time the host calls
/// [`update`](Self::update). Unlike [`Clock`](super::Clock) there is no time
/// scale and no pause; this is the default driver for entities that are not
/// clock-driven.
///
/// Like the clock, the scheduler is a cheap shared handle and only holds weak
/// references.
#[derive(Clone, Default)]
pub struct FrameScheduler {
    entries: Rc<Registry>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_scheduled<A: Animatable + 'static>(&self, target: &Rc<RefCell<A>>) -> bool {
        let weak = downgrade(target);
        self.entries.contains(&weak)
    }

    /// Subscribes `target` to per-frame updates. Idempotent.
    pub fn schedule<A: Animatable + 'static>(&self, target: &Rc<RefCell<A>>) {
        let weak = downgrade(target);
        self.schedule_weak(weak);
    }

    /// Unsubscribes `target`. Safe to call from inside an update.
    pub fn unschedule<A: Animatable + 'static>(&self, target: &Rc<RefCell<A>>) {
        let weak = downgrade(target);
        self.unschedule_weak(&weak);
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.entries.live_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every subscription. Must not be called during an update.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Runs one frame: advances every subscriber by `dt` (NaN/negative → 0).
    pub fn update(&self, dt: f64) {
        if self.entries.raw_len() == 0 {
            return;
        }
        self.entries.advance_all(sanitize_delta(dt));
        self.entries.compact();
    }

    pub(crate) fn schedule_weak(&self, target: AnimatableWeak) {
        if self.entries.add(target) {
            log::trace!("scheduler: subscribed ({} entries)", self.entries.raw_len());
        }
    }

    pub(crate) fn unschedule_weak(&self, target: &AnimatableWeak) {
        if self.entries.remove(target) {
            log::trace!("scheduler: unsubscribed");
        }
    }
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("entries", &self.entries.raw_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        total: f64,
        calls: u32,
    }

    impl Animatable for Counter {
        fn advance_time(&mut self, dt: f64) {
            self.total += dt;
            self.calls += 1;
        }
    }

    /// Subscribes a newcomer while being updated.
    struct Spawner {
        scheduler: FrameScheduler,
        newcomer: Rc<RefCell<Counter>>,
    }

    impl Animatable for Spawner {
        fn advance_time(&mut self, _dt: f64) {
            self.scheduler.schedule(&self.newcomer);
        }
    }

    #[test]
    fn update_passes_unscaled_delta() {
        let scheduler = FrameScheduler::new();
        let c = Rc::new(RefCell::new(Counter::default()));
        scheduler.schedule(&c);
        scheduler.update(0.5);
        scheduler.update(f64::NAN);
        assert_eq!(c.borrow().total, 0.5);
        assert_eq!(c.borrow().calls, 2);
    }

    #[test]
    fn schedule_is_idempotent_and_unschedule_stops_updates() {
        let scheduler = FrameScheduler::new();
        let c = Rc::new(RefCell::new(Counter::default()));
        scheduler.schedule(&c);
        scheduler.schedule(&c);
        assert_eq!(scheduler.len(), 1);

        scheduler.update(1.0);
        scheduler.unschedule(&c);
        assert!(!scheduler.is_scheduled(&c));
        scheduler.update(1.0);
        assert_eq!(c.borrow().calls, 1);
    }

    #[test]
    fn subscriptions_added_mid_update_start_next_frame() {
        let scheduler = FrameScheduler::new();
        let newcomer = Rc::new(RefCell::new(Counter::default()));
        let spawner = Rc::new(RefCell::new(Spawner {
            scheduler: scheduler.clone(),
            newcomer: newcomer.clone(),
        }));
        scheduler.schedule(&spawner);

        scheduler.update(1.0);
        assert_eq!(newcomer.borrow().calls, 0);
        assert!(scheduler.is_scheduled(&newcomer));

        scheduler.update(1.0);
        assert_eq!(newcomer.borrow().calls, 1);
    }
}
