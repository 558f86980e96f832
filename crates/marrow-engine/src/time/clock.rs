use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::registry::{downgrade, AnimatableWeak, Registry};
use super::{sanitize_delta, Animatable};

/// Construction parameters for a [`Clock`].
#[derive(Debug, Copy, Clone)]
pub struct ClockConfig {
    /// Initial accumulated time. NaN or negative values start at zero.
    pub start_time: f64,
    /// Initial time scale. NaN or negative values fall back to 1.0.
    pub time_scale: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            time_scale: 1.0,
        }
    }
}

struct ClockState {
    time: Cell<f64>,
    time_scale: Cell<f64>,
    playing: Cell<bool>,
    entries: Registry,
}

/// Shared logical time base that advances registered animatables.
///
/// `Clock` is a cheap handle: clones share the same state. The clock never
/// owns what it advances; registrations are weak and an entity dropped
/// without deregistering is skipped and compacted away.
///
/// All methods take `&self` and may be called from inside
/// [`Animatable::advance_time`] while a pass is running.
#[derive(Clone)]
pub struct Clock {
    inner: Rc<ClockState>,
}

thread_local! {
    static GLOBAL: Clock = Clock::new();
}

impl Clock {
    pub fn new() -> Self {
        Self::with_config(ClockConfig::default())
    }

    pub fn with_config(config: ClockConfig) -> Self {
        let clock = Self {
            inner: Rc::new(ClockState {
                time: Cell::new(sanitize_delta(config.start_time)),
                time_scale: Cell::new(1.0),
                playing: Cell::new(true),
                entries: Registry::default(),
            }),
        };
        clock.set_time_scale(config.time_scale);
        clock
    }

    /// The shared clock for the current thread, created on first access.
    ///
    /// Prefer passing a `Clock` explicitly; this exists for hosts that want a
    /// single process-wide time base without threading a handle around.
    pub fn global() -> Clock {
        GLOBAL.with(Clock::clone)
    }

    /// Accumulated scaled time in seconds.
    #[inline]
    pub fn time(&self) -> f64 {
        self.inner.time.get()
    }

    #[inline]
    pub fn time_scale(&self) -> f64 {
        self.inner.time_scale.get()
    }

    /// Sets the factor applied to every delta. NaN or negative input becomes 1.0.
    pub fn set_time_scale(&self, time_scale: f64) {
        let time_scale = if time_scale.is_nan() || time_scale < 0.0 { 1.0 } else { time_scale };
        self.inner.time_scale.set(time_scale);
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.inner.playing.get()
    }

    pub fn play(&self) {
        self.inner.playing.set(true);
    }

    /// Freezes time: `advance_time` does nothing until `play` is called.
    pub fn stop(&self) {
        self.inner.playing.set(false);
    }

    /// Whether `target` is currently registered.
    pub fn contains<A: Animatable + 'static>(&self, target: &Rc<RefCell<A>>) -> bool {
        let weak = downgrade(target);
        self.inner.entries.contains(&weak)
    }

    /// Registers `target` at the end of the advance order. Idempotent.
    pub fn add<A: Animatable + 'static>(&self, target: &Rc<RefCell<A>>) {
        let weak = downgrade(target);
        self.add_weak(weak);
    }

    /// Deregisters `target`. No-op if it is not registered.
    ///
    /// Safe to call during [`advance_time`](Self::advance_time), including for
    /// the animatable currently being advanced.
    pub fn remove<A: Animatable + 'static>(&self, target: &Rc<RefCell<A>>) {
        let weak = downgrade(target);
        self.remove_weak(&weak);
    }

    /// Drops every registration. Must not be called during a pass.
    pub fn remove_all(&self) {
        self.inner.entries.clear();
    }

    /// Number of registered animatables that are still alive.
    pub fn len(&self) -> usize {
        self.inner.entries.live_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Restores the initial state: time 0, scale 1, playing, no registrations.
    pub fn reset(&self) {
        self.inner.time.set(0.0);
        self.inner.time_scale.set(1.0);
        self.inner.playing.set(true);
        self.inner.entries.clear();
    }

    /// Advances time by `passed_time * time_scale` and forwards the scaled
    /// delta to every registered animatable in registration order.
    ///
    /// NaN or negative deltas count as zero. Removals made during the pass are
    /// compacted after every animatable has run.
    pub fn advance_time(&self, passed_time: f64) {
        if !self.is_playing() {
            return;
        }

        let scaled = sanitize_delta(passed_time) * self.time_scale();
        self.inner.time.set(self.time() + scaled);

        if self.inner.entries.raw_len() == 0 {
            return;
        }

        self.inner.entries.advance_all(scaled);
        self.inner.entries.compact();
    }

    pub(crate) fn contains_weak(&self, target: &AnimatableWeak) -> bool {
        self.inner.entries.contains(target)
    }

    pub(crate) fn add_weak(&self, target: AnimatableWeak) {
        if self.inner.entries.add(target) {
            log::trace!("clock: registered animatable ({} entries)", self.inner.entries.raw_len());
        }
    }

    pub(crate) fn remove_weak(&self, target: &AnimatableWeak) {
        if self.inner.entries.remove(target) {
            log::trace!("clock: deregistered animatable");
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("time", &self.time())
            .field("time_scale", &self.time_scale())
            .field("playing", &self.is_playing())
            .field("entries", &self.inner.entries.raw_len())
            .finish()
    }
}
