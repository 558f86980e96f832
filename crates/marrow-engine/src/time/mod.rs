//! Time subsystem.
//!
//! Two drivers advance [`Animatable`] objects once per frame:
//! - [`Clock`]: shared, scaled, pausable logical time; entities opt in with
//!   `AnimatedEntity::set_advance_time_by_clock(true)`
//! - [`FrameScheduler`]: the ambient "run me every frame" list used by
//!   entities that are not clock-driven
//!
//! Both hold weak references and tolerate registration changes made from
//! inside a pass: removals leave a tombstone that is compacted once the pass
//! is over, so indices stay stable while iterating.

mod clock;
mod registry;
mod scheduler;

pub use clock::{Clock, ClockConfig};
pub use registry::Animatable;
pub(crate) use registry::AnimatableWeak;
pub use scheduler::FrameScheduler;

/// Replaces NaN and negative deltas with zero.
#[inline]
pub(crate) fn sanitize_delta(dt: f64) -> f64 {
    if dt.is_nan() || dt < 0.0 { 0.0 } else { dt }
}
