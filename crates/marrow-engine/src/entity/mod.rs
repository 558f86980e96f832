//! Animated skeleton entities.
//!
//! An [`AnimatedEntity`] owns one skeleton instance and its pose source,
//! registers itself with a time driver, and draws through the compositor.
//! Overlay nodes bound to slots are drawn in the slot's place.

mod animated;
mod bindings;

pub use animated::{AnimatedEntity, EntityRef};
pub use bindings::SlotBindings;
