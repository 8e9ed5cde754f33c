//! Sticky header threshold.
//!
//! The page script pins the header once the vertical scroll offset passes
//! this value, re-checking on every scroll event.

/// Scroll offset, in CSS pixels, past which the header sticks.
pub const STICKY_OFFSET_PX: f64 = 50.0;
