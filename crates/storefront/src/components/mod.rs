//! Props and templates for the page building blocks.
//!
//! The device-adaptive ones (header, hero, carousel, sale strip, compare)
//! implement [`crate::dispatch::Responsive`]. The rotating ones also
//! implement [`Rotating`] so a live region can drive them from a timer.

pub mod carousel;
pub mod compare;
pub mod header;
pub mod hero;
pub mod sale;
pub mod toast;

pub use carousel::{CarouselProps, carousel_slots};
pub use compare::CompareProps;
pub use header::{HeaderProps, MobileMenu};
pub use hero::HeroProps;
pub use sale::SaleProps;
pub use toast::{Toast, ToastLevel};

use threadline_core::ui::Rotation;

/// Props whose display position is driven by a rotation timer.
pub trait Rotating {
    fn rotation(&self) -> Rotation;
    fn set_rotation(&mut self, rotation: Rotation);
}
