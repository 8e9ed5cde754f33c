//! UI state machines shared by the web and mobile presentations.
//!
//! Nothing in here owns a timer. Callers drive the machines with ticks and
//! timestamps, so the storefront's async timers and the CLI's terminal loop
//! share the same arithmetic.

pub mod countdown;
pub mod disclosure;
pub mod rotation;
pub mod sale;
pub mod sticky;

pub use countdown::{Countdown, CountdownState};
pub use disclosure::{Accordion, Disclosure};
pub use rotation::Rotation;
pub use sale::{ActiveSales, SaleLayout, Timed};
