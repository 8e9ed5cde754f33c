//! One method per REST endpoint, grouped by resource.
//!
//! Every method is a single attempt. Errors come back as
//! [`ApiError`](crate::ApiError) with the message ready for a toast.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod compare;
pub mod marketing;
pub mod orders;
