//! Threadline Core - Shared types and UI state machines.
//!
//! This crate provides the pieces every Threadline component agrees on:
//! - `storefront` - Public-facing clothing store
//! - `admin` - Catalog, marketing, and content back office
//! - `cli` - Operator tooling over the same REST API
//!
//! # Architecture
//!
//! The core crate contains only types and pure state machines - no I/O, no
//! timers, no HTTP clients. Time is always passed in by the caller, which keeps
//! rotation and countdown logic deterministic under test.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, statuses, emails
//! - [`device`] - Viewport width to web/mobile classification
//! - [`ui`] - Rotation, countdown, sale strip, sticky header, disclosure state
//! - [`guest`] - Guest cart and compare list arithmetic
//! - [`validation`] - Field-presence and range checks for forms

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod device;
pub mod guest;
pub mod types;
pub mod ui;
pub mod validation;

pub use device::Device;
pub use types::*;
