//! Threadline REST client.
//!
//! Every piece of storefront and admin state lives behind the Threadline REST
//! API. This crate is the only place that talks to it.
//!
//! # Architecture
//!
//! - [`ApiClient`] owns a shared `reqwest::Client` and the base URL. Cheap
//!   handles derived from it carry a bearer token ([`ApiClient::authorized`])
//!   or a cancellation token ([`ApiClient::bound_to`]).
//! - One method per backend operation, grouped by resource under
//!   [`resources`]. Each makes exactly one attempt: no retries, no timeouts.
//! - Failures are translated once, in [`ApiError`], into the message a
//!   visitor sees in a toast.
//! - [`storage`] is the per-visitor key-value store standing in for browser
//!   local storage (tokens, guest cart, guest compare list).
//!
//! # Example
//!
//! ```rust,ignore
//! use threadline_client::{ApiClient, ProductQuery};
//!
//! let client = ApiClient::new("http://localhost:5001/api")?;
//! let listing = client.list_products(&ProductQuery::search("linen")).await?;
//!
//! let shopper = client.authorized(token);
//! let cart = shopper.get_cart().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod error;
pub mod resources;
pub mod storage;
pub mod types;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::{ApiError, NETWORK_ERROR_MESSAGE};
pub use resources::admin::{
    AdminResource, BannerResource, CarouselResource, CategoryResource, CouponResource,
    ProductResource, SaleResource,
};
pub use resources::catalog::ProductQuery;
pub use storage::{FileStore, KeyValueStore, LocalStorage, MemoryStore, StorageError};
pub use types::*;
