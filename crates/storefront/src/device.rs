//! Device detection for server rendering.
//!
//! The browser reports its viewport width three ways, tried in order:
//! the `Sec-CH-Viewport-Width` client hint, the legacy `Viewport-Width` hint,
//! and a `viewport_width` cookie that the page script rewrites on resize.
//! With none of them the request renders the web variant.
//!
//! [`DeviceStore`] keeps the latest classification per visitor in a
//! `tokio::sync::watch` channel. Live regions subscribe to it and re-render
//! in the other variant as soon as a resize crosses the breakpoint.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{PoisonError, RwLock};

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName};
use tokio::sync::watch;

use threadline_core::Device;

use crate::visitor::VisitorId;

/// Cookie written by the page script.
pub const VIEWPORT_COOKIE: &str = "viewport_width";

const SEC_CH_VIEWPORT_WIDTH: HeaderName = HeaderName::from_static("sec-ch-viewport-width");
const VIEWPORT_WIDTH: HeaderName = HeaderName::from_static("viewport-width");

/// Viewport width reported by the request, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport(pub Option<u32>);

impl Viewport {
    /// Read the width from hints or the viewport cookie.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let hint = [SEC_CH_VIEWPORT_WIDTH, VIEWPORT_WIDTH]
            .iter()
            .find_map(|name| headers.get(name)?.to_str().ok().and_then(parse_width));

        Self(hint.or_else(|| cookie_width(headers)))
    }

    #[must_use]
    pub const fn device(self) -> Device {
        Device::from_viewport(self.0)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Viewport {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Widths arrive as CSS pixels, possibly fractional.
pub fn parse_width(raw: &str) -> Option<u32> {
    let value = raw.trim().parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked above
    Some(value.round() as u32)
}

fn cookie_width(headers: &HeaderMap) -> Option<u32> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == VIEWPORT_COOKIE)
        .and_then(|(_, value)| parse_width(value))
}

/// Per-visitor observable device classification.
#[derive(Debug, Default)]
pub struct DeviceStore {
    devices: RwLock<HashMap<VisitorId, watch::Sender<Device>>>,
}

impl DeviceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a width observation and return the visitor's device.
    ///
    /// `None` keeps the last known classification, or web for a visitor
    /// never seen before. Subscribers are only woken when the class flips.
    pub fn observe(&self, visitor: VisitorId, width: Option<u32>) -> Device {
        let Some(width) = width else {
            return self.current(visitor);
        };
        let device = Device::from_width(width);

        if let Some(sender) = self
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&visitor)
        {
            sender.send_if_modified(|current| {
                let changed = *current != device;
                *current = device;
                changed
            });
            return device;
        }

        self.devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(visitor)
            .or_insert_with(|| watch::channel(device).0)
            .send_replace(device);
        device
    }

    /// Last known device for `visitor`.
    #[must_use]
    pub fn current(&self, visitor: VisitorId) -> Device {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&visitor)
            .map_or_else(Device::default, |sender| *sender.borrow())
    }

    /// Watch `visitor`'s device. The receiver starts at the current value.
    #[must_use]
    pub fn subscribe(&self, visitor: VisitorId) -> watch::Receiver<Device> {
        self.devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(visitor)
            .or_insert_with(|| watch::channel(Device::default()).0)
            .subscribe()
    }

    /// Drop state for visitors nobody is watching and whose class is the default.
    pub fn prune(&self) -> usize {
        let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        let before = devices.len();
        devices.retain(|_, sender| sender.receiver_count() > 0 || *sender.borrow() != Device::Web);
        before - devices.len()
    }
}
