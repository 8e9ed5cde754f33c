//! Small UI-state endpoints: viewport reports and the mobile menu drawer.

use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, instrument};

use threadline_core::ui::Disclosure;

use crate::components::MobileMenu;
use crate::device::parse_width;
use crate::error::Result;
use crate::middleware::htmx::HX_TRIGGER;
use crate::state::AppState;
use crate::visitor::Visitor;

/// Client event fired when the visitor crosses the breakpoint.
pub const DEVICE_CHANGED: &str = "deviceChanged";

#[derive(Debug, Deserialize)]
pub struct ViewportForm {
    pub width: String,
}

/// Record the reported width.
///
/// Answers `HX-Trigger: deviceChanged` when the classification flips so
/// fragments listening on the body can re-fetch their variant. Live
/// regions follow the same change through the device store.
#[instrument(skip(state, visitor, form), fields(visitor = %visitor.id))]
pub async fn viewport(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<ViewportForm>,
) -> Response {
    let Some(width) = parse_width(&form.width) else {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    };

    let devices = state.devices();
    let before = devices.current(visitor.id);
    let after = devices.observe(visitor.id, Some(width));
    if before == after {
        return StatusCode::NO_CONTENT.into_response();
    }

    debug!(width, from = before.as_str(), to = after.as_str(), "device changed");
    (StatusCode::OK, [(HX_TRIGGER, HeaderValue::from_static(DEVICE_CHANGED))]).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    #[serde(default)]
    pub open: bool,
}

/// The mobile menu drawer in the requested state (HTMX).
pub async fn menu(visitor: Visitor, Query(query): Query<MenuQuery>) -> Result<MobileMenu> {
    Ok(MobileMenu {
        menu: Disclosure::new(query.open),
        logged_in: visitor.is_logged_in(),
    })
}
