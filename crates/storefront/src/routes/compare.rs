//! Product comparison handlers.
//!
//! Logged-in visitors compare through the REST compare list; guests keep
//! product ids under `compareItems`. The panel renders the web table or the
//! mobile cards for the requesting device.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{Html, IntoResponse, Redirect, Response},
};
use futures::future::join_all;
use serde::Deserialize;
use tracing::{instrument, warn};

use threadline_client::{ApiError, Product};
use threadline_core::ProductId;

use super::{Fallbacks, acknowledge, with_trigger};
use crate::components::{CompareProps, HeaderProps, Toast};
use crate::dispatch;
use crate::error::{Result, add_breadcrumb};
use crate::events::EventKind;
use crate::filters;
use crate::middleware::HxRequest;
use crate::page::{Chrome, PageContext};
use crate::visitor::Visitor;

/// Products being compared, in the order they were added.
///
/// Guest entries whose product can no longer be fetched are skipped.
///
/// # Errors
///
/// Returns the API error when a logged-in visitor's list cannot be fetched.
pub async fn load_compare(visitor: &Visitor) -> std::result::Result<Vec<Product>, ApiError> {
    if visitor.is_logged_in() {
        return visitor.api().get_compare().await;
    }

    let compare = visitor.storage.guest_compare();
    let products = join_all(compare.ids().iter().map(|&id| visitor.api().get_product(id))).await;
    Ok(compare
        .ids()
        .iter()
        .zip(products)
        .filter_map(|(id, product)| {
            product
                .inspect_err(|err| warn!(error = %err, product_id = %id, "skipping compared product"))
                .ok()
        })
        .collect())
}

/// Compare page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/compare.html")]
pub struct CompareTemplate {
    pub page: Chrome,
    /// Rendered variant for the visitor's device.
    pub panel: String,
}

/// Display the compare page.
#[instrument(skip(ctx), fields(device = ctx.device.as_str()))]
pub async fn show(ctx: PageContext) -> Result<CompareTemplate> {
    let mut fallbacks = Fallbacks::default();
    let products = fallbacks.take("compare list", load_compare(&ctx.visitor).await);
    let panel = dispatch::render(&CompareProps::new(products), ctx.device)?;
    let page = ctx
        .chrome_with("Compare", HeaderProps::default(), fallbacks.into_toasts())
        .await?;
    Ok(CompareTemplate { page, panel })
}

/// The compare variant for the current device (HTMX).
///
/// Requested again when the device crosses the breakpoint or the list
/// changes in another tab.
#[instrument(skip(ctx), fields(device = ctx.device.as_str()))]
pub async fn panel(ctx: PageContext) -> Result<Html<String>> {
    let products = load_compare(&ctx.visitor).await?;
    Ok(Html(dispatch::render(&CompareProps::new(products), ctx.device)?))
}

#[derive(Debug, Deserialize)]
pub struct CompareForm {
    pub product_id: ProductId,
}

/// Add a product to the comparison.
#[instrument(skip(visitor, hx), fields(visitor = %visitor.id))]
pub async fn add(visitor: Visitor, hx: HxRequest, Form(form): Form<CompareForm>) -> Result<Response> {
    add_breadcrumb("compare", &format!("add product {}", form.product_id));

    if visitor.is_logged_in() {
        visitor.api().add_to_compare(form.product_id).await?;
        visitor.notify(EventKind::CompareUpdated);
    } else {
        let mut compare = visitor.storage.guest_compare();
        if !compare.add(form.product_id) {
            return Ok(acknowledge(hx, "/compare", &Toast::info("Already in your comparison"), &[]));
        }
        visitor.save_guest_compare(&compare)?;
    }

    Ok(acknowledge(
        hx,
        "/compare",
        &Toast::success("Added to comparison"),
        &[EventKind::CompareUpdated],
    ))
}

/// Remove a product; htmx gets the refreshed panel.
#[instrument(skip(ctx, hx), fields(visitor = %ctx.visitor.id))]
pub async fn remove(ctx: PageContext, hx: HxRequest, Form(form): Form<CompareForm>) -> Result<Response> {
    let visitor = &ctx.visitor;
    if visitor.is_logged_in() {
        visitor.api().remove_from_compare(form.product_id).await?;
        visitor.notify(EventKind::CompareUpdated);
    } else {
        let mut compare = visitor.storage.guest_compare();
        if compare.remove(form.product_id) {
            visitor.save_guest_compare(&compare)?;
        }
    }

    if !hx.0 {
        return Ok(Redirect::to("/compare").into_response());
    }
    let products = load_compare(visitor).await?;
    let panel = dispatch::render(&CompareProps::new(products), ctx.device)?;
    Ok(with_trigger(Html(panel), &[EventKind::CompareUpdated]))
}
