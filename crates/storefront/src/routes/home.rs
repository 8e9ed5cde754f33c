//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use chrono::Utc;
use tracing::instrument;

use threadline_core::ui::ActiveSales;

use super::Fallbacks;
use super::live::{HERO_EVENT, SALE_EVENT, carousel_event};
use crate::components::{HeaderProps, HeroProps, SaleProps, carousel_slots};
use crate::dispatch;
use crate::error::Result;
use crate::filters;
use crate::page::{Chrome, PageContext};

/// Live endpoint feeding every region of the home page.
pub const HOME_LIVE_PATH: &str = "/live/home";

/// A region on the page: the SSE event it listens for and its first render.
#[derive(Debug, Clone)]
pub struct LiveRegion {
    pub event: String,
    pub html: String,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub page: Chrome,
    pub hero: LiveRegion,
    pub sale: LiveRegion,
    pub carousels: Vec<LiveRegion>,
}

/// Display the home page.
///
/// Banners, carousel items and sales load concurrently. A failed fetch
/// leaves its region empty and shows a toast.
#[instrument(skip(ctx), fields(device = ctx.device.as_str()))]
pub async fn home(ctx: PageContext) -> Result<HomeTemplate> {
    let api = ctx.visitor.api();
    let (banners, items, strips) = tokio::join!(
        api.list_banners(),
        api.list_carousel_items(),
        api.list_sales()
    );

    let mut fallbacks = Fallbacks::default();
    let banners = fallbacks.take("banners", banners);
    let items = fallbacks.take("carousel items", items);
    let strips = fallbacks.take("sales", strips);

    let now = Utc::now();
    let hero = HeroProps::new(banners, 0);
    let sale = SaleProps::snapshot(&ActiveSales::new(strips, now), now);
    let carousels = carousel_slots(items)
        .iter()
        .map(|props| {
            Ok(LiveRegion {
                event: carousel_event(props.slot),
                html: dispatch::render(props, ctx.device)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let page = ctx
        .chrome_with("Home", HeaderProps::default(), fallbacks.into_toasts())
        .await?
        .live_at(HOME_LIVE_PATH);

    Ok(HomeTemplate {
        hero: LiveRegion {
            event: HERO_EVENT.to_string(),
            html: dispatch::render(&hero, ctx.device)?,
        },
        sale: LiveRegion {
            event: SALE_EVENT.to_string(),
            html: dispatch::render(&sale, ctx.device)?,
        },
        carousels,
        page,
    })
}
