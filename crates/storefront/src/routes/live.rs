//! Live regions over server-sent events.
//!
//! A page opens one `EventSource` (through the htmx SSE extension) and every
//! live region on it listens for its own named event. Regions re-render when
//! their timer fires, when the visitor's device crosses the breakpoint, or
//! when the event bus reports a change that concerns them.
//!
//! All timers of one connection share a cancellation token whose drop guard
//! lives inside the response stream: closing the tab stops them. Region
//! streams never end on their own, so the browser never reconnects in a loop.

use std::convert::Infallible;
use std::pin::Pin;
use std::time::Duration;

use async_stream::stream;
use axum::{
    Router,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::{Stream, StreamExt, stream::select_all};
use serde::Deserialize;
use tokio::sync::{broadcast::error::RecvError, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use threadline_client::{ApiError, SaleStrip};
use threadline_core::Device;
use threadline_core::ui::ActiveSales;
use threadline_core::ui::rotation::{
    HERO_BANNER_INTERVAL, PRODUCT_CAROUSEL_INTERVAL, SALE_STRIP_INTERVAL,
};

use crate::components::{
    CarouselProps, HeaderProps, HeroProps, Rotating, SaleProps, carousel_slots,
};
use crate::device::Viewport;
use crate::dispatch::{self, Responsive};
use crate::error::{AppError, Result, degrade};
use crate::events::EventKind;
use crate::hooks::{CountSource, spawn_count_hook};
use crate::state::AppState;
use crate::timers::{COUNTDOWN_TICK, Clock, rotate, ticks};
use crate::visitor::{Visitor, VisitorId};

/// Event name of the header region.
pub const HEADER_EVENT: &str = "header";
/// Event name of the hero region.
pub const HERO_EVENT: &str = "hero";
/// Event name of the sale strip region.
pub const SALE_EVENT: &str = "sale";

/// Event name of the carousel in `slot`.
#[must_use]
pub fn carousel_event(slot: usize) -> String {
    format!("carousel-{slot}")
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/live/home", get(home))
        .route("/live/header", get(header))
        .route("/live/hero", get(hero))
        .route("/live/sales", get(sales))
        .route("/live/carousels/{slot}", get(carousel))
}

/// One re-rendered region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub name: String,
    pub html: String,
}

impl Frame {
    /// SSE event carrying the fragment. Carriage returns are not allowed in
    /// SSE data and are dropped.
    #[must_use]
    pub fn into_event(self) -> Event {
        Event::default()
            .event(self.name)
            .data(self.html.replace('\r', ""))
    }
}

/// A region's frames, boxed so regions of different kinds can be merged.
pub type Region = Pin<Box<dyn Stream<Item = Frame> + Send>>;

fn frame<P: Responsive + ?Sized>(name: &str, props: &P, device: Device) -> Option<Frame> {
    match dispatch::render(props, device) {
        Ok(html) => Some(Frame {
            name: name.to_string(),
            html,
        }),
        Err(err) => {
            warn!(error = %err, region = name, "live region failed to render");
            None
        }
    }
}

/// Merge regions into one SSE response whose timers stop with the connection.
fn connect(
    regions: Vec<Region>,
    cancel: CancellationToken,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let guard = cancel.drop_guard();
    let mut merged = select_all(regions);

    let events = stream! {
        let _guard = guard;
        while let Some(frame) = merged.next().await {
            yield Ok(frame.into_event());
        }
        debug!("live connection closed");
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}

enum Step<T> {
    Update(T),
    Device(Device),
}

/// A rotating region: advances every `period` and follows device changes.
///
/// No initial frame; the page already rendered the first state.
pub fn rotating_region<P>(
    mut props: P,
    period: Duration,
    mut device: watch::Receiver<Device>,
    name: String,
    cancel: CancellationToken,
) -> Region
where
    P: Rotating + Responsive + Send + 'static,
{
    Box::pin(stream! {
        let mut rotations = Box::pin(rotate(props.rotation(), period, cancel.clone()));
        let mut current = *device.borrow_and_update();
        let mut watching = true;

        loop {
            let step = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                Some(rotation) = rotations.next() => Step::Update(rotation),
                changed = device.changed(), if watching => match changed {
                    Ok(()) => Step::Device(*device.borrow_and_update()),
                    Err(_) => {
                        watching = false;
                        continue;
                    }
                },
            };

            match step {
                Step::Update(rotation) => props.set_rotation(rotation),
                Step::Device(next) if next == current => continue,
                Step::Device(next) => current = next,
            }
            if let Some(frame) = frame(&name, &props, current) {
                yield frame;
            }
        }
    })
}

enum SaleStep {
    Countdown,
    Advance,
    Device(Device),
}

/// The sale strips: countdowns refresh every second, ended strips drop out,
/// and the displayed strip advances every five seconds.
///
/// Strips that have not started join on the countdown tick that reaches
/// their start. Once the last strip ends the region renders its empty state
/// and stops ticking.
pub fn sale_region(
    strips: Vec<SaleStrip>,
    clock: Clock,
    mut device: watch::Receiver<Device>,
    cancel: CancellationToken,
) -> Region {
    Box::pin(stream! {
        let mut sales = ActiveSales::new(strips, clock.now());
        let mut countdown = Box::pin(ticks(COUNTDOWN_TICK, cancel.clone()));
        let mut strip = Box::pin(ticks(SALE_STRIP_INTERVAL, cancel.clone()));
        let mut current = *device.borrow_and_update();
        let mut ticking = !sales.is_exhausted();
        let mut watching = true;

        loop {
            let step = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                Some(_) = countdown.next(), if ticking => SaleStep::Countdown,
                Some(_) = strip.next(), if ticking => SaleStep::Advance,
                changed = device.changed(), if watching => match changed {
                    Ok(()) => SaleStep::Device(*device.borrow_and_update()),
                    Err(_) => {
                        watching = false;
                        continue;
                    }
                },
            };

            let now = clock.now();
            match step {
                SaleStep::Countdown => {
                    let ended = sales.prune(now);
                    if ended > 0 {
                        debug!(ended, remaining = sales.len(), "sale strips ended");
                    }
                    ticking = !sales.is_exhausted();
                }
                SaleStep::Advance => {
                    if !sales.rotation().is_running() {
                        continue;
                    }
                    sales.advance();
                }
                SaleStep::Device(next) if next == current => continue,
                SaleStep::Device(next) => current = next,
            }

            let props = SaleProps::snapshot(&sales, now);
            if let Some(frame) = frame(SALE_EVENT, &props, current) {
                yield frame;
            }
        }
    })
}

/// The header: badge counts, login state and device variant.
pub fn header_region(
    state: AppState,
    visitor: VisitorId,
    search: String,
    mut device: watch::Receiver<Device>,
    cancel: CancellationToken,
) -> Region {
    let mut counts = spawn_count_hook(CountSource::new(state.clone(), visitor), cancel.clone());
    let mut bus = state.events().subscribe();

    Box::pin(stream! {
        let mut current = *device.borrow_and_update();
        let mut last = HeaderProps::new(*counts.borrow_and_update(), Visitor::new(visitor, &state).is_logged_in())
            .with_search(search.clone());
        let (mut counting, mut watching, mut listening) = (true, true, true);

        loop {
            let step = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                changed = counts.changed(), if counting => match changed {
                    Ok(()) => Step::Update(()),
                    Err(_) => {
                        counting = false;
                        continue;
                    }
                },
                changed = device.changed(), if watching => match changed {
                    Ok(()) => Step::Device(*device.borrow_and_update()),
                    Err(_) => {
                        watching = false;
                        continue;
                    }
                },
                event = bus.recv(), if listening => match event {
                    Ok(event) if event.visitor == visitor && event.kind == EventKind::AuthChanged => {
                        Step::Update(())
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(_)) => Step::Update(()),
                    Err(RecvError::Closed) => {
                        listening = false;
                        continue;
                    }
                },
            };

            let next_device = match step {
                Step::Update(()) => current,
                Step::Device(next) => next,
            };
            let props = HeaderProps::new(*counts.borrow(), Visitor::new(visitor, &state).is_logged_in())
                .with_search(search.clone());
            if props == last && next_device == current {
                continue;
            }
            current = next_device;
            last = props;

            if let Some(frame) = frame(HEADER_EVENT, &last, current) {
                yield frame;
            }
        }
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct LiveQuery {
    #[serde(default)]
    pub search: String,
}

/// The visitor's device watch, refreshed from this request's viewport.
fn device_watch(state: &AppState, visitor: &Visitor, viewport: Viewport) -> watch::Receiver<Device> {
    state.devices().observe(visitor.id, viewport.0);
    state.devices().subscribe(visitor.id)
}

fn loaded<T>(what: &str, result: std::result::Result<T, ApiError>) -> Option<T> {
    result.map_err(|err| degrade(what, &err)).ok()
}

/// Every live region of the home page on one connection.
async fn home(
    State(state): State<AppState>,
    visitor: Visitor,
    viewport: Viewport,
    Query(query): Query<LiveQuery>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let device = device_watch(&state, &visitor, viewport);
    let api = state.api();
    let (banners, items, strips) = tokio::join!(
        api.list_banners(),
        api.list_carousel_items(),
        api.list_sales()
    );

    let cancel = state.shutdown().child_token();
    let mut regions = vec![header_region(
        state.clone(),
        visitor.id,
        query.search,
        device.clone(),
        cancel.clone(),
    )];
    if let Some(banners) = loaded("banners", banners) {
        regions.push(rotating_region(
            HeroProps::new(banners, 0),
            HERO_BANNER_INTERVAL,
            device.clone(),
            HERO_EVENT.to_string(),
            cancel.clone(),
        ));
    }
    if let Some(strips) = loaded("sales", strips) {
        regions.push(sale_region(strips, Clock::start(), device.clone(), cancel.clone()));
    }
    for props in loaded("carousel items", items).map(carousel_slots).unwrap_or_default() {
        let name = carousel_event(props.slot);
        regions.push(rotating_region(
            props,
            PRODUCT_CAROUSEL_INTERVAL,
            device.clone(),
            name,
            cancel.clone(),
        ));
    }

    debug!(visitor = %visitor.id, regions = regions.len(), "home live connection");
    connect(regions, cancel)
}

async fn header(
    State(state): State<AppState>,
    visitor: Visitor,
    viewport: Viewport,
    Query(query): Query<LiveQuery>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let device = device_watch(&state, &visitor, viewport);
    let cancel = state.shutdown().child_token();
    let region = header_region(state, visitor.id, query.search, device, cancel.clone());
    connect(vec![region], cancel)
}

async fn hero(
    State(state): State<AppState>,
    visitor: Visitor,
    viewport: Viewport,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let device = device_watch(&state, &visitor, viewport);
    let banners = state.api().list_banners().await?;
    let cancel = state.shutdown().child_token();
    let region = rotating_region(
        HeroProps::new(banners, 0),
        HERO_BANNER_INTERVAL,
        device,
        HERO_EVENT.to_string(),
        cancel.clone(),
    );
    Ok(connect(vec![region], cancel))
}

async fn sales(
    State(state): State<AppState>,
    visitor: Visitor,
    viewport: Viewport,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let device = device_watch(&state, &visitor, viewport);
    let strips = state.api().list_sales().await?;
    let cancel = state.shutdown().child_token();
    let region = sale_region(strips, Clock::start(), device, cancel.clone());
    Ok(connect(vec![region], cancel))
}

async fn carousel(
    State(state): State<AppState>,
    visitor: Visitor,
    viewport: Viewport,
    Path(slot): Path<usize>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let device = device_watch(&state, &visitor, viewport);
    let items = state.api().list_carousel_items().await?;
    let props: CarouselProps = carousel_slots(items)
        .into_iter()
        .nth(slot)
        .ok_or_else(|| AppError::NotFound(format!("Carousel {slot}")))?;

    let cancel = state.shutdown().child_token();
    let region = rotating_region(
        props,
        PRODUCT_CAROUSEL_INTERVAL,
        device,
        carousel_event(slot),
        cancel.clone(),
    );
    Ok(connect(vec![region], cancel))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use threadline_client::Banner;
    use threadline_core::{BannerId, SaleId};
    use tokio::time::Instant;

    use super::*;
    use crate::config::StorefrontConfig;

    fn banner(id: i64, title: &str) -> Banner {
        Banner {
            id: BannerId::new(id),
            image: format!("/img/{id}.jpg"),
            title: title.to_string(),
            subtitle: None,
            link: None,
            button_text: None,
            active: true,
        }
    }

    fn strip(id: i64, end: &str) -> SaleStrip {
        SaleStrip {
            id: SaleId::new(id),
            title: format!("Sale {id}"),
            description: None,
            discount_text: None,
            link: None,
            start_date: None,
            end_date: Some(end.to_string()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hero_region_rotates_every_five_seconds() {
        let cancel = CancellationToken::new();
        let (_tx, rx) = watch::channel(Device::Mobile);
        let props = HeroProps::new(vec![banner(1, "Sale"), banner(2, "New")], 0);
        let mut region = rotating_region(props, HERO_BANNER_INTERVAL, rx, HERO_EVENT.to_string(), cancel);
        let start = Instant::now();

        let first = region.next().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(first.name, "hero");
        assert!(first.html.contains("New") && !first.html.contains("Sale"));

        let second = region.next().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(10));
        assert!(second.html.contains("Sale"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_device_flip_rerenders_the_other_variant() {
        let cancel = CancellationToken::new();
        let (tx, rx) = watch::channel(Device::Web);
        let props = HeroProps::new(vec![banner(1, "Only")], 0);
        let mut region = rotating_region(props, HERO_BANNER_INTERVAL, rx, HERO_EVENT.to_string(), cancel);

        tx.send_replace(Device::Mobile);
        let flipped = region.next().await.unwrap();
        let expected = frame(HERO_EVENT, &HeroProps::new(vec![banner(1, "Only")], 0), Device::Mobile);
        assert_eq!(Some(flipped), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ended_strips_drop_out_of_the_region() {
        let wall = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();
        let cancel = CancellationToken::new();
        let (_tx, rx) = watch::channel(Device::Web);
        let strips = vec![strip(1, "2026-10-01T12:00:02Z"), strip(2, "2026-10-02T12:00:00Z")];
        let mut region = sale_region(strips, Clock::at(wall), rx, cancel);

        let first = region.next().await.unwrap();
        assert_eq!(first.name, "sale");
        assert!(first.html.contains("Sale 1") && first.html.contains("Sale 2"));

        let second = region.next().await.unwrap();
        assert!(!second.html.contains("Sale 1"));
        assert!(second.html.contains("Sale 2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_upcoming_strip_joins_when_it_starts() {
        let wall = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();
        let cancel = CancellationToken::new();
        let (_tx, rx) = watch::channel(Device::Web);
        let upcoming = SaleStrip {
            start_date: Some("2026-10-01T12:00:02Z".to_string()),
            ..strip(3, "2026-10-03T12:00:00Z")
        };
        let strips = vec![strip(2, "2026-10-02T12:00:00Z"), upcoming];
        let mut region = sale_region(strips, Clock::at(wall), rx, cancel);

        let first = region.next().await.unwrap();
        assert!(first.html.contains("Sale 2"));
        assert!(!first.html.contains("Sale 3"));

        let second = region.next().await.unwrap();
        assert!(second.html.contains("Sale 2") && second.html.contains("Sale 3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_ends_every_region() {
        let cancel = CancellationToken::new();
        let (_tx, rx) = watch::channel(Device::Web);
        let mut region = sale_region(vec![strip(1, "2027-01-01")], Clock::start(), rx, cancel.clone());
        cancel.cancel();
        assert!(region.next().await.is_none());
    }

    #[tokio::test]
    async fn test_header_region_follows_guest_cart_writes() {
        let state = AppState::new(StorefrontConfig::local("http://127.0.0.1:9/api")).unwrap();
        let visitor = Visitor::new(VisitorId::random(), &state);
        let cancel = CancellationToken::new();
        let (_tx, rx) = watch::channel(Device::Web);
        let mut region = header_region(state, visitor.id, String::new(), rx, cancel);

        let cart = threadline_core::guest::GuestCart::new(vec![
            threadline_core::guest::GuestCartLine::new(threadline_core::ProductId::new(7), 4),
        ]);
        tokio::task::yield_now().await;
        visitor.save_guest_cart(&cart).unwrap();

        loop {
            let frame = region.next().await.unwrap();
            assert_eq!(frame.name, "header");
            if frame.html.contains(r#"data-cart-count="4""#) {
                break;
            }
        }
    }

    #[test]
    fn test_carriage_returns_do_not_break_events() {
        let frame = Frame {
            name: "hero".to_string(),
            html: "<p>a</p>\r\n<p>b</p>".to_string(),
        };
        let _event = frame.into_event();
    }
}
