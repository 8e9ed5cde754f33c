//! Sale strips with live countdowns.
//!
//! The two variants lay strips out differently: web centers a single strip,
//! puts two side by side and scrolls three or more; mobile always scrolls.

use askama::Template;
use chrono::{DateTime, Utc};

use threadline_client::SaleStrip;
use threadline_core::ui::{ActiveSales, CountdownState, Rotation, SaleLayout};

use crate::dispatch::responsive;

/// Display labels for the countdown fields, in field order.
pub const COUNTDOWN_LABELS: [&str; 4] = ["Days", "Hours", "Minutes", "Seconds"];

/// One strip as displayed at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleView {
    pub strip: SaleStrip,
    pub countdown: CountdownState,
}

impl SaleView {
    /// `(label, value)` pairs: zero-padded, zeros once ended, `--` when unknown.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        COUNTDOWN_LABELS
            .iter()
            .copied()
            .zip(self.countdown.fields())
            .collect()
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self.countdown, CountdownState::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaleProps {
    pub strips: Vec<SaleView>,
    pub rotation: Rotation,
}

impl SaleProps {
    /// Snapshot the active set at `now`.
    #[must_use]
    pub fn snapshot(sales: &ActiveSales<SaleStrip>, now: DateTime<Utc>) -> Self {
        let strips = sales
            .items()
            .iter()
            .cloned()
            .zip(sales.countdowns(now))
            .map(|(strip, countdown)| SaleView { strip, countdown })
            .collect();
        Self {
            strips,
            rotation: sales.rotation(),
        }
    }

    #[must_use]
    pub fn web_layout(&self) -> SaleLayout {
        SaleLayout::for_web(self.strips.len())
    }

    #[must_use]
    pub fn mobile_layout(&self) -> SaleLayout {
        SaleLayout::for_mobile(self.strips.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }
}

#[derive(Template)]
#[template(path = "components/sale_web.html")]
pub struct SaleWeb<'a> {
    pub props: &'a SaleProps,
}

#[derive(Template)]
#[template(path = "components/sale_mobile.html")]
pub struct SaleMobile<'a> {
    pub props: &'a SaleProps,
}

responsive!(SaleProps => SaleWeb, SaleMobile);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use threadline_core::{Device, SaleId};

    use super::*;
    use crate::dispatch::render;

    fn strip(id: i64, end: &str) -> SaleStrip {
        SaleStrip {
            id: SaleId::new(id),
            title: format!("Sale {id}"),
            description: None,
            discount_text: Some("30% OFF".to_string()),
            link: None,
            start_date: None,
            end_date: Some(end.to_string()),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_layout_tiers() {
        let sales = ActiveSales::new(vec![strip(1, "2026-10-02T12:00:00Z")], now());
        let props = SaleProps::snapshot(&sales, now());
        assert_eq!(props.web_layout(), SaleLayout::Centered);
        assert_eq!(props.mobile_layout(), SaleLayout::Scrolling);

        let sales = ActiveSales::new(
            vec![strip(1, "2026-10-02"), strip(2, "2026-10-03")],
            now(),
        );
        assert_eq!(SaleProps::snapshot(&sales, now()).web_layout(), SaleLayout::TwoUp);
    }

    #[test]
    fn test_countdown_fields_render_padded() {
        let sales = ActiveSales::new(vec![strip(1, "2026-10-02T13:02:03Z")], now());
        let props = SaleProps::snapshot(&sales, now());
        let values: Vec<String> = props.strips[0].fields().into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec!["01", "01", "02", "03"]);

        let html = render(&props, Device::Web).unwrap();
        assert!(html.contains("sale-strip--centered"));
        assert!(html.contains("30% OFF"));
    }

    #[test]
    fn test_malformed_end_shows_placeholders() {
        let sales = ActiveSales::new(vec![strip(1, "next tuesday")], now());
        let props = SaleProps::snapshot(&sales, now());
        assert!(props.strips[0].is_unknown());

        let html = render(&props, Device::Mobile).unwrap();
        assert!(html.contains("--"));
        assert!(html.contains("sale-strip--scrolling"));
    }

    #[test]
    fn test_empty_set_renders_no_strip() {
        let props = SaleProps::default();
        assert!(!render(&props, Device::Web).unwrap().contains("sale-strip__item"));
    }
}
