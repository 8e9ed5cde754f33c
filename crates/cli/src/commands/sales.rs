//! Live sale countdown in the terminal.
//!
//! One frame per second for the strip currently in rotation; the rotation
//! advances every [`SALE_STRIP_INTERVAL`]. Strips drop out as they end and
//! join once they start. While nothing is running the frame counts down to
//! the next start, and the watch stops once no sale is left at all.

use std::io::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{Instant, MissedTickBehavior, interval};

use threadline_client::{ApiClient, SaleStrip};
use threadline_core::ui::rotation::SALE_STRIP_INTERVAL;
use threadline_core::ui::{ActiveSales, CountdownState, Timed};

use super::CliError;

const FRAME_INTERVAL: Duration = Duration::from_secs(1);

fn clock_fields(state: CountdownState) -> String {
    let [days, hours, minutes, seconds] = state.fields();
    format!("{days}d {hours}h {minutes}m {seconds}s")
}

/// One line for the strip in rotation at `now`, or for the next sale to
/// start when none is running.
#[must_use]
pub fn render_frame(sales: &ActiveSales<SaleStrip>, now: DateTime<Utc>) -> Option<String> {
    let Some(strip) = sales.current() else {
        let next = sales.upcoming().iter().min_by_key(|strip| strip.starts_at())?;
        return Some(format!(
            "{} starts in {}",
            next.title,
            clock_fields(CountdownState::evaluate(next.starts_at(), now))
        ));
    };
    let mut line = strip.title.clone();
    if let Some(offer) = strip.discount_text.as_deref().filter(|t| !t.is_empty()) {
        line.push_str(" - ");
        line.push_str(offer);
    }
    line.push_str("  ");
    line.push_str(&clock_fields(CountdownState::evaluate(strip.ends_at(), now)));
    if sales.len() > 1 {
        line.push_str(&format!("  [{}/{}]", sales.rotation().index() + 1, sales.len()));
    }
    Some(line)
}

/// Fetch the sale strips and count them down.
///
/// Stops after `frames` frames when given, otherwise when every sale has
/// ended or on Ctrl+C.
///
/// # Errors
///
/// Returns an error if the sales cannot be fetched or output cannot be written.
pub async fn watch(api: &ApiClient, frames: Option<u64>, out: &mut impl Write) -> Result<(), CliError> {
    let strips = api.list_sales().await?;
    tracing::debug!(count = strips.len(), "sales fetched");
    run(strips, Utc::now(), frames, out).await
}

async fn run(
    strips: Vec<SaleStrip>,
    started: DateTime<Utc>,
    frames: Option<u64>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut sales = ActiveSales::new(strips, started);
    let clock = Instant::now();
    let now = || {
        chrono::Duration::from_std(clock.elapsed()).map_or(started, |elapsed| started + elapsed)
    };

    let mut frame = interval(FRAME_INTERVAL);
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut rotate = interval(SALE_STRIP_INTERVAL);
    rotate.tick().await;

    let mut shown = 0_u64;
    loop {
        tokio::select! {
            _ = frame.tick() => {
                let at = now();
                let ended = sales.prune(at);
                if ended > 0 {
                    tracing::info!(ended, "sale ended");
                }
                let Some(line) = render_frame(&sales, at) else {
                    writeln!(out, "No active sales")?;
                    return Ok(());
                };
                writeln!(out, "{line}")?;
                out.flush()?;

                shown += 1;
                if frames.is_some_and(|limit| shown >= limit) {
                    return Ok(());
                }
            }
            _ = rotate.tick() => {
                sales.advance();
            }
            _ = tokio::signal::ctrl_c() => {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 11, 1, 12, 0, 0).unwrap()
    }

    fn strips(value: serde_json::Value) -> Vec<SaleStrip> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_frame_shows_padded_fields() {
        let sales = ActiveSales::new(
            strips(json!([{
                "_id": 1, "title": "Autumn", "discountText": "30% OFF",
                "endDate": "2026-11-02T14:03:09Z"
            }])),
            start(),
        );
        assert_eq!(
            render_frame(&sales, start()).unwrap(),
            "Autumn - 30% OFF  01d 02h 03m 09s"
        );
    }

    #[test]
    fn test_malformed_end_renders_placeholders() {
        let sales = ActiveSales::new(
            strips(json!([
                {"_id": 1, "title": "Mystery", "endDate": "whenever"},
                {"_id": 2, "title": "Winter", "endDate": "2026-12-01"}
            ])),
            start(),
        );
        assert_eq!(
            render_frame(&sales, start()).unwrap(),
            "Mystery  --d --h --m --s  [1/2]"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_drops_a_sale_once_it_ends() {
        let strips = strips(json!([
            {"_id": 1, "title": "Flash", "endDate": "2026-11-01T12:00:02Z"},
            {"_id": 2, "title": "Weekend", "endDate": "2026-11-03T12:00:00Z"}
        ]));

        let mut out = Vec::new();
        run(strips, start(), Some(4), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Flash  00d 00h 00m 02s  [1/2]");
        assert_eq!(lines[1], "Flash  00d 00h 00m 01s  [1/2]");
        assert_eq!(lines[2], "Weekend  01d 23h 59m 58s");
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_counts_down_to_a_sale_that_has_not_started() {
        let strips = strips(json!([
            {"_id": 1, "title": "Winter", "startDate": "2026-11-01T12:00:02Z",
             "endDate": "2026-11-02T12:00:00Z"}
        ]));

        let mut out = Vec::new();
        run(strips, start(), Some(3), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Winter starts in 00d 00h 00m 02s");
        assert_eq!(lines[1], "Winter starts in 00d 00h 00m 01s");
        assert_eq!(lines[2], "Winter  00d 23h 59m 58s");
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_stops_when_nothing_is_running() {
        let strips = strips(json!([
            {"_id": 1, "title": "Gone", "endDate": "2026-10-01T00:00:00Z"}
        ]));

        let mut out = Vec::new();
        run(strips, start(), None, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No active sales\n");
    }
}
