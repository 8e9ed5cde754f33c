//! Cancellable interval timers for live regions.
//!
//! Both streams fire for the first time one full period after they start and
//! end as soon as their cancellation token fires. Live regions hold the token
//! through a `DropGuard`, so closing the connection stops the timer.

use std::time::Duration;

use async_stream::stream;
use chrono::{DateTime, TimeDelta, Utc};
use futures::Stream;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use threadline_core::ui::Rotation;

/// Countdown refresh period.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Wall clock that advances with the tokio clock.
///
/// Countdowns read the time from here so a paused runtime moves them too.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    wall: DateTime<Utc>,
    start: Instant,
}

impl Clock {
    #[must_use]
    pub fn start() -> Self {
        Self::at(Utc::now())
    }

    #[must_use]
    pub fn at(wall: DateTime<Utc>) -> Self {
        Self {
            wall,
            start: Instant::now(),
        }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.start.elapsed()).unwrap_or_else(|_| TimeDelta::zero());
        self.wall + elapsed
    }
}

/// One item per elapsed `period` until `cancel` fires.
pub fn ticks(period: Duration, cancel: CancellationToken) -> impl Stream<Item = Instant> {
    stream! {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let tick = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                at = interval.tick() => Some(at),
            };
            match tick {
                Some(at) => yield at,
                None => break,
            }
        }
    }
}

/// Advance `rotation` once per `period`, yielding each new position.
///
/// Ends immediately when the rotation is not running (one item or none).
pub fn rotate(
    mut rotation: Rotation,
    period: Duration,
    cancel: CancellationToken,
) -> impl Stream<Item = Rotation> {
    stream! {
        if !rotation.is_running() {
            return;
        }

        for await _ in ticks(period, cancel) {
            rotation.advance();
            yield rotation;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::pin::pin;

    use futures::StreamExt;
    use threadline_core::ui::rotation::{HERO_BANNER_INTERVAL, PRODUCT_CAROUSEL_INTERVAL};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_two_banners_alternate_every_five_seconds() {
        let cancel = CancellationToken::new();
        let start = Instant::now();
        let mut stream = pin!(rotate(Rotation::new(2), HERO_BANNER_INTERVAL, cancel.clone()));

        let first = stream.next().await.unwrap();
        assert_eq!(first.index(), 1);
        assert_eq!(start.elapsed(), Duration::from_secs(5));

        let second = stream.next().await.unwrap();
        assert_eq!(second.index(), 0);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rotation_advances_one_step_per_interval() {
        let cancel = CancellationToken::new();
        let stream = rotate(Rotation::new(3), PRODUCT_CAROUSEL_INTERVAL, cancel);
        let indices: Vec<usize> = stream.take(5).map(|r| r.index()).collect().await;
        assert_eq!(indices, vec![1, 2, 0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_item_never_rotates() {
        let cancel = CancellationToken::new();
        let mut stream = pin!(rotate(Rotation::new(1), HERO_BANNER_INTERVAL, cancel));
        assert!(stream.next().await.is_none());

        let mut empty = pin!(rotate(Rotation::new(0), HERO_BANNER_INTERVAL, CancellationToken::new()));
        assert!(empty.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_the_timer() {
        let cancel = CancellationToken::new();
        let mut stream = pin!(ticks(COUNTDOWN_TICK, cancel.clone()));
        assert!(stream.next().await.is_some());

        cancel.cancel();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_follows_paused_time() {
        let clock = Clock::start();
        let before = clock.now();
        tokio::time::advance(Duration::from_secs(90)).await;
        assert_eq!((clock.now() - before).num_seconds(), 90);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_guard_cancels() {
        let cancel = CancellationToken::new();
        let guard = cancel.clone().drop_guard();
        let mut stream = pin!(ticks(COUNTDOWN_TICK, cancel));

        drop(guard);
        assert!(stream.next().await.is_none());
    }
}
