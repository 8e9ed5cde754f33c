//! Sale strip rotation set and layout.
//!
//! A sale strip joins the active set once its start time has passed and stays
//! until its countdown reaches zero. On the tick where that happens it is
//! dropped and the rotation index is clamped so it never points past the
//! shrunken set.

use chrono::{DateTime, Utc};

use super::countdown::CountdownState;
use super::rotation::Rotation;

/// Something with an optional start and end timestamp.
pub trait Timed {
    /// `None` when the end timestamp is missing or malformed.
    fn ends_at(&self) -> Option<DateTime<Utc>>;

    /// `None` means already running.
    fn starts_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

fn has_started<T: Timed>(item: &T, now: DateTime<Utc>) -> bool {
    item.starts_at().is_none_or(|start| start <= now)
}

fn has_ended<T: Timed>(item: &T, now: DateTime<Utc>) -> bool {
    CountdownState::evaluate(item.ends_at(), now).is_ended()
}

/// How the web sale strip lays out its active strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleLayout {
    /// One strip, centered.
    Centered,
    /// Two strips side by side.
    TwoUp,
    /// Three or more strips in a horizontally scrolling track.
    Scrolling,
}

impl SaleLayout {
    /// Three-tier layout used by the web variant.
    #[must_use]
    pub const fn for_web(active: usize) -> Self {
        match active {
            0 | 1 => Self::Centered,
            2 => Self::TwoUp,
            _ => Self::Scrolling,
        }
    }

    /// The mobile variant always scrolls, regardless of count.
    #[must_use]
    pub const fn for_mobile(_active: usize) -> Self {
        Self::Scrolling
    }

    /// CSS modifier used by templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Centered => "centered",
            Self::TwoUp => "two-up",
            Self::Scrolling => "scrolling",
        }
    }
}

/// Sale strips still counting down, plus the rotation over them.
///
/// Strips that have not started yet wait outside the rotation until
/// [`ActiveSales::prune`] sees their start time pass.
#[derive(Debug, Clone)]
pub struct ActiveSales<T> {
    items: Vec<T>,
    upcoming: Vec<T>,
    rotation: Rotation,
}

impl<T: Timed> ActiveSales<T> {
    /// Build the active set, discarding strips that already ended at `now`
    /// and holding back those that have not started.
    #[must_use]
    pub fn new(items: Vec<T>, now: DateTime<Utc>) -> Self {
        let (items, upcoming): (Vec<T>, Vec<T>) = items
            .into_iter()
            .filter(|item| !has_ended(item, now))
            .partition(|item| has_started(item, now));
        let rotation = Rotation::new(items.len());
        Self {
            items,
            upcoming,
            rotation,
        }
    }

    /// Resume at a previously displayed index.
    #[must_use]
    pub fn resume_at(mut self, index: usize) -> Self {
        self.rotation = Rotation::at(index, self.items.len());
        self
    }

    /// Drop strips that ended at `now` and admit those that started.
    /// Returns how many were removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !has_ended(item, now));
        let removed = before - self.items.len();

        self.upcoming.retain(|item| !has_ended(item, now));
        let (started, waiting): (Vec<T>, Vec<T>) = std::mem::take(&mut self.upcoming)
            .into_iter()
            .partition(|item| has_started(item, now));
        self.upcoming = waiting;
        let admitted = started.len();
        self.items.extend(started);

        if removed > 0 || admitted > 0 {
            self.rotation.resize(self.items.len());
        }
        removed
    }

    /// Strips waiting for their start time.
    #[must_use]
    pub fn upcoming(&self) -> &[T] {
        &self.upcoming
    }

    /// Countdown for every active strip at `now`, in display order.
    #[must_use]
    pub fn countdowns(&self, now: DateTime<Utc>) -> Vec<CountdownState> {
        self.items
            .iter()
            .map(|item| CountdownState::evaluate(item.ends_at(), now))
            .collect()
    }

    /// Advance the rotation by one strip.
    pub const fn advance(&mut self) -> usize {
        self.rotation.advance()
    }

    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.items.get(self.rotation.index())
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Nothing running and nothing left to start.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.items.is_empty() && self.upcoming.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Strip {
        id: u32,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    }

    impl Timed for Strip {
        fn ends_at(&self) -> Option<DateTime<Utc>> {
            self.end
        }

        fn starts_at(&self) -> Option<DateTime<Utc>> {
            self.start
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn strip(id: u32, secs_left: i64) -> Strip {
        Strip {
            id,
            start: None,
            end: Some(now() + Duration::seconds(secs_left)),
        }
    }

    fn later_strip(id: u32, starts_in: i64, secs_left: i64) -> Strip {
        Strip {
            start: Some(now() + Duration::seconds(starts_in)),
            ..strip(id, secs_left)
        }
    }

    #[test]
    fn test_new_drops_already_ended() {
        let sales = ActiveSales::new(vec![strip(1, -5), strip(2, 60)], now());
        assert_eq!(sales.len(), 1);
        assert_eq!(sales.current().unwrap().id, 2);
    }

    #[test]
    fn test_malformed_end_stays_active() {
        let sales = ActiveSales::new(
            vec![Strip {
                id: 1,
                start: None,
                end: None,
            }],
            now(),
        );
        assert_eq!(sales.len(), 1);
        assert_eq!(sales.countdowns(now()), vec![CountdownState::Unknown]);
    }

    #[test]
    fn test_prune_removes_on_next_tick_and_clamps_index() {
        let mut sales =
            ActiveSales::new(vec![strip(1, 600), strip(2, 600), strip(3, 1)], now()).resume_at(2);
        assert_eq!(sales.current().unwrap().id, 3);

        let later = now() + Duration::seconds(1);
        assert_eq!(sales.prune(later), 1);
        assert_eq!(sales.len(), 2);
        assert_eq!(sales.rotation().index(), 0);
        assert_eq!(sales.current().unwrap().id, 1);
    }

    #[test]
    fn test_prune_keeps_index_when_still_in_range() {
        let mut sales =
            ActiveSales::new(vec![strip(1, 600), strip(2, 600), strip(3, 1)], now()).resume_at(1);
        sales.prune(now() + Duration::seconds(2));
        assert_eq!(sales.current().unwrap().id, 2);
    }

    #[test]
    fn test_upcoming_sale_waits_for_its_start() {
        let mut sales = ActiveSales::new(vec![strip(1, 600), later_strip(2, 30, 3600)], now());
        assert_eq!(sales.len(), 1);
        assert_eq!(sales.upcoming().len(), 1);
        assert_eq!(sales.current().unwrap().id, 1);

        assert_eq!(sales.prune(now() + Duration::seconds(29)), 0);
        assert_eq!(sales.len(), 1);

        assert_eq!(sales.prune(now() + Duration::seconds(30)), 0);
        assert_eq!(sales.len(), 2);
        assert!(sales.upcoming().is_empty());
        assert_eq!(sales.items()[1].id, 2);
    }

    #[test]
    fn test_sale_ending_before_it_starts_is_never_shown() {
        let mut sales = ActiveSales::new(vec![later_strip(1, 60, 30)], now());
        assert!(sales.is_empty());
        assert!(!sales.is_exhausted());
        sales.prune(now() + Duration::seconds(90));
        assert!(sales.is_exhausted());
    }

    #[test]
    fn test_web_layout_tiers() {
        assert_eq!(SaleLayout::for_web(1), SaleLayout::Centered);
        assert_eq!(SaleLayout::for_web(2), SaleLayout::TwoUp);
        assert_eq!(SaleLayout::for_web(3), SaleLayout::Scrolling);
        assert_eq!(SaleLayout::for_web(7), SaleLayout::Scrolling);
    }

    #[test]
    fn test_mobile_layout_always_scrolls() {
        for count in 0..5 {
            assert_eq!(SaleLayout::for_mobile(count), SaleLayout::Scrolling);
        }
    }
}
