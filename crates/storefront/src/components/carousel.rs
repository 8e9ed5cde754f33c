//! Per-category product carousels.

use askama::Template;

use threadline_client::CarouselItem;
use threadline_core::ui::Rotation;

use super::Rotating;
use crate::dispatch::responsive;
use crate::filters;

/// Slides shown at once by the web variant.
pub const WEB_WINDOW: usize = 4;

/// Heading for items without a category.
pub const DEFAULT_CAROUSEL_TITLE: &str = "Featured";

#[derive(Debug, Clone, PartialEq)]
pub struct CarouselProps {
    /// Position of this carousel on the home page; its live region path.
    pub slot: usize,
    pub title: String,
    pub items: Vec<CarouselItem>,
    pub rotation: Rotation,
}

impl CarouselProps {
    #[must_use]
    pub fn new(slot: usize, title: impl Into<String>, items: Vec<CarouselItem>) -> Self {
        let rotation = Rotation::new(items.len());
        Self {
            slot,
            title: title.into(),
            items,
            rotation,
        }
    }

    /// Up to `size` items starting at the current index, wrapping around.
    #[must_use]
    pub fn window(&self, size: usize) -> Vec<&CarouselItem> {
        let len = self.items.len();
        (0..size.min(len))
            .filter_map(|offset| self.items.get((self.rotation.index() + offset) % len))
            .collect()
    }

    #[must_use]
    pub fn web_window(&self) -> Vec<&CarouselItem> {
        self.window(WEB_WINDOW)
    }

    #[must_use]
    pub fn current(&self) -> Option<&CarouselItem> {
        self.items.get(self.rotation.index())
    }
}

impl Rotating for CarouselProps {
    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }
}

/// Group carousel items by category, in order of first appearance.
#[must_use]
pub fn carousel_slots(items: Vec<CarouselItem>) -> Vec<CarouselProps> {
    let mut groups: Vec<(String, Vec<CarouselItem>)> = Vec::new();
    for item in items {
        let title = item
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CAROUSEL_TITLE)
            .to_string();
        match groups.iter_mut().find(|(t, _)| *t == title) {
            Some((_, group)) => group.push(item),
            None => groups.push((title, vec![item])),
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(slot, (title, items))| CarouselProps::new(slot, title, items))
        .collect()
}

#[derive(Template)]
#[template(path = "components/carousel_web.html")]
pub struct CarouselWeb<'a> {
    pub props: &'a CarouselProps,
}

#[derive(Template)]
#[template(path = "components/carousel_mobile.html")]
pub struct CarouselMobile<'a> {
    pub props: &'a CarouselProps,
}

responsive!(CarouselProps => CarouselWeb, CarouselMobile);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use threadline_core::{CarouselItemId, Device};

    use super::*;
    use crate::dispatch::render;

    fn item(id: i64, category: Option<&str>) -> CarouselItem {
        CarouselItem {
            id: CarouselItemId::new(id),
            image: format!("/img/{id}.jpg"),
            title: format!("Item {id}"),
            description: None,
            price: None,
            link: None,
            category: category.map(str::to_string),
            product_id: None,
        }
    }

    #[test]
    fn test_items_group_by_category_in_first_seen_order() {
        let slots = carousel_slots(vec![
            item(1, Some("Dresses")),
            item(2, None),
            item(3, Some("Dresses")),
            item(4, Some("  ")),
        ]);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].title, "Dresses");
        assert_eq!(slots[0].items.len(), 2);
        assert_eq!(slots[1].title, DEFAULT_CAROUSEL_TITLE);
        assert_eq!(slots[1].slot, 1);
    }

    #[test]
    fn test_window_wraps_around() {
        let mut props = CarouselProps::new(0, "All", (1..=5).map(|i| item(i, None)).collect());
        props.rotation.select(3);
        let ids: Vec<i64> = props.window(4).iter().map(|i| i.id.as_i64()).collect();
        assert_eq!(ids, vec![4, 5, 1, 2]);
    }

    #[test]
    fn test_window_never_repeats_short_lists() {
        let props = CarouselProps::new(0, "All", vec![item(1, None), item(2, None)]);
        assert_eq!(props.window(4).len(), 2);
        assert!(CarouselProps::new(0, "None", Vec::new()).window(4).is_empty());
    }

    #[test]
    fn test_variants_share_the_rotation() {
        let mut props = CarouselProps::new(2, "All", (1..=3).map(|i| item(i, None)).collect());
        props.rotation.advance();
        let mobile = render(&props, Device::Mobile).unwrap();
        assert!(mobile.contains("Item 2"));
        assert!(!mobile.contains("Item 1"));
        assert!(render(&props, Device::Web).unwrap().contains("Item 1"));
    }
}
