//! Site header: navigation, search, cart and compare badges.

use askama::Template;
use askama_web::WebTemplate;

use threadline_core::ui::Disclosure;
use threadline_core::ui::sticky::STICKY_OFFSET_PX;

use crate::dispatch::responsive;
use crate::hooks::HeaderCounts;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderProps {
    pub counts: HeaderCounts,
    pub logged_in: bool,
    /// Current product search, echoed into the search box.
    pub search: String,
    /// Mobile menu drawer; always closed on web.
    pub menu: Disclosure,
}

impl HeaderProps {
    #[must_use]
    pub fn new(counts: HeaderCounts, logged_in: bool) -> Self {
        Self {
            counts,
            logged_in,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Scroll offset the page script uses to toggle the sticky class.
    #[must_use]
    pub fn sticky_offset(&self) -> f64 {
        STICKY_OFFSET_PX
    }
}

#[derive(Template)]
#[template(path = "components/header_web.html")]
pub struct HeaderWeb<'a> {
    pub props: &'a HeaderProps,
}

#[derive(Template)]
#[template(path = "components/header_mobile.html")]
pub struct HeaderMobile<'a> {
    pub props: &'a HeaderProps,
}

responsive!(HeaderProps => HeaderWeb, HeaderMobile);

/// The mobile menu drawer, swapped on its own when toggled.
#[derive(Debug, Clone, Copy, Template, WebTemplate)]
#[template(path = "components/mobile_menu.html")]
pub struct MobileMenu {
    pub menu: Disclosure,
    pub logged_in: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use threadline_core::Device;

    use super::*;
    use crate::dispatch::render;

    #[test]
    fn test_both_variants_show_the_same_counts() {
        let props = HeaderProps::new(HeaderCounts { cart: 3, compare: 2 }, false);

        let web = render(&props, Device::Web).unwrap();
        let mobile = render(&props, Device::Mobile).unwrap();

        for html in [&web, &mobile] {
            assert!(html.contains(r#"data-cart-count="3""#));
            assert!(html.contains(r#"data-compare-count="2""#));
        }
        assert!(web.contains("header--web"));
        assert!(mobile.contains("header--mobile"));
    }

    #[test]
    fn test_menu_toggle_link_flips_state() {
        let closed = MobileMenu {
            menu: Disclosure::new(false),
            logged_in: false,
        }
        .render()
        .unwrap();
        assert!(closed.contains("/ui/menu?open=true"));

        let open = MobileMenu {
            menu: Disclosure::new(true),
            logged_in: true,
        }
        .render()
        .unwrap();
        assert!(open.contains("/ui/menu?open=false"));
        assert!(open.contains("/account/orders"));
    }
}
