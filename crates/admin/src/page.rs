//! Layout fields shared by every full admin page.

use crate::components::Toast;
use crate::middleware::AdminSession;

/// One entry in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
}

pub const NAV: [NavItem; 8] = [
    NavItem { href: "/products", label: "Products" },
    NavItem { href: "/categories", label: "Categories" },
    NavItem { href: "/inventory", label: "Inventory" },
    NavItem { href: "/orders", label: "Orders" },
    NavItem { href: "/coupons", label: "Coupons" },
    NavItem { href: "/banners", label: "Banners" },
    NavItem { href: "/carousels", label: "Carousels" },
    NavItem { href: "/sales", label: "Sales" },
];

/// Fields `base.html` reads.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub title: String,
    pub email: String,
    pub current_path: String,
    pub toasts: Vec<Toast>,
}

impl Chrome {
    #[must_use]
    pub fn new(admin: &AdminSession, title: impl Into<String>, current_path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            email: admin.email.clone(),
            current_path: current_path.into(),
            toasts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_toast(mut self, toast: Option<Toast>) -> Self {
        self.toasts.extend(toast);
        self
    }

    #[must_use]
    pub const fn nav(&self) -> &'static [NavItem] {
        &NAV
    }

    /// Whether `item` is the section being viewed.
    #[must_use]
    pub fn is_current(&self, item: &NavItem) -> bool {
        self.current_path == item.href
            || self
                .current_path
                .strip_prefix(item.href)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome(path: &str) -> Chrome {
        Chrome {
            title: "Test".to_string(),
            email: String::new(),
            current_path: path.to_string(),
            toasts: Vec::new(),
        }
    }

    #[test]
    fn test_nested_paths_highlight_their_section() {
        let products = NAV[0];
        assert!(chrome("/products").is_current(&products));
        assert!(chrome("/products/4/content").is_current(&products));
        assert!(!chrome("/product-feeds").is_current(&products));
    }
}
