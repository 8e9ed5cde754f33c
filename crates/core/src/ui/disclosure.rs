//! Open/closed state for menus, modals, and accordions.

/// A single open/closed toggle (menu drawer, modal, dropdown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Disclosure {
    open: bool,
}

impl Disclosure {
    #[must_use]
    pub const fn new(open: bool) -> Self {
        Self { open }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub const fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub const fn open(&mut self) {
        self.open = true;
    }

    pub const fn close(&mut self) {
        self.open = false;
    }

    /// State after one toggle, without mutating.
    #[must_use]
    pub const fn toggled(self) -> Self {
        Self { open: !self.open }
    }
}

/// A group of sections where at most one is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accordion {
    expanded: Option<usize>,
}

impl Accordion {
    #[must_use]
    pub const fn with_expanded(expanded: Option<usize>) -> Self {
        Self { expanded }
    }

    /// Expand `section`, or collapse it if it is already the expanded one.
    pub fn toggle(&mut self, section: usize) {
        self.expanded = if self.expanded == Some(section) {
            None
        } else {
            Some(section)
        };
    }

    #[must_use]
    pub fn is_expanded(&self, section: usize) -> bool {
        self.expanded == Some(section)
    }

    #[must_use]
    pub const fn expanded(&self) -> Option<usize> {
        self.expanded
    }
}
