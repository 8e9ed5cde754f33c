//! Viewport width classification.
//!
//! Every device-adaptive feature asks one question: is this viewport narrow
//! enough to get the mobile presentation? The answer is a pure function of the
//! width; the observable store that feeds widths in lives in the storefront.

use serde::{Deserialize, Serialize};

/// Widest viewport, in CSS pixels, that still renders the mobile variant.
pub const MOBILE_MAX_WIDTH_PX: u32 = 768;

/// Presentation class for a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Mobile,
    /// Also the answer when no viewport is known (server rendering).
    #[default]
    Web,
}

impl Device {
    /// Classify a known viewport width.
    #[must_use]
    pub const fn from_width(width: u32) -> Self {
        if width <= MOBILE_MAX_WIDTH_PX {
            Self::Mobile
        } else {
            Self::Web
        }
    }

    /// Classify an optional width, falling back to [`Device::Web`].
    #[must_use]
    pub const fn from_viewport(width: Option<u32>) -> Self {
        match width {
            Some(width) => Self::from_width(width),
            None => Self::Web,
        }
    }

    #[must_use]
    pub const fn is_mobile(self) -> bool {
        matches!(self, Self::Mobile)
    }

    /// Lowercase name, used as a CSS hook in templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Web => "web",
        }
    }
}
