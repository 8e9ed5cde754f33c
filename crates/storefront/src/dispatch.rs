//! Web/mobile variant selection.
//!
//! Each device-adaptive feature has one props type that implements
//! [`Responsive`]. Its two variants are templates that borrow the same props,
//! so they can only differ in markup, never in the data they receive.

use askama::Template;

use threadline_core::Device;

/// A props contract with a web and a mobile rendering.
pub trait Responsive {
    type Web<'a>: Template
    where
        Self: 'a;
    type Mobile<'a>: Template
    where
        Self: 'a;

    fn web(&self) -> Self::Web<'_>;
    fn mobile(&self) -> Self::Mobile<'_>;
}

/// Render exactly one variant of `props` for `device`.
///
/// # Errors
///
/// Returns the template error if rendering fails.
pub fn render<P: Responsive + ?Sized>(props: &P, device: Device) -> askama::Result<String> {
    match device {
        Device::Web => props.web().render(),
        Device::Mobile => props.mobile().render(),
    }
}

/// Implement [`Responsive`] for a props type whose variants are templates
/// holding a single `props` reference.
macro_rules! responsive {
    ($props:ty => $web:ident, $mobile:ident) => {
        impl $crate::dispatch::Responsive for $props {
            type Web<'a> = $web<'a>;
            type Mobile<'a> = $mobile<'a>;

            fn web(&self) -> Self::Web<'_> {
                $web { props: self }
            }

            fn mobile(&self) -> Self::Mobile<'_> {
                $mobile { props: self }
            }
        }
    };
}

pub(crate) use responsive;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Greeting {
        name: String,
    }

    #[derive(Template)]
    #[template(source = "<h1>Hello, {{ props.name }}</h1>", ext = "html")]
    struct GreetingWeb<'a> {
        props: &'a Greeting,
    }

    #[derive(Template)]
    #[template(source = "<p>Hi {{ props.name }}</p>", ext = "html")]
    struct GreetingMobile<'a> {
        props: &'a Greeting,
    }

    responsive!(Greeting => GreetingWeb, GreetingMobile);

    #[test]
    fn test_device_selects_exactly_one_variant() {
        let props = Greeting {
            name: "Ada".to_string(),
        };
        assert_eq!(render(&props, Device::Web).unwrap(), "<h1>Hello, Ada</h1>");
        assert_eq!(render(&props, Device::Mobile).unwrap(), "<p>Hi Ada</p>");
    }
}
