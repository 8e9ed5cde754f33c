//! Hero banner slideshow.

use askama::Template;

use threadline_client::Banner;
use threadline_core::ui::Rotation;

use super::Rotating;
use crate::dispatch::responsive;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroProps {
    pub banners: Vec<Banner>,
    pub rotation: Rotation,
}

impl HeroProps {
    /// Active banners only, starting at `index` (clamped to 0 when out of range).
    #[must_use]
    pub fn new(banners: Vec<Banner>, index: usize) -> Self {
        let banners: Vec<Banner> = banners.into_iter().filter(|b| b.active).collect();
        let rotation = Rotation::at(index, banners.len());
        Self { banners, rotation }
    }

    #[must_use]
    pub fn current(&self) -> Option<&Banner> {
        self.banners.get(self.rotation.index())
    }
}

impl Rotating for HeroProps {
    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }
}

#[derive(Template)]
#[template(path = "components/hero_web.html")]
pub struct HeroWeb<'a> {
    pub props: &'a HeroProps,
}

#[derive(Template)]
#[template(path = "components/hero_mobile.html")]
pub struct HeroMobile<'a> {
    pub props: &'a HeroProps,
}

responsive!(HeroProps => HeroWeb, HeroMobile);
