#![forbid(unsafe_code)]

//! Navbar styling, mobile menu, and active-link tracking.

use tracing::trace;

use crate::effect::{Class, Effect, Target};
use crate::markup::Layout;

#[derive(Debug, Clone)]
pub struct Navigation {
    /// `href` of each nav link.
    links: Vec<String>,
    active_link: Option<usize>,
    scrolled: bool,
    menu_open: bool,
    scrolled_px: f64,
    lookahead_px: f64,
}

/// Id of the last section, in document order, whose top is at or above
/// `scroll_y + lookahead`.
#[must_use]
pub fn current_section(layout: &Layout, scroll_y: f64, lookahead: f64) -> Option<&str> {
    layout
        .sections
        .iter()
        .rev()
        .find(|s| s.top <= scroll_y + lookahead)
        .map(|s| s.id.as_str())
}

impl Navigation {
    /// `active_link` is the link the template already marks `active`.
    #[must_use]
    pub fn new(
        links: Vec<String>,
        active_link: Option<usize>,
        scrolled_px: f64,
        lookahead_px: f64,
    ) -> Self {
        let active_link = active_link.filter(|i| *i < links.len());
        Self {
            links,
            active_link,
            scrolled: false,
            menu_open: false,
            scrolled_px,
            lookahead_px,
        }
    }

    #[must_use]
    pub fn active_link(&self) -> Option<usize> {
        self.active_link
    }

    #[must_use]
    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    #[must_use]
    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    #[must_use]
    pub fn link_href(&self, index: usize) -> Option<&str> {
        self.links.get(index).map(String::as_str)
    }

    /// Recompute navbar style and active link for a scroll position.
    pub fn on_scroll(&mut self, scroll_y: f64, layout: &Layout) -> Vec<Effect> {
        let mut effects = Vec::new();

        // Strict threshold, no hysteresis.
        let scrolled = scroll_y > self.scrolled_px;
        if scrolled != self.scrolled {
            self.scrolled = scrolled;
            effects.push(Effect::class(Target::Navbar, Class::Scrolled, scrolled));
        }

        let current = current_section(layout, scroll_y, self.lookahead_px);
        let next = current.and_then(|id| {
            self.links
                .iter()
                .position(|href| href.strip_prefix('#') == Some(id))
        });
        trace!(scroll_y, section = ?current, link = ?next, "nav recompute");

        if next != self.active_link {
            if let Some(prev) = self.active_link {
                effects.push(Effect::class(Target::NavLink(prev), Class::Active, false));
            }
            if let Some(link) = next {
                effects.push(Effect::class(Target::NavLink(link), Class::Active, true));
            }
            self.active_link = next;
        }
        effects
    }

    pub fn toggle_menu(&mut self) -> Vec<Effect> {
        self.set_menu(!self.menu_open)
    }

    /// Close the mobile menu. No effects when already closed.
    pub fn close_menu(&mut self) -> Vec<Effect> {
        if self.menu_open {
            self.set_menu(false)
        } else {
            Vec::new()
        }
    }

    fn set_menu(&mut self, open: bool) -> Vec<Effect> {
        self.menu_open = open;
        vec![
            Effect::class(Target::Hamburger, Class::Active, open),
            Effect::class(Target::NavMenu, Class::Active, open),
        ]
    }
}
