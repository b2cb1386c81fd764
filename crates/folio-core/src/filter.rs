#![forbid(unsafe_code)]

//! Portfolio category filter.
//!
//! Each item runs a small phase machine so the CSS transitions keyed off the
//! `hidden` class get a chance to play:
//!
//! ```text
//!            match                      frame
//!   Hidden ─────────▶ Showing ─────────────────▶ Visible
//!     ▲                  │ ▲                        │
//!     │ hide timer       │ │ match                  │ no match
//!     │ (guarded)        ▼ │                        ▼
//!     └──────────────── Hiding ◀────────────────────┘
//! ```
//!
//! A hide timer only completes the transition when the item is still
//! `Hiding`; a later match always wins over an earlier pending hide.

use tracing::debug;

use crate::effect::{Class, Display, Effect, Target};

/// Filter tag that matches every category.
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemPhase {
    /// Laid out and not marked hidden.
    Visible,
    /// Hidden mark removed; waiting for a frame to re-enter layout.
    Showing,
    /// Marked hidden; exit transition running.
    Hiding,
    /// Out of layout.
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioItem {
    pub category: String,
    pub phase: ItemPhase,
    pub display: Display,
}

/// Follow-up work requested by a filter change.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Immediate DOM changes.
    pub effects: Vec<Effect>,
    /// Items that need a hide timer.
    pub hide_after_delay: Vec<usize>,
    /// Whether a frame callback is needed to finish showing items.
    pub needs_frame: bool,
}

/// Returns whether an item of `category` passes filter `tag`.
#[must_use]
pub fn matches(tag: &str, category: &str) -> bool {
    tag == ALL || tag == category
}

#[derive(Debug, Clone)]
pub struct PortfolioFilter {
    buttons: Vec<String>,
    items: Vec<PortfolioItem>,
    active: Option<usize>,
}

impl PortfolioFilter {
    /// All items start visible. `active` is the button the template marks
    /// `active`, if any; it is the only mark a later selection clears.
    #[must_use]
    pub fn new(buttons: Vec<String>, categories: Vec<String>, active: Option<usize>) -> Self {
        let active = active.filter(|i| *i < buttons.len());
        let items = categories
            .into_iter()
            .map(|category| PortfolioItem {
                category,
                phase: ItemPhase::Visible,
                display: Display::Block,
            })
            .collect();
        Self {
            buttons,
            items,
            active,
        }
    }

    #[must_use]
    pub fn active_button(&self) -> Option<usize> {
        self.active
    }

    /// Currently selected tag; `"all"` until a button is chosen.
    #[must_use]
    pub fn active_tag(&self) -> &str {
        self.active
            .and_then(|i| self.buttons.get(i))
            .map_or(ALL, String::as_str)
    }

    #[must_use]
    pub fn items(&self) -> &[PortfolioItem] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<&PortfolioItem> {
        self.items.get(index)
    }

    /// Indices of items that are fully visible.
    #[must_use]
    pub fn visible_items(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.phase == ItemPhase::Visible)
            .map(|(i, _)| i)
            .collect()
    }

    /// Handle a click on filter button `button`.
    ///
    /// Returns `None` when the index does not name a button.
    pub fn select(&mut self, button: usize) -> Option<FilterOutcome> {
        let tag = self.buttons.get(button)?.clone();
        let mut out = FilterOutcome::default();

        for i in 0..self.buttons.len() {
            if i != button && self.active == Some(i) {
                out.effects
                    .push(Effect::class(Target::FilterButton(i), Class::Active, false));
            }
        }
        if self.active != Some(button) {
            out.effects
                .push(Effect::class(Target::FilterButton(button), Class::Active, true));
        }
        self.active = Some(button);

        for (i, item) in self.items.iter_mut().enumerate() {
            let target = Target::PortfolioItem(i);
            if matches(&tag, &item.category) {
                if item.phase != ItemPhase::Visible {
                    if matches!(item.phase, ItemPhase::Hiding | ItemPhase::Hidden) {
                        out.effects.push(Effect::class(target, Class::Hidden, false));
                    }
                    item.phase = ItemPhase::Showing;
                    out.needs_frame = true;
                }
            } else if item.phase != ItemPhase::Hidden {
                if item.phase != ItemPhase::Hiding {
                    out.effects.push(Effect::class(target, Class::Hidden, true));
                }
                item.phase = ItemPhase::Hiding;
                out.hide_after_delay.push(i);
            }
        }

        debug!(
            tag = %tag,
            showing = out.needs_frame,
            hiding = out.hide_after_delay.len(),
            "portfolio filter selected"
        );
        Some(out)
    }

    /// Frame callback: every item still `Showing` re-enters layout.
    pub fn finish_showing(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        for (i, item) in self.items.iter_mut().enumerate() {
            if item.phase != ItemPhase::Showing {
                continue;
            }
            item.phase = ItemPhase::Visible;
            if item.display != Display::Block {
                item.display = Display::Block;
                effects.push(Effect::display(Target::PortfolioItem(i), Display::Block));
            }
        }
        effects
    }

    /// Hide-timer callback for item `index`. Only an item still `Hiding`
    /// leaves the layout.
    pub fn finish_hiding(&mut self, index: usize) -> Option<Effect> {
        let item = self.items.get_mut(index)?;
        if item.phase != ItemPhase::Hiding {
            debug!(item = index, phase = ?item.phase, "stale hide timer ignored");
            return None;
        }
        item.phase = ItemPhase::Hidden;
        item.display = Display::None;
        Some(Effect::display(Target::PortfolioItem(index), Display::None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filter() -> PortfolioFilter {
        PortfolioFilter::new(
            vec!["all".into(), "web".into(), "print".into()],
            vec!["web".into(), "print".into(), "web".into()],
            Some(0),
        )
    }

    #[test]
    fn starts_with_all_active_and_everything_visible() {
        let f = filter();
        assert_eq!(f.active_button(), Some(0));
        assert_eq!(f.active_tag(), "all");
        assert_eq!(f.visible_items(), vec![0, 1, 2]);
    }

    #[test]
    fn select_marks_hidden_and_requests_timers() {
        let mut f = filter();
        let out = f.select(1).unwrap();
        assert_eq!(
            out.effects,
            vec![
                Effect::class(Target::FilterButton(0), Class::Active, false),
                Effect::class(Target::FilterButton(1), Class::Active, true),
                Effect::class(Target::PortfolioItem(1), Class::Hidden, true),
            ]
        );
        assert_eq!(out.hide_after_delay, vec![1]);
        assert!(!out.needs_frame);
        assert_eq!(f.item(1).unwrap().phase, ItemPhase::Hiding);

        assert_eq!(
            f.finish_hiding(1),
            Some(Effect::display(Target::PortfolioItem(1), Display::None))
        );
        assert_eq!(f.visible_items(), vec![0, 2]);
    }

    #[test]
    fn later_show_beats_pending_hide() {
        let mut f = filter();
        f.select(1).unwrap();
        let out = f.select(0).unwrap();
        assert!(out.needs_frame);
        assert_eq!(f.item(1).unwrap().phase, ItemPhase::Showing);

        // The hide timer from the first click fires after the re-match.
        assert_eq!(f.finish_hiding(1), None);
        // Display never left block, so the frame has nothing to write.
        assert!(f.finish_showing().is_empty());
        assert_eq!(f.visible_items(), vec![0, 1, 2]);
    }

    #[test]
    fn hidden_item_returns_through_frame() {
        let mut f = filter();
        f.select(2).unwrap();
        f.finish_hiding(0);
        f.finish_hiding(2);
        assert_eq!(f.visible_items(), vec![1]);

        let out = f.select(1).unwrap();
        assert!(out.effects.contains(&Effect::class(
            Target::PortfolioItem(0),
            Class::Hidden,
            false
        )));
        assert_eq!(
            f.finish_showing(),
            vec![
                Effect::display(Target::PortfolioItem(0), Display::Block),
                Effect::display(Target::PortfolioItem(2), Display::Block),
            ]
        );
    }

    #[test]
    fn unknown_button_is_rejected() {
        let mut f = filter();
        assert!(f.select(9).is_none());
        assert_eq!(f.active_button(), Some(0));
    }

    #[test]
    fn unmarked_template_gets_a_mark_on_first_click() {
        let mut f = PortfolioFilter::new(
            vec!["all".into(), "web".into()],
            vec!["web".into()],
            None,
        );
        assert_eq!(f.active_button(), None);
        assert_eq!(f.active_tag(), "all");
        let out = f.select(0).unwrap();
        assert_eq!(
            out.effects,
            vec![Effect::class(Target::FilterButton(0), Class::Active, true)]
        );
        assert_eq!(f.active_button(), Some(0));
    }

    #[test]
    fn template_mark_on_other_button_is_cleared() {
        let mut f = PortfolioFilter::new(
            vec!["all".into(), "web".into()],
            vec!["web".into()],
            Some(1),
        );
        assert_eq!(f.active_tag(), "web");
        let out = f.select(0).unwrap();
        assert_eq!(
            out.effects,
            vec![
                Effect::class(Target::FilterButton(1), Class::Active, false),
                Effect::class(Target::FilterButton(0), Class::Active, true),
            ]
        );
    }

    #[test]
    fn reselecting_same_button_is_quiet() {
        let mut f = filter();
        let out = f.select(0).unwrap();
        assert!(out.effects.is_empty());
        assert!(!out.needs_frame);
    }
}
