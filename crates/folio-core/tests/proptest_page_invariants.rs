//! Property-based invariant tests for the page model.
//!
//! Verifies:
//! 1. Filter: after any click sequence and a settle period, visible items are
//!    exactly the items matching the last tag (all items for `"all"`).
//! 2. Filter: exactly one button is active after any click sequence, whatever
//!    the template marked active at load.
//! 3. Filter: hidden-class effects always agree with the final item phase.
//! 4. Nav: the active link is the last section with top <= y + 200, or none.
//! 5. Reveal: revealed elements never revert, whatever the report order.
//! 6. Contact: any empty field rejects without disabling the submit button.
//! 7. Smooth scroll: targets equal section top minus navbar height.

use std::time::Duration;

use folio_core::contact::ContactFields;
use folio_core::filter::{ALL, ItemPhase, matches};
use folio_core::scroll::anchor_target;
use folio_core::{
    Class, Effect, Layout, Markup, PageConfig, PageEvent, PageModel, PageRuntime, SectionLayout,
    Target, start_page,
};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

const TAGS: [&str; 4] = ["web", "mobile", "design", "print"];

fn arb_category() -> impl Strategy<Value = String> {
    prop::sample::select(TAGS.to_vec()).prop_map(str::to_string)
}

fn arb_buttons() -> impl Strategy<Value = Vec<String>> {
    prop::sample::subsequence(TAGS.to_vec(), 1..=TAGS.len()).prop_map(|tags| {
        std::iter::once(ALL.to_string())
            .chain(tags.into_iter().map(str::to_string))
            .collect()
    })
}

/// One user step: click a button, then let some time and frames pass.
fn arb_step(buttons: usize) -> impl Strategy<Value = (usize, u64, bool)> {
    (0..buttons, 0u64..400, any::<bool>())
}

fn arb_layout() -> impl Strategy<Value = Layout> {
    (prop::collection::vec(0.0f64..400.0, 1..8), 0.0f64..120.0).prop_map(|(gaps, navbar)| {
        let mut top = 0.0;
        let sections = gaps
            .into_iter()
            .enumerate()
            .map(|(i, gap)| {
                top += gap;
                SectionLayout {
                    id: format!("s{i}"),
                    top,
                }
            })
            .collect();
        Layout {
            sections,
            anchors: Vec::new(),
            navbar_height: navbar,
        }
    })
}

fn page_for(buttons: Vec<String>, items: Vec<String>) -> PageRuntime<PageModel> {
    let markup = Markup {
        filter_buttons: buttons,
        portfolio_items: items,
        submit_label: "Send".into(),
        fade_in_count: 16,
        ..Markup::default()
    };
    start_page(markup, PageConfig::default()).unwrap()
}

fn settle(rt: &mut PageRuntime<PageModel>) {
    rt.frame();
    rt.advance_time(Duration::from_millis(300));
}

proptest! {
    #[test]
    fn filter_settles_to_last_selection(
        (buttons, items, steps) in arb_buttons().prop_flat_map(|buttons| {
            let n = buttons.len();
            (
                Just(buttons),
                prop::collection::vec(arb_category(), 0..12),
                prop::collection::vec(arb_step(n), 1..10),
            )
        })
    ) {
        let mut rt = page_for(buttons.clone(), items.clone());
        let mut last = 0;
        for (button, wait, frame) in steps {
            rt.push_event(PageEvent::FilterClick { index: button }).unwrap();
            if frame {
                rt.frame();
            }
            rt.advance_time(Duration::from_millis(wait));
            last = button;
        }
        settle(&mut rt);

        let tag = &buttons[last];
        let expected: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, c)| matches(tag, c))
            .map(|(i, _)| i)
            .collect();
        let filter = rt.model().filter();
        prop_assert_eq!(filter.visible_items(), expected);
        for item in filter.items() {
            prop_assert!(matches!(item.phase, ItemPhase::Visible | ItemPhase::Hidden));
        }
        prop_assert_eq!(filter.active_button(), Some(last));
    }

    #[test]
    fn exactly_one_button_carries_active_mark(
        (buttons, marked, clicks) in arb_buttons().prop_flat_map(|buttons| {
            let n = buttons.len();
            (
                Just(buttons),
                prop::option::of(0..n),
                prop::collection::vec(0..n, 1..12),
            )
        })
    ) {
        let n = buttons.len();
        let markup = Markup {
            filter_buttons: buttons,
            portfolio_items: vec!["web".into()],
            submit_label: "Send".into(),
            active_filter: marked,
            ..Markup::default()
        };
        let mut rt = start_page(markup, PageConfig::default()).unwrap();
        // Replay the active-class effects onto a shadow DOM that starts
        // with the template's mark.
        let mut active = vec![false; n];
        if let Some(i) = marked {
            active[i] = true;
        }
        for click in clicks {
            rt.push_event(PageEvent::FilterClick { index: click }).unwrap();
            for effect in rt.take_outputs().effects {
                if let Effect::SetClass { target: Target::FilterButton(i), class: Class::Active, on } = effect {
                    active[i] = on;
                }
            }
            prop_assert_eq!(active.iter().filter(|a| **a).count(), 1);
            prop_assert!(active[click]);
        }
    }

    #[test]
    fn hidden_class_effects_match_final_phase(
        (buttons, items, clicks) in arb_buttons().prop_flat_map(|buttons| {
            let n = buttons.len();
            (
                Just(buttons),
                prop::collection::vec(arb_category(), 1..10),
                prop::collection::vec(0..n, 1..8),
            )
        })
    ) {
        let mut rt = page_for(buttons, items.clone());
        let mut hidden = vec![false; items.len()];
        for click in clicks {
            rt.push_event(PageEvent::FilterClick { index: click }).unwrap();
            rt.advance_time(Duration::from_millis(120));
        }
        settle(&mut rt);
        for effect in rt.take_outputs().effects {
            if let Effect::SetClass { target: Target::PortfolioItem(i), class: Class::Hidden, on } = effect {
                hidden[i] = on;
            }
        }
        for (i, item) in rt.model().filter().items().iter().enumerate() {
            prop_assert_eq!(hidden[i], item.phase == ItemPhase::Hidden);
        }
    }

    #[test]
    fn active_link_is_last_section_within_lookahead(
        layout in arb_layout(),
        y in 0.0f64..3000.0,
    ) {
        let links: Vec<String> = layout.sections.iter().map(|s| format!("#{}", s.id)).collect();
        let markup = Markup {
            nav_links: links,
            sections: layout.sections.iter().map(|s| s.id.clone()).collect(),
            ..Markup::default()
        };
        let mut rt = start_page(markup, PageConfig::default()).unwrap();
        rt.push_event(PageEvent::Layout { layout: layout.clone() }).unwrap();
        rt.push_event(PageEvent::Scroll { y }).unwrap();

        let expected = layout.sections.iter().rposition(|s| s.top <= y + 200.0);
        prop_assert_eq!(rt.model().nav().active_link(), expected);
        prop_assert_eq!(rt.model().nav().is_scrolled(), y > 50.0);
    }

    #[test]
    fn reveals_never_revert(
        reports in prop::collection::vec((0usize..16, any::<bool>()), 0..64)
    ) {
        let mut rt = page_for(vec!["all".into()], vec![]);
        let mut ever = std::collections::BTreeSet::new();
        for (index, intersecting) in reports {
            rt.push_event(PageEvent::Intersection { index, intersecting }).unwrap();
            if intersecting {
                ever.insert(index);
            }
            for i in 0..16 {
                prop_assert_eq!(rt.model().reveal().is_revealed(i), ever.contains(&i));
            }
        }
        let reveal_effects = rt.take_outputs().effects.len();
        prop_assert_eq!(reveal_effects, ever.len());
    }

    #[test]
    fn empty_field_never_disables_submit(
        name in "[a-z]{0,3}",
        email in prop_oneof![Just(String::new()), Just("a@b.com".to_string())],
        subject in "[a-z]{0,3}",
        message in "[a-z]{0,3}",
    ) {
        prop_assume!(name.is_empty() || email.is_empty() || subject.is_empty() || message.is_empty());
        let mut rt = page_for(vec!["all".into()], vec![]);
        rt.push_event(PageEvent::ContactSubmit {
            fields: ContactFields { name, email, subject, message },
        }).unwrap();
        let effects = rt.take_outputs().effects;
        prop_assert!(!effects.iter().any(|e| matches!(e, Effect::SetDisabled { .. })), "unexpected SetDisabled effect");
        let is_missing_fields_error = |e: &Effect| matches!(
            e,
            Effect::ShowNotification { message, .. } if message == "Please fill in all fields."
        );
        prop_assert!(effects.iter().any(is_missing_fields_error));
    }

    #[test]
    fn anchor_target_is_top_minus_navbar(layout in arb_layout(), pick in any::<prop::sample::Index>()) {
        let section = &layout.sections[pick.index(layout.sections.len())];
        let href = format!("#{}", section.id);
        // Ids are unique, so lookup hits the picked section.
        prop_assert_eq!(anchor_target(&layout, &href), Some(section.top - layout.navbar_height));
        prop_assert_eq!(anchor_target(&layout, "#not-a-section"), None);
    }
}
