#![forbid(unsafe_code)]

//! The page-template contract: element ids, selectors, and inline styles.
//!
//! Kept free of `web-sys` so it compiles and tests on every target.

use folio_core::notify::NotificationKind;
use folio_core::{ConfigError, PageConfig};

pub const LOADING_SCREEN_ID: &str = "loading-screen";
pub const NAVBAR_ID: &str = "navbar";
pub const HAMBURGER_ID: &str = "hamburger";
pub const NAV_MENU_ID: &str = "nav-menu";
pub const CONTACT_FORM_ID: &str = "contact-form";

/// Ids that must exist for the page to start.
pub const REQUIRED_IDS: [&str; 5] = [
    LOADING_SCREEN_ID,
    NAVBAR_ID,
    HAMBURGER_ID,
    NAV_MENU_ID,
    CONTACT_FORM_ID,
];

pub const NAV_LINK_SELECTOR: &str = ".nav-link";
pub const SECTION_SELECTOR: &str = "section";
pub const FADE_IN_SELECTOR: &str = ".fade-in";
pub const FILTER_BUTTON_SELECTOR: &str = ".filter-btn";
pub const PORTFOLIO_ITEM_SELECTOR: &str = ".portfolio-item";
pub const SUBMIT_BUTTON_SELECTOR: &str = ".submit-button";
pub const HERO_SELECTOR: &str = ".hero";
/// Same-page anchors handled by smooth scroll. Nav links are excluded; they
/// carry their own click handling.
pub const ANCHOR_SELECTOR: &str = "a[href^=\"#\"]:not(.nav-link)";
pub const FOCUSABLE_SELECTOR: &str = "a[href]:not([disabled]), button:not([disabled]), \
     input:not([disabled]), textarea:not([disabled]), select:not([disabled]), \
     [tabindex]:not([tabindex=\"-1\"])";

pub const FILTER_ATTR: &str = "data-filter";
pub const CATEGORY_ATTR: &str = "data-category";

/// Contact form field names, in validation order.
pub const FIELD_NAMES: [&str; 4] = ["name", "email", "subject", "message"];

pub const FOCUS_OUTLINE: &str = "2px solid #007BFF";
pub const FOCUS_OUTLINE_OFFSET: &str = "2px";

/// Inline style of a freshly created notification banner. It starts
/// off-screen to the right and slides in via its transform transition.
#[must_use]
pub fn notification_css(kind: NotificationKind) -> String {
    format!(
        "position: fixed; top: 20px; right: 20px; background-color: {}; color: white; \
         padding: 1rem 1.5rem; border-radius: 5px; box-shadow: 0 5px 15px rgba(0,0,0,0.2); \
         z-index: 10000; transform: {}; transition: transform 0.3s ease;",
        kind.color(),
        notification_transform(false),
    )
}

#[must_use]
pub const fn notification_transform(shown: bool) -> &'static str {
    if shown {
        "translateX(0)"
    } else {
        "translateX(100%)"
    }
}

/// Class attribute of a notification banner.
#[must_use]
pub fn notification_class(kind: NotificationKind) -> String {
    format!("notification {}", kind.as_str())
}

#[must_use]
pub fn translate_y(px: f64) -> String {
    format!("translateY({px}px)")
}

/// Parse host-provided options. `None` or an empty string keeps every default.
pub fn parse_options(json: Option<&str>) -> Result<PageConfig, ConfigError> {
    match json.map(str::trim).filter(|s| !s.is_empty()) {
        Some(json) => PageConfig::from_json_str(json),
        None => Ok(PageConfig::default()),
    }
}
