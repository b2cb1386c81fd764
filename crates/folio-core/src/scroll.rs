#![forbid(unsafe_code)]

//! Scroll geometry: anchor targets and hero parallax.

use crate::markup::Layout;

/// Scroll offset that lands the element named by `href` just below the
/// fixed navbar.
///
/// `href` is the anchor's raw attribute (`"#about"`). Returns `None` for a
/// bare `#`, for non-fragment hrefs, and for ids with no measured element.
#[must_use]
pub fn anchor_target(layout: &Layout, href: &str) -> Option<f64> {
    let id = href.strip_prefix('#').filter(|id| !id.is_empty())?;
    let target = layout.target(id)?;
    Some(target.top - layout.navbar_height)
}

/// Hero translation for a scroll offset.
#[must_use]
pub fn parallax_offset(scroll_y: f64, rate: f64) -> f64 {
    scroll_y * rate
}
