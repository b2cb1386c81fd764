#![forbid(unsafe_code)]

//! Deterministic, JSON-friendly page event schema.
//!
//! The web host translates DOM events into [`PageEvent`] values. The same
//! values can be recorded as JSON lines and replayed against a
//! [`PageRuntime`](crate::program::PageRuntime) in tests.

use serde::{Deserialize, Serialize};

use crate::contact::ContactFields;
use crate::markup::Layout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    /// DOM `KeyboardEvent.key`.
    pub key: String,
}

impl KeyInput {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        matches!(self.key.as_str(), "Escape" | "Esc")
    }
}

/// Input to the page model, one per DOM event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    /// Window `load`.
    Loaded,
    /// Fresh geometry measurement.
    Layout { layout: Layout },
    /// Window scroll to vertical offset `y`.
    Scroll { y: f64 },
    HamburgerClick,
    NavLinkClick { index: usize },
    /// Click on any same-page anchor.
    AnchorClick { href: String },
    Key(KeyInput),
    /// Intersection report for fade-in element `index`.
    Intersection { index: usize, intersecting: bool },
    FilterClick { index: usize },
    ContactSubmit { fields: ContactFields },
    Focus { index: usize, focused: bool },
}

/// Failure to decode a recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDecodeError(pub String);

impl core::fmt::Display for EventDecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "invalid page event: {}", self.0)
    }
}

impl std::error::Error for EventDecodeError {}

impl PageEvent {
    #[must_use]
    pub fn to_json_string(&self) -> String {
        // Every field is a plain string, number, bool, or nested struct of
        // those, so serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, EventDecodeError> {
        serde_json::from_str(json).map_err(|e| EventDecodeError(e.to_string()))
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Layout { .. } => "layout",
            Self::Scroll { .. } => "scroll",
            Self::HamburgerClick => "hamburger_click",
            Self::NavLinkClick { .. } => "nav_link_click",
            Self::AnchorClick { .. } => "anchor_click",
            Self::Key(_) => "key",
            Self::Intersection { .. } => "intersection",
            Self::FilterClick { .. } => "filter_click",
            Self::ContactSubmit { .. } => "contact_submit",
            Self::Focus { .. } => "focus",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_recorded_lines() {
        let ev = PageEvent::from_json_str(r#"{"type":"scroll","y":120.5}"#).unwrap();
        assert_eq!(ev, PageEvent::Scroll { y: 120.5 });

        let key = PageEvent::from_json_str(r#"{"type":"key","key":"Escape"}"#).unwrap();
        assert_eq!(
            key,
            PageEvent::Key(KeyInput {
                key: "Escape".into(),
            })
        );
    }

    #[test]
    fn escape_spellings() {
        let key = |k: &str| KeyInput { key: k.into() };
        assert!(key("Escape").is_escape());
        assert!(key("Esc").is_escape());
        assert!(!key("Enter").is_escape());
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(PageEvent::from_json_str(r#"{"type":"teleport"}"#).is_err());
    }

    #[test]
    fn encodes_submit_fields() {
        let ev = PageEvent::ContactSubmit {
            fields: ContactFields {
                name: "A".into(),
                ..ContactFields::default()
            },
        };
        let back = PageEvent::from_json_str(&ev.to_json_string()).unwrap();
        assert_eq!(back, ev);
        assert_eq!(ev.name(), "contact_submit");
    }
}
