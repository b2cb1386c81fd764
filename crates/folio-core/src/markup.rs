#![forbid(unsafe_code)]

//! Snapshot of the page template and of its measured layout.
//!
//! [`Markup`] is read once at startup and fixes the index space every
//! [`Target`](crate::effect::Target) refers to. [`Layout`] carries the
//! geometry that changes with viewport size and is refreshed by the host.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Ways a markup snapshot can break the page template contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// A `section` without an id.
    EmptySectionId { index: usize },
    /// Two sections share an id.
    DuplicateSectionId(String),
    /// A filter button with an empty `data-filter`.
    EmptyFilterTag { index: usize },
    /// A pre-marked `active` element index outside its list.
    ActiveOutOfRange { list: &'static str, index: usize },
    /// A measured section that the template does not declare.
    UnknownSection(String),
    /// JSON snapshot could not be parsed.
    Parse(String),
}

impl core::fmt::Display for MarkupError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptySectionId { index } => write!(f, "section #{index} has no id"),
            Self::DuplicateSectionId(id) => write!(f, "duplicate section id `{id}`"),
            Self::EmptyFilterTag { index } => {
                write!(f, "filter button #{index} has an empty data-filter")
            }
            Self::ActiveOutOfRange { list, index } => {
                write!(f, "active {list} #{index} does not exist")
            }
            Self::UnknownSection(id) => write!(f, "layout measures unknown section `{id}`"),
            Self::Parse(msg) => write!(f, "invalid markup snapshot: {msg}"),
        }
    }
}

impl std::error::Error for MarkupError {}

/// Elements the page controllers act on, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markup {
    /// `href` of each `.nav-link`.
    pub nav_links: Vec<String>,
    /// Ids of the `section` elements.
    pub sections: Vec<String>,
    /// Number of `.fade-in` elements.
    pub fade_in_count: usize,
    /// `data-filter` of each `.filter-btn`.
    pub filter_buttons: Vec<String>,
    /// `data-category` of each `.portfolio-item`.
    pub portfolio_items: Vec<String>,
    /// Text of the contact form's submit button.
    pub submit_label: String,
    /// Whether a `.hero` element exists.
    pub has_hero: bool,
    /// Number of focusable elements that get a focus outline.
    pub focusable_count: usize,
    /// Filter button carrying `active` in the template.
    pub active_filter: Option<usize>,
    /// Nav link carrying `active` in the template.
    pub active_nav_link: Option<usize>,
}

impl Markup {
    pub fn from_json_str(json: &str) -> Result<Self, MarkupError> {
        let markup: Self =
            serde_json::from_str(json).map_err(|e| MarkupError::Parse(e.to_string()))?;
        markup.validate()?;
        Ok(markup)
    }

    pub fn validate(&self) -> Result<(), MarkupError> {
        let mut seen = HashSet::with_capacity(self.sections.len());
        for (index, id) in self.sections.iter().enumerate() {
            if id.is_empty() {
                return Err(MarkupError::EmptySectionId { index });
            }
            if !seen.insert(id.as_str()) {
                return Err(MarkupError::DuplicateSectionId(id.clone()));
            }
        }
        if let Some(index) = self.filter_buttons.iter().position(String::is_empty) {
            return Err(MarkupError::EmptyFilterTag { index });
        }
        for (list, active, len) in [
            ("filter button", self.active_filter, self.filter_buttons.len()),
            ("nav link", self.active_nav_link, self.nav_links.len()),
        ] {
            if let Some(index) = active.filter(|i| *i >= len) {
                return Err(MarkupError::ActiveOutOfRange { list, index });
            }
        }
        Ok(())
    }
}

/// Measured position of an element addressable by fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionLayout {
    pub id: String,
    /// Document-relative top offset in CSS pixels.
    pub top: f64,
}

/// Measured geometry of the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Sections in document order.
    pub sections: Vec<SectionLayout>,
    /// Non-section elements that same-page links point at.
    pub anchors: Vec<SectionLayout>,
    /// Rendered height of the fixed navbar.
    pub navbar_height: f64,
}

impl Layout {
    #[must_use]
    pub fn section(&self, id: &str) -> Option<&SectionLayout> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Any element a fragment can scroll to: sections first, then other
    /// anchor targets.
    #[must_use]
    pub fn target(&self, id: &str) -> Option<&SectionLayout> {
        self.section(id)
            .or_else(|| self.anchors.iter().find(|a| a.id == id))
    }

    /// Check a measurement against the template's section ids.
    pub fn check(&self, known: &[String]) -> Result<(), MarkupError> {
        let mut seen = HashSet::with_capacity(self.sections.len());
        for section in &self.sections {
            if !seen.insert(section.id.as_str()) {
                return Err(MarkupError::DuplicateSectionId(section.id.clone()));
            }
            if !known.contains(&section.id) {
                return Err(MarkupError::UnknownSection(section.id.clone()));
            }
        }
        Ok(())
    }
}
