#![forbid(unsafe_code)]

//! DOM mutations requested by the page model.
//!
//! The model never touches the document. Each [`Effect`] names a [`Target`]
//! element (by role and index into the markup snapshot) and one presentation
//! change. The host applies them in order.

use serde::{Deserialize, Serialize};

use crate::notify::{NotificationId, NotificationKind};

/// An addressable element of the page template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Target {
    LoadingScreen,
    Navbar,
    Hamburger,
    NavMenu,
    NavLink(usize),
    FadeIn(usize),
    FilterButton(usize),
    PortfolioItem(usize),
    SubmitButton,
    Hero,
    Focusable(usize),
    Notification(NotificationId),
}

/// Presentation classes toggled by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Class {
    Active,
    Scrolled,
    Hidden,
    Visible,
    FadeOut,
}

impl Class {
    /// CSS class name as used by the page stylesheet.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Scrolled => "scrolled",
            Self::Hidden => "hidden",
            Self::Visible => "visible",
            Self::FadeOut => "fade-out",
        }
    }
}

/// Inline `display` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Display {
    Block,
    None,
}

impl Display {
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Effect {
    SetClass { target: Target, class: Class, on: bool },
    SetDisplay { target: Target, display: Display },
    SetText { target: Target, text: String },
    SetDisabled { target: Target, disabled: bool },
    /// Clear every field of the contact form.
    ResetForm,
    /// Scroll the window to a document offset.
    ScrollTo { top: f64, smooth: bool },
    SetTranslateY { target: Target, px: f64 },
    SetOutline { target: Target, on: bool },
    ShowNotification {
        id: NotificationId,
        kind: NotificationKind,
        message: String,
    },
    /// Slide a notification into (`shown`) or out of view.
    SlideNotification { id: NotificationId, shown: bool },
    RemoveNotification { id: NotificationId },
}

impl Effect {
    #[must_use]
    pub const fn class(target: Target, class: Class, on: bool) -> Self {
        Self::SetClass { target, class, on }
    }

    #[must_use]
    pub const fn display(target: Target, display: Display) -> Self {
        Self::SetDisplay { target, display }
    }
}
