#![forbid(unsafe_code)]

//! Page timings and thresholds.
//!
//! Every field defaults to the behavior the page stylesheet is tuned for. The
//! host may override any subset from a JSON object; missing keys keep their
//! defaults.

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Errors produced while loading a [`PageConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    Parse(String),
    /// A duration that must be positive was zero.
    ZeroDuration(&'static str),
    /// Intersection threshold outside `0.0..=1.0`.
    ThresholdOutOfRange,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid page config: {msg}"),
            Self::ZeroDuration(field) => write!(f, "page config `{field}` must be positive"),
            Self::ThresholdOutOfRange => write!(f, "reveal threshold must be within 0.0..=1.0"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Tunables for every controller on the page. Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Delay between window `load` and the loading-screen fade.
    pub loading_delay_ms: u64,
    /// Fade-out duration of the loading screen before it is removed from layout.
    pub loading_fade_ms: u64,
    /// Scroll offset beyond which the navbar gets the scrolled style.
    pub navbar_scrolled_px: f64,
    /// Lookahead added to the scroll position when picking the active section.
    pub section_lookahead_px: f64,
    /// Fraction of a fade-in element that must be visible to reveal it.
    pub reveal_threshold: f64,
    /// Inward extension of the reveal region from the viewport bottom.
    pub reveal_bottom_margin_px: f64,
    /// Grace period before a filtered-out item leaves the layout.
    pub filter_hide_ms: u64,
    /// Simulated latency of a contact-form submission.
    pub submit_latency_ms: u64,
    /// Label shown on the submit button while sending.
    pub sending_label: String,
    /// Delay before a new notification slides in.
    pub notification_enter_ms: u64,
    /// Time from creation until a notification starts sliding out.
    pub notification_hold_ms: u64,
    /// Slide-out duration before a notification is removed.
    pub notification_exit_ms: u64,
    /// Hero translation per scrolled pixel.
    pub parallax_rate: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            loading_delay_ms: 1000,
            loading_fade_ms: 500,
            navbar_scrolled_px: 50.0,
            section_lookahead_px: 200.0,
            reveal_threshold: 0.1,
            reveal_bottom_margin_px: 50.0,
            filter_hide_ms: 300,
            submit_latency_ms: 2000,
            sending_label: "Sending...".to_string(),
            notification_enter_ms: 100,
            notification_hold_ms: 5000,
            notification_exit_ms: 300,
            parallax_rate: -0.3,
        }
    }
}

impl PageConfig {
    /// Parse and validate a JSON config object.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("filter_hide_ms", self.filter_hide_ms),
            ("submit_latency_ms", self.submit_latency_ms),
            ("notification_hold_ms", self.notification_hold_ms),
            ("notification_exit_ms", self.notification_exit_ms),
        ];
        if let Some(&(field, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::ZeroDuration(field));
        }
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(ConfigError::ThresholdOutOfRange);
        }
        Ok(())
    }

    /// `rootMargin` string for the intersection watcher.
    #[must_use]
    pub fn reveal_root_margin(&self) -> String {
        format!("0px 0px -{}px 0px", self.reveal_bottom_margin_px)
    }

    #[must_use]
    pub const fn filter_hide(&self) -> Duration {
        Duration::from_millis(self.filter_hide_ms)
    }

    #[must_use]
    pub const fn submit_latency(&self) -> Duration {
        Duration::from_millis(self.submit_latency_ms)
    }
}
