#![forbid(unsafe_code)]

//! Contact form validation and the simulated send.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email pattern: {e}"))
});

/// Field values captured at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Reasons a submission is refused. `Display` is the text shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingFields,
    InvalidEmail,
}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingFields => f.write_str("Please fill in all fields."),
            Self::InvalidEmail => f.write_str("Please enter a valid email address."),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Text of the success notification.
pub const SENT_MESSAGE: &str = "Thank you! Your message has been sent successfully.";

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

impl ContactFields {
    /// Check the fields in order, stopping at the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [&self.name, &self.email, &self.subject, &self.message];
        if fields.iter().any(|f| f.is_empty()) {
            return Err(ValidationError::MissingFields);
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Sending,
}

/// Submit button state for the contact form.
#[derive(Debug, Clone)]
pub struct ContactForm {
    state: SubmitState,
    label: String,
}

impl ContactForm {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            state: SubmitState::Idle,
            label: label.into(),
        }
    }

    #[must_use]
    pub fn state(&self) -> SubmitState {
        self.state
    }

    /// Label the submit button returns to after a send.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Enter the sending state. Returns false if a send is already pending.
    pub fn begin(&mut self) -> bool {
        if self.state == SubmitState::Sending {
            return false;
        }
        self.state = SubmitState::Sending;
        true
    }

    pub fn finish(&mut self) {
        self.state = SubmitState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(email: &str) -> ContactFields {
        ContactFields {
            name: "A".into(),
            email: email.into(),
            subject: "S".into(),
            message: "M".into(),
        }
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("foo@bar"));
        assert!(!is_valid_email("foo.com"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("a@@b.c"));
        assert!(!is_valid_email("@b.c"));
    }

    #[test]
    fn empty_field_is_reported_before_bad_email() {
        let mut f = fields("nope");
        f.subject.clear();
        assert_eq!(f.validate(), Err(ValidationError::MissingFields));
        assert_eq!(fields("nope").validate(), Err(ValidationError::InvalidEmail));
        assert_eq!(fields("a@b.com").validate(), Ok(()));
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            ValidationError::MissingFields.to_string(),
            "Please fill in all fields."
        );
        assert_eq!(
            ValidationError::InvalidEmail.to_string(),
            "Please enter a valid email address."
        );
    }

    #[test]
    fn begin_refuses_while_sending() {
        let mut form = ContactForm::new("Send Message");
        assert!(form.begin());
        assert!(!form.begin());
        form.finish();
        assert_eq!(form.state(), SubmitState::Idle);
        assert_eq!(form.label(), "Send Message");
    }
}
