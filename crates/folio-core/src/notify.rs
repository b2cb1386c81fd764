#![forbid(unsafe_code)]

//! Transient notification banners.
//!
//! A notification is created on demand and walks a fixed lifecycle:
//! `Entering` (off-screen) → `Shown` → `Leaving` → removed. The timer
//! choreography lives in [`crate::page`]; this module only owns the state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Banner background color.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Success => "#28a745",
            Self::Error => "#dc3545",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    Entering,
    Shown,
    Leaving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    pub phase: NotificationPhase,
}

/// Live notifications in creation order.
#[derive(Debug, Default, Clone)]
pub struct Notifications {
    live: Vec<Notification>,
    next_id: u64,
}

impl Notifications {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new notification in the `Entering` phase.
    pub fn create(&mut self, kind: NotificationKind, message: impl Into<String>) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;
        self.live.push(Notification {
            id,
            kind,
            message: message.into(),
            phase: NotificationPhase::Entering,
        });
        id
    }

    /// Move a live notification to `phase`. Returns false if it is gone.
    pub fn set_phase(&mut self, id: NotificationId, phase: NotificationPhase) -> bool {
        match self.live.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.phase = phase;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: NotificationId) -> Option<Notification> {
        let idx = self.live.iter().position(|n| n.id == id)?;
        Some(self.live.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.live.iter().find(|n| n.id == id)
    }

    #[must_use]
    pub fn live(&self) -> &[Notification] {
        &self.live
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_removal_is_by_id() {
        let mut n = Notifications::new();
        let a = n.create(NotificationKind::Error, "a");
        let b = n.create(NotificationKind::Success, "b");
        assert_ne!(a, b);
        assert!(n.set_phase(b, NotificationPhase::Shown));
        assert_eq!(n.remove(a).map(|x| x.message), Some("a".to_string()));
        assert!(!n.set_phase(a, NotificationPhase::Leaving));
        assert_eq!(n.len(), 1);
        assert_eq!(n.get(b).map(|x| x.phase), Some(NotificationPhase::Shown));
    }
}
