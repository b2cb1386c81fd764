#![forbid(unsafe_code)]

//! One-shot scroll reveal for `.fade-in` elements.

use std::collections::BTreeSet;

use crate::effect::{Class, Effect, Target};

/// Fade-in elements that have already been revealed.
///
/// Revealing is monotonic: once an index is in the set it never leaves, so an
/// element that scrolls back out of view keeps its `visible` class.
#[derive(Debug, Default, Clone)]
pub struct RevealSet {
    count: usize,
    revealed: BTreeSet<usize>,
}

impl RevealSet {
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            count,
            revealed: BTreeSet::new(),
        }
    }

    /// Handle one intersection report. Only the first intersecting report
    /// for an element produces an effect.
    pub fn observe(&mut self, index: usize, intersecting: bool) -> Option<Effect> {
        if !intersecting || index >= self.count || !self.revealed.insert(index) {
            return None;
        }
        Some(Effect::class(Target::FadeIn(index), Class::Visible, true))
    }

    #[must_use]
    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.contains(&index)
    }

    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }
}
