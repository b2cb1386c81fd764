#![forbid(unsafe_code)]

//! Loading-screen overlay dismissal.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingPhase {
    /// Overlay covers the page; window `load` not yet seen.
    Shown,
    /// `load` seen; waiting to start the fade.
    Waiting,
    FadingOut,
    Hidden,
}

#[derive(Debug, Clone)]
pub struct LoadingScreen {
    phase: LoadingPhase,
}

impl Default for LoadingScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingScreen {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: LoadingPhase::Shown,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> LoadingPhase {
        self.phase
    }

    /// Window finished loading. Returns false for repeat notifications.
    pub fn loaded(&mut self) -> bool {
        if self.phase != LoadingPhase::Shown {
            return false;
        }
        self.phase = LoadingPhase::Waiting;
        true
    }

    pub fn start_fade(&mut self) -> bool {
        self.advance(LoadingPhase::Waiting, LoadingPhase::FadingOut)
    }

    pub fn finish(&mut self) -> bool {
        self.advance(LoadingPhase::FadingOut, LoadingPhase::Hidden)
    }

    fn advance(&mut self, from: LoadingPhase, to: LoadingPhase) -> bool {
        if self.phase != from {
            return false;
        }
        self.phase = to;
        true
    }
}
