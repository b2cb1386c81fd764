#![forbid(unsafe_code)]

//! Host-driven runtime for a page [`Model`].
//!
//! [`PageRuntime`] never blocks and never reads a wall clock. The host
//! controls the loop:
//!
//! 1. Push DOM-derived events via [`PageRuntime::push_event`].
//! 2. Advance time via [`PageRuntime::advance_time`] or
//!    [`PageRuntime::advance_to`]; due timers fire in order.
//! 3. Call [`PageRuntime::frame`] from `requestAnimationFrame` when
//!    [`PageRuntime::has_pending_frame`] is set.
//! 4. Drain DOM effects via [`PageRuntime::take_outputs`] and apply them.
//!
//! # Example
//!
//! ```ignore
//! let mut rt = PageRuntime::new(PageModel::new(markup, config)?);
//! rt.init()?;
//! rt.push_event(PageEvent::FilterClick { index: 1 })?;
//! rt.advance_time(Duration::from_millis(300));
//! for effect in rt.take_outputs().effects {
//!     apply(effect);
//! }
//! ```

use core::time::Duration;

use tracing::{debug, trace};

use crate::clock::{DeterministicClock, TimerQueue};
use crate::effect::Effect;
use crate::event::PageEvent;

/// Commands returned from [`Model::update`].
pub enum Cmd<M> {
    /// No operation.
    None,
    /// Execute commands in order.
    Batch(Vec<Cmd<M>>),
    /// Dispatch a message immediately.
    Msg(M),
    /// Dispatch a message after a fixed delay. Not cancellable.
    After(Duration, M),
    /// Dispatch a message on the next animation frame.
    NextFrame(M),
    /// Apply a DOM mutation.
    Effect(Effect),
}

impl<M: core::fmt::Debug> core::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::After(d, m) => f.debug_tuple("After").field(d).field(m).finish(),
            Self::NextFrame(m) => f.debug_tuple("NextFrame").field(m).finish(),
            Self::Effect(e) => f.debug_tuple("Effect").field(e).finish(),
        }
    }
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

impl<M> Cmd<M> {
    #[must_use]
    pub fn none() -> Self {
        Self::None
    }

    /// Batch commands, collapsing trivial cases.
    #[must_use]
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Self::None))
            .collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    /// Batch a list of effects.
    #[must_use]
    pub fn effects(effects: impl IntoIterator<Item = Effect>) -> Self {
        Self::batch(effects.into_iter().map(Self::Effect).collect())
    }

    #[must_use]
    pub fn after(delay: Duration, msg: M) -> Self {
        Self::After(delay, msg)
    }
}

/// Application state driven by a [`PageRuntime`].
pub trait Model {
    /// Messages handled by [`update`](Self::update). DOM events arrive
    /// through `From<PageEvent>`.
    type Message: From<PageEvent> + core::fmt::Debug;

    /// Called once when the runtime starts.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Core state transition.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;
}

/// Runtime misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeError {
    AlreadyInitialized,
    NotInitialized,
}

impl core::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "page runtime already initialized"),
            Self::NotInitialized => write!(f, "page runtime not initialized"),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Outputs collected since the last [`PageRuntime::take_outputs`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageOutputs {
    /// DOM mutations in application order.
    pub effects: Vec<Effect>,
}

/// Result of one [`PageRuntime::advance_to`] or [`PageRuntime::frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Timer or frame callbacks dispatched.
    pub dispatched: u32,
    /// Earliest timer still pending.
    pub next_deadline: Option<Duration>,
    /// Whether a frame callback is waiting.
    pub pending_frame: bool,
}

pub struct PageRuntime<M: Model> {
    model: M,
    clock: DeterministicClock,
    timers: TimerQueue<M::Message>,
    frame_queue: Vec<M::Message>,
    outputs: PageOutputs,
    initialized: bool,
    frame_idx: u64,
}

impl<M: Model> PageRuntime<M> {
    #[must_use]
    pub fn new(model: M) -> Self {
        Self {
            model,
            clock: DeterministicClock::new(),
            timers: TimerQueue::new(),
            frame_queue: Vec::new(),
            outputs: PageOutputs::default(),
            initialized: false,
            frame_idx: 0,
        }
    }

    /// Run `Model::init`. Must be called exactly once.
    pub fn init(&mut self) -> Result<(), RuntimeError> {
        if self.initialized {
            return Err(RuntimeError::AlreadyInitialized);
        }
        self.initialized = true;
        let cmd = self.model.init();
        self.execute_cmd(cmd);
        Ok(())
    }

    /// Convert a DOM event to a message and dispatch it.
    pub fn push_event(&mut self, event: PageEvent) -> Result<(), RuntimeError> {
        trace!(event = event.name(), "page event");
        self.send(M::Message::from(event))
    }

    /// Dispatch a message directly.
    pub fn send(&mut self, msg: M::Message) -> Result<(), RuntimeError> {
        if !self.initialized {
            return Err(RuntimeError::NotInitialized);
        }
        self.dispatch(msg);
        Ok(())
    }

    /// Advance the clock by `dt`, firing due timers.
    pub fn advance_time(&mut self, dt: Duration) -> StepResult {
        let target = self.clock.now().saturating_add(dt);
        self.advance_to(target)
    }

    /// Advance the clock to `now`, firing every timer due on or before it.
    ///
    /// Each timer observes the clock at its own due time, and timers
    /// scheduled by fired timers also fire if they fall inside the window.
    pub fn advance_to(&mut self, now: Duration) -> StepResult {
        let mut dispatched = 0;
        while let Some((due, msg)) = self.timers.pop_due(now) {
            self.clock.set(due);
            self.dispatch(msg);
            dispatched += 1;
        }
        self.clock.set(now);
        self.step_result(dispatched)
    }

    /// Run the frame callbacks requested before this call.
    pub fn frame(&mut self) -> StepResult {
        let batch = std::mem::take(&mut self.frame_queue);
        let dispatched = batch.len() as u32;
        self.frame_idx += 1;
        if dispatched > 0 {
            debug!(frame = self.frame_idx, callbacks = dispatched, "animation frame");
        }
        for msg in batch {
            self.dispatch(msg);
        }
        self.step_result(dispatched)
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn has_pending_frame(&self) -> bool {
        !self.frame_queue.is_empty()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Drain collected effects.
    pub fn take_outputs(&mut self) -> PageOutputs {
        std::mem::take(&mut self.outputs)
    }

    fn step_result(&self, dispatched: u32) -> StepResult {
        StepResult {
            dispatched,
            next_deadline: self.timers.next_deadline(),
            pending_frame: self.has_pending_frame(),
        }
    }

    fn dispatch(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute_cmd(c);
                }
            }
            Cmd::Msg(m) => self.dispatch(m),
            Cmd::After(delay, m) => {
                let due = self.clock.now().saturating_add(delay);
                self.timers.schedule(due, m);
            }
            Cmd::NextFrame(m) => self.frame_queue.push(m),
            Cmd::Effect(e) => self.outputs.effects.push(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Class, Target};
    use pretty_assertions::assert_eq;

    // ---- Test model ----

    #[derive(Default)]
    struct Ticker {
        fired: Vec<(&'static str, Duration)>,
        now: Duration,
    }

    #[derive(Debug)]
    enum TickMsg {
        Event,
        Fire(&'static str),
        Chain,
        Frame,
        Now(Duration),
    }

    impl From<PageEvent> for TickMsg {
        fn from(_: PageEvent) -> Self {
            TickMsg::Event
        }
    }

    impl Model for Ticker {
        type Message = TickMsg;

        fn update(&mut self, msg: TickMsg) -> Cmd<TickMsg> {
            match msg {
                TickMsg::Event => Cmd::batch(vec![
                    Cmd::after(Duration::from_millis(100), TickMsg::Fire("a")),
                    Cmd::after(Duration::from_millis(50), TickMsg::Chain),
                    Cmd::NextFrame(TickMsg::Frame),
                ]),
                TickMsg::Fire(tag) => {
                    self.fired.push((tag, self.now));
                    Cmd::Effect(Effect::class(Target::Navbar, Class::Scrolled, true))
                }
                TickMsg::Chain => Cmd::after(Duration::from_millis(10), TickMsg::Fire("chained")),
                TickMsg::Frame => Cmd::NextFrame(TickMsg::Fire("next-frame")),
                TickMsg::Now(now) => {
                    self.now = now;
                    Cmd::none()
                }
            }
        }
    }

    fn runtime() -> PageRuntime<Ticker> {
        let mut rt = PageRuntime::new(Ticker::default());
        rt.init().unwrap();
        rt
    }

    #[test]
    fn init_twice_and_events_before_init_are_rejected() {
        let mut rt = PageRuntime::new(Ticker::default());
        assert_eq!(rt.push_event(PageEvent::Loaded), Err(RuntimeError::NotInitialized));
        rt.init().unwrap();
        assert_eq!(rt.init(), Err(RuntimeError::AlreadyInitialized));
    }

    #[test]
    fn timers_fire_in_due_order_including_chained() {
        let mut rt = runtime();
        rt.push_event(PageEvent::Loaded).unwrap();
        assert_eq!(rt.next_deadline(), Some(Duration::from_millis(50)));

        let result = rt.advance_time(Duration::from_millis(100));
        // Chain@50 schedules chained@60, then a@100.
        assert_eq!(result.dispatched, 3);
        let tags: Vec<_> = rt.model().fired.iter().map(|(t, _)| *t).collect();
        assert_eq!(tags, vec!["chained", "a"]);
        assert_eq!(rt.now(), Duration::from_millis(100));
        assert_eq!(result.next_deadline, None);
    }

    #[test]
    fn timers_stay_pending_until_due() {
        let mut rt = runtime();
        rt.push_event(PageEvent::Loaded).unwrap();
        let result = rt.advance_time(Duration::from_millis(49));
        assert_eq!(result.dispatched, 0);
        assert_eq!(rt.pending_timers(), 2);
    }

    #[test]
    fn frame_callbacks_requested_during_a_frame_wait_for_the_next() {
        let mut rt = runtime();
        rt.push_event(PageEvent::Loaded).unwrap();
        assert!(rt.has_pending_frame());

        let first = rt.frame();
        assert_eq!(first.dispatched, 1);
        assert!(first.pending_frame);
        assert!(rt.model().fired.is_empty());

        rt.frame();
        assert_eq!(rt.model().fired.len(), 1);
        assert!(!rt.has_pending_frame());

        let out = rt.take_outputs();
        assert_eq!(out.effects.len(), 1);
        assert!(rt.take_outputs().effects.is_empty());
    }

    #[test]
    fn send_bypasses_event_conversion() {
        let mut rt = runtime();
        rt.send(TickMsg::Now(Duration::from_secs(1))).unwrap();
        assert_eq!(rt.model().now, Duration::from_secs(1));
    }

    #[test]
    fn batch_collapses_trivial_cases() {
        assert!(matches!(Cmd::<TickMsg>::batch(vec![]), Cmd::None));
        assert!(matches!(
            Cmd::batch(vec![Cmd::None, Cmd::Msg(TickMsg::Event)]),
            Cmd::Msg(TickMsg::Event)
        ));
    }
}
