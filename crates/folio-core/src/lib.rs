#![forbid(unsafe_code)]

//! `folio-core` is the deterministic model behind the folio portfolio page.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment pushes DOM-derived
//!   [`PageEvent`]s and applies the [`Effect`]s the model emits.
//! - **Deterministic time**: the host advances a monotonic clock explicitly;
//!   CSS-transition choreography is expressed as timers and frame callbacks
//!   owned by the [`PageRuntime`].
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! The crate does not bind to `wasm-bindgen`; `folio-web` wraps it with the
//! DOM glue.

pub mod clock;
pub mod config;
pub mod contact;
pub mod effect;
pub mod event;
pub mod filter;
pub mod loading;
pub mod markup;
pub mod nav;
pub mod notify;
pub mod page;
pub mod program;
pub mod reveal;
pub mod scroll;

pub use config::{ConfigError, PageConfig};
pub use effect::{Class, Display, Effect, Target};
pub use event::{EventDecodeError, KeyInput, PageEvent};
pub use markup::{Layout, Markup, MarkupError, SectionLayout};
pub use page::{PageError, PageModel, PageMsg};
pub use program::{Cmd, Model, PageOutputs, PageRuntime, RuntimeError, StepResult};

/// Build and initialize a runtime for `markup` with `config`.
pub fn start_page(markup: Markup, config: PageConfig) -> Result<PageRuntime<PageModel>, PageError> {
    let mut runtime = PageRuntime::new(PageModel::new(markup, config)?);
    runtime.init()?;
    Ok(runtime)
}
