#![forbid(unsafe_code)]

//! WASM frontend for the folio page.
//!
//! On `wasm32` this crate binds the page template to [`folio_core`]:
//! - scans the document for the elements the page controllers act on,
//! - translates DOM events into `PageEvent`s,
//! - drives the runtime clock from `performance.now()` and pumps timers and
//!   animation frames through `setTimeout`/`requestAnimationFrame`,
//! - applies the emitted effects to the DOM.
//!
//! ```js
//! import init, { FolioWeb } from "./folio_web.js";
//! await init();
//! const page = new FolioWeb({ filter_hide_ms: 300 });
//! page.start();
//! ```

pub mod contract;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::FolioWeb;

/// Native placeholder: there is no DOM off `wasm32`, so this only validates
/// the options a browser host would pass.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FolioWeb {
    config: folio_core::PageConfig,
}

#[cfg(not(target_arch = "wasm32"))]
impl FolioWeb {
    /// `options` is the JSON a browser host would pass to the constructor.
    pub fn new(options: Option<&str>) -> Result<Self, folio_core::ConfigError> {
        Ok(Self {
            config: contract::parse_options(options)?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &folio_core::PageConfig {
        &self.config
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::FolioWeb;

    #[test]
    fn native_stub_applies_options() {
        let page = FolioWeb::new(Some(r#"{"filter_hide_ms": 450}"#)).unwrap();
        assert_eq!(page.config().filter_hide_ms, 450);
    }

    #[test]
    fn native_stub_rejects_bad_options() {
        assert!(FolioWeb::new(Some(r#"{"filter_hide_ms": 0}"#)).is_err());
    }
}
