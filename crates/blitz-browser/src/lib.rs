//! Browser automation engine for job-application forms.
//!
//! Exposes an element-handle based [`BrowserActions`] trait so form logic can
//! run against any page implementation, plus the Chromium-backed
//! [`BrowserEngine`] and a per-run [`ChromeLauncher`].

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;

pub use actions::{css_quote, BrowserActions, ElementHandle, PageLauncher, SelectBy};
pub use engine::{BrowserEngine, ChromeLauncher};
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
