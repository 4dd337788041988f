//! Error types for application runs.
//!
//! Only failures that end a run early are errors; per-field problems are
//! reported through [`crate::filler::FillOutcome`] instead.

use thiserror::Error;

/// Errors that abort an application run.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// The browser could not be started
    #[error("failed to launch browser: {0}")]
    Launch(#[source] blitz_browser::BrowserError),

    /// The job page could not be loaded
    #[error("{source}")]
    Navigation {
        /// URL that failed to load
        url: String,
        /// Underlying browser error
        #[source]
        source: blitz_browser::BrowserError,
    },

    /// The run panicked
    #[error("unexpected error during application run: {0}")]
    Unexpected(String),
}

/// Result type for application runs.
pub type Result<T> = std::result::Result<T, ApplyError>;
