//! Blitz Core - Foundation crate for the Blitz job-application automation tool.
//!
//! This crate provides the shared types, error handling, configuration and
//! application history storage that the browser, apply and CLI crates build on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Candidate profile, custom fields and application results
//! - [`history`] - Injected repository for recorded application runs
//!
//! # Example
//!
//! ```rust
//! use blitz_core::{AppConfig, Profile, ProfileAttribute};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert!(config.browser.headless);
//!
//! let profile = Profile::new().with(ProfileAttribute::Email, "jane@example.com");
//! assert_eq!(profile.get(ProfileAttribute::Email), Some("jane@example.com"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod history;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, AutomationConfig, BatchConfig, BrowserConfig, RadioScope};
pub use error::{BlitzError, ConfigError, ConfigResult, Result};
pub use history::{
    ApplicationId, ApplicationRecord, ApplicationRepository, ApplicationStats, InMemoryRepository,
};
pub use types::{
    AnswerSource, ApplicationResult, ApplicationStatus, CustomField, FieldType, Profile,
    ProfileAttribute, QuestionAnswer, SubmissionMethod, UNKNOWN_COMPANY, UNKNOWN_POSITION,
};
