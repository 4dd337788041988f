//! Blitz Apply - Automated job-application form filling.
//!
//! This crate turns a candidate profile into a submitted application form. It
//! detects the controls on a loaded page, matches each control's label against
//! the profile and custom answers, fills what it can and submits only when
//! every detected field has data.
//!
//! # Features
//!
//! - Native and custom-widget field detection with label resolution
//! - Synonym-table field matching with custom-answer fallback
//! - Per-control fill strategies with explicit fallback chains
//! - All-or-nothing submission gate on missing data
//! - Concurrent batch runs, each with its own browser
//!
//! # Example
//!
//! ```rust,ignore
//! use blitz_apply::ApplicationDriver;
//! use blitz_browser::ChromeLauncher;
//! use blitz_core::{AppConfig, Profile, ProfileAttribute};
//! use std::sync::Arc;
//!
//! let config = AppConfig::load()?;
//! let launcher = Arc::new(ChromeLauncher::new(config.browser.clone()));
//! let driver = ApplicationDriver::new(launcher, &config);
//!
//! let profile = Profile::new().with(ProfileAttribute::Email, "jane@example.com");
//! let result = driver.apply("https://jobs.example.com/123", &profile, &[]).await;
//! println!("{:?}: {:?}", result.status, result.missing_fields);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod batch;
pub mod detector;
pub mod driver;
pub mod error;
pub mod filler;
pub mod job_info;
pub mod mapper;
pub mod submit;

// Re-export commonly used types
pub use detector::{Classification, FieldDescriptor, FieldDetector, FieldOrigin};
pub use driver::{ApplicationDriver, RunState};
pub use error::{ApplyError, Result};
pub use filler::{FieldFiller, FillOutcome};
pub use job_info::{extract_job_info, JobInfo};
pub use mapper::{missing_fields, resolve, FieldMapping, MatchResult, FIELD_MAPPINGS};
pub use submit::{submit, SubmitTarget, SUBMIT_TARGETS};
