//! Candidate file loading.
//!
//! ```toml
//! id = "jane"
//!
//! [profile]
//! full_name = "Jane Doe"
//! email = "jane@example.com"
//!
//! [[custom_fields]]
//! field_name = "Availability Date"
//! field_value = "2024-01-15"
//! ```

use anyhow::{Context, Result};
use blitz_core::{CustomField, Profile};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Everything the applicant supplies for a run.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    /// History key; defaults to the file name
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl Candidate {
    /// Parse a candidate TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read candidate file {}", path.display()))?;
        let mut candidate: Self = toml::from_str(&contents)
            .with_context(|| format!("invalid candidate file {}", path.display()))?;

        if candidate.id.trim().is_empty() {
            candidate.id = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "candidate".to_string());
        }
        Ok(candidate)
    }
}
