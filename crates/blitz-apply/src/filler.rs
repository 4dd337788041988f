//! Applying resolved values to detected controls.
//!
//! Every control-level error is absorbed here and reported as
//! [`FillOutcome::Failed`]; nothing a single field does can abort a run.

use crate::detector::FieldDescriptor;
use crate::mapper::MatchResult;
use blitz_browser::{css_quote, BrowserActions, ElementHandle, SelectBy};
use blitz_core::{FieldType, RadioScope};
use tracing::{debug, info, warn};

/// Values that check a checkbox. Compared case-insensitively.
pub const CHECKED_VALUES: [&str; 4] = ["yes", "true", "1", "checked"];

/// Result of filling one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// The value was applied; carries what the control now holds
    Filled(String),
    /// Intentionally not applied
    Skipped(String),
    /// The control rejected every attempt
    Failed(String),
}

impl FillOutcome {
    /// Whether the field counts as answered.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

/// Fills controls according to their detected type.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldFiller {
    radio_scope: RadioScope,
}

impl FieldFiller {
    /// Create a filler picking radios from `radio_scope`.
    #[must_use]
    pub fn new(radio_scope: RadioScope) -> Self {
        Self { radio_scope }
    }

    /// Apply `matched.value` to the control described by `field`.
    pub async fn fill(
        &self,
        page: &dyn BrowserActions,
        field: &FieldDescriptor,
        matched: &MatchResult,
    ) -> FillOutcome {
        let value = matched.value.as_str();
        let outcome = match field.field_type {
            FieldType::Text
            | FieldType::Email
            | FieldType::Phone
            | FieldType::Url
            | FieldType::Textarea => match page.fill(&field.handle, value).await {
                Ok(()) => FillOutcome::Filled(value.to_string()),
                Err(e) => FillOutcome::Failed(e.to_string()),
            },
            FieldType::Dropdown => fill_dropdown(page, &field.handle, value).await,
            FieldType::Radio => self.fill_radio(page, field, value).await,
            FieldType::Checkbox => fill_checkbox(page, &field.handle, value).await,
            FieldType::File => skip_file(value),
        };

        match &outcome {
            FillOutcome::Filled(_) => debug!(label = %field.label, "filled field"),
            FillOutcome::Skipped(reason) => {
                info!(label = %field.label, "skipped field: {reason}");
            }
            FillOutcome::Failed(error) => {
                warn!("Error filling field {}: {error}", field.label);
            }
        }
        outcome
    }

    async fn fill_radio(
        &self,
        page: &dyn BrowserActions,
        field: &FieldDescriptor,
        value: &str,
    ) -> FillOutcome {
        let radios = match self.candidate_radios(page, field).await {
            Ok(radios) => radios,
            Err(e) => return FillOutcome::Failed(e.to_string()),
        };
        let Some(first) = radios.first() else {
            return FillOutcome::Failed("no radio buttons on page".to_string());
        };

        let wanted = value.to_lowercase();
        for radio in &radios {
            let radio_value = match page.attribute(radio, "value").await {
                Ok(Some(v)) => v,
                Ok(None) => continue,
                Err(e) => {
                    debug!("Error reading radio value: {e}");
                    continue;
                }
            };
            if radio_value.to_lowercase().contains(&wanted) {
                return match page.set_checked(radio, true).await {
                    Ok(()) => FillOutcome::Filled(radio_value),
                    Err(e) => FillOutcome::Failed(e.to_string()),
                };
            }
        }

        // No option matched; take the first one as a default
        match page.set_checked(first, true).await {
            Ok(()) => {
                let chosen = page.attribute(first, "value").await.ok().flatten();
                FillOutcome::Filled(chosen.unwrap_or_else(|| value.to_string()))
            }
            Err(e) => FillOutcome::Failed(e.to_string()),
        }
    }

    /// Radios a radio field may pick from.
    ///
    /// Group scope uses the descriptor's `name` and falls back to the whole
    /// page when there is no name or the group is empty.
    async fn candidate_radios(
        &self,
        page: &dyn BrowserActions,
        field: &FieldDescriptor,
    ) -> blitz_browser::Result<Vec<ElementHandle>> {
        if self.radio_scope == RadioScope::Group {
            if let Some(name) = field.name.as_deref() {
                let group = page
                    .query_all(&radio_group_selector(name))
                    .await
                    .unwrap_or_default();
                if !group.is_empty() {
                    return Ok(group);
                }
            }
        }
        page.query_all(RADIO_SELECTOR).await
    }
}

const RADIO_SELECTOR: &str = "input[type='radio']";

fn radio_group_selector(name: &str) -> String {
    format!("{RADIO_SELECTOR}[name={}]", css_quote(name))
}

/// Select by visible text, then by value, then the first option.
async fn fill_dropdown(
    page: &dyn BrowserActions,
    handle: &ElementHandle,
    value: &str,
) -> FillOutcome {
    let attempts = [
        SelectBy::Label(value.to_string()),
        SelectBy::Value(value.to_string()),
        SelectBy::Index(0),
    ];

    let mut last_error = String::new();
    for by in &attempts {
        match page.select_option(handle, by).await {
            Ok(selected) => {
                if matches!(by, SelectBy::Index(_)) {
                    debug!("no option matched {value:?}, selected first option");
                }
                return FillOutcome::Filled(selected);
            }
            Err(e) => last_error = e.to_string(),
        }
    }
    FillOutcome::Failed(last_error)
}

async fn fill_checkbox(
    page: &dyn BrowserActions,
    handle: &ElementHandle,
    value: &str,
) -> FillOutcome {
    let checked = is_checked_value(value);
    match page.set_checked(handle, checked).await {
        Ok(()) => FillOutcome::Filled(checked.to_string()),
        Err(e) => FillOutcome::Failed(e.to_string()),
    }
}

fn skip_file(value: &str) -> FillOutcome {
    let lower = value.to_lowercase();
    if lower.contains("resume") || lower.contains("cv") {
        FillOutcome::Skipped("resume upload requires a local file".to_string())
    } else {
        FillOutcome::Skipped("file uploads are not supported".to_string())
    }
}

/// Whether a resolved value means "checked".
#[must_use]
pub fn is_checked_value(value: &str) -> bool {
    let value = value.trim();
    CHECKED_VALUES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(value))
}
