//! Form field detection.
//!
//! Enumerates the fillable controls of a loaded page and turns each into a
//! [`FieldDescriptor`]. Native controls (`input`, `textarea`, `select`) are
//! detected first, then div-based custom widgets flagged by attribute and
//! class heuristics.
//!
//! Custom widgets are classified in two phases. The first phase only reads
//! the DOM (ARIA role, `aria-haspopup`, `contenteditable`). When that is
//! inconclusive and interactive probing is enabled, the second phase clicks
//! the widget and checks whether option-like elements appeared. Probing has
//! side effects on the page and is reported as [`Classification::Probe`].
//!
//! Detection never fails: lookup errors degrade to fallback labels and types,
//! and a control that cannot be inspected at all is left out.

use blitz_browser::{css_quote, BrowserActions, ElementHandle};
use blitz_core::{AutomationConfig, FieldType};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Native form controls. Hidden inputs and buttons are not fields.
pub const NATIVE_CONTROL_SELECTOR: &str = "input:not([type='hidden']):not([type='submit'])\
:not([type='button']):not([type='reset']):not([type='image']), textarea, select";

/// Elements that look like custom input widgets.
pub const CUSTOM_WIDGET_SELECTOR: &str =
    "[data-testid*='input'], [class*='input'], [class*='field']";

/// Option-like elements that reveal an open dropdown.
pub const OPTION_SELECTOR: &str = "option, [role='option']";

/// Label of a native control with no resolvable text.
pub const UNKNOWN_FIELD: &str = "Unknown Field";

/// Label of a custom widget with no resolvable text.
pub const CUSTOM_FIELD: &str = "Custom Field";

/// Selector for the `<label>` explicitly associated with `target`.
#[must_use]
pub fn label_for_selector(target: &str) -> String {
    format!("label[for={}]", css_quote(target))
}

/// Where a descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOrigin {
    /// `input`, `textarea` or `select`
    Native,
    /// Div-based pseudo control
    Custom,
}

/// How the control type was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Tag and `type` attribute of a native control
    Native,
    /// Read-only inspection of ARIA and editing attributes
    Heuristic,
    /// Clicking the widget and watching for options
    Probe,
    /// Nothing conclusive; treated as text
    Default,
}

/// A detected form control.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    /// Best-effort label; never empty
    pub label: String,
    /// Inferred control type
    pub field_type: FieldType,
    /// Handle to the live control
    #[serde(skip)]
    pub handle: ElementHandle,
    /// `name` attribute (test identifier for custom widgets)
    pub name: Option<String>,
    /// `id` attribute
    pub id: Option<String>,
    /// `placeholder` attribute
    pub placeholder: Option<String>,
    /// Native or custom widget
    pub origin: FieldOrigin,
    /// How `field_type` was decided
    pub classification: Classification,
}

/// Finds form fields on a loaded page.
#[derive(Debug, Clone)]
pub struct FieldDetector {
    interactive_probing: bool,
    probe_settle: Duration,
}

impl FieldDetector {
    /// Create a detector from automation settings.
    #[must_use]
    pub fn new(config: &AutomationConfig) -> Self {
        Self {
            interactive_probing: config.interactive_probing,
            probe_settle: Duration::from_millis(config.probe_settle_ms),
        }
    }

    /// Detect native controls followed by custom widgets, in document order.
    pub async fn detect(&self, page: &dyn BrowserActions) -> Vec<FieldDescriptor> {
        let mut fields = Vec::new();

        match page.query_all(NATIVE_CONTROL_SELECTOR).await {
            Ok(handles) => {
                for handle in handles {
                    match analyze_native(page, handle).await {
                        Ok(field) => fields.push(field),
                        Err(e) => warn!("Error analyzing field: {e}"),
                    }
                }
            }
            Err(e) => warn!("Error detecting native form fields: {e}"),
        }

        match page.query_all(CUSTOM_WIDGET_SELECTOR).await {
            Ok(handles) => {
                for handle in handles {
                    match self.analyze_custom(page, handle).await {
                        Ok(Some(field)) => fields.push(field),
                        Ok(None) => {}
                        Err(e) => warn!("Error analyzing custom field: {e}"),
                    }
                }
            }
            Err(e) => warn!("Error detecting custom form fields: {e}"),
        }

        debug!(count = fields.len(), "detected form fields");
        fields
    }

    async fn analyze_custom(
        &self,
        page: &dyn BrowserActions,
        handle: ElementHandle,
    ) -> blitz_browser::Result<Option<FieldDescriptor>> {
        // Native controls matching the class heuristics were already detected
        let tag = page.tag_name(&handle).await?;
        if matches!(tag.as_str(), "INPUT" | "TEXTAREA" | "SELECT") {
            return Ok(None);
        }

        let aria_label = attr(page, &handle, "aria-label").await;
        let test_id = attr(page, &handle, "data-testid").await;
        let text = page
            .text_content(&handle)
            .await
            .ok()
            .flatten()
            .and_then(|t| clean_text(&t));

        let label = aria_label
            .or_else(|| test_id.clone())
            .or(text)
            .unwrap_or_else(|| CUSTOM_FIELD.to_string());

        let (field_type, classification) = match classify_widget(page, &handle).await {
            Some(field_type) => (field_type, Classification::Heuristic),
            None if self.interactive_probing => {
                (self.probe(page, &handle).await, Classification::Probe)
            }
            None => (FieldType::Text, Classification::Default),
        };
        debug!(%label, %field_type, ?classification, "custom widget");

        Ok(Some(FieldDescriptor {
            label,
            field_type,
            handle,
            name: test_id,
            id: None,
            placeholder: None,
            origin: FieldOrigin::Custom,
            classification,
        }))
    }

    /// Click the widget and classify it by what appears.
    ///
    /// Never fails: any error yields `Text`.
    async fn probe(&self, page: &dyn BrowserActions, handle: &ElementHandle) -> FieldType {
        let visible = page.is_visible(handle).await.unwrap_or(false);
        let enabled = page.is_enabled(handle).await.unwrap_or(false);
        if !(visible && enabled) {
            return FieldType::Text;
        }

        if let Err(e) = page.click(handle).await {
            debug!("Probe click failed on {handle}: {e}");
            return FieldType::Text;
        }
        if !self.probe_settle.is_zero() {
            tokio::time::sleep(self.probe_settle).await;
        }

        match page.query_all(OPTION_SELECTOR).await {
            Ok(options) if !options.is_empty() => FieldType::Dropdown,
            Ok(_) => FieldType::Radio,
            Err(e) => {
                debug!("Probe option lookup failed: {e}");
                FieldType::Text
            }
        }
    }
}

async fn analyze_native(
    page: &dyn BrowserActions,
    handle: ElementHandle,
) -> blitz_browser::Result<FieldDescriptor> {
    let tag = page.tag_name(&handle).await?;
    let input_type = attr(page, &handle, "type").await.map(|t| t.to_lowercase());
    let name = attr(page, &handle, "name").await;
    let id = attr(page, &handle, "id").await;
    let placeholder = attr(page, &handle, "placeholder").await;

    let field_type = native_field_type(&tag, input_type.as_deref());
    let label_text = find_label(page, &handle, id.as_deref(), name.as_deref()).await;

    let label = label_text
        .or_else(|| placeholder.clone())
        .or_else(|| name.clone())
        .or_else(|| id.clone())
        .unwrap_or_else(|| UNKNOWN_FIELD.to_string());

    Ok(FieldDescriptor {
        label,
        field_type,
        handle,
        name,
        id,
        placeholder,
        origin: FieldOrigin::Native,
        classification: Classification::Native,
    })
}

/// Control type of a native element from its tag and `type` attribute.
#[must_use]
pub fn native_field_type(tag: &str, input_type: Option<&str>) -> FieldType {
    if tag.eq_ignore_ascii_case("select") {
        return FieldType::Dropdown;
    }
    if tag.eq_ignore_ascii_case("textarea") {
        return FieldType::Textarea;
    }
    match input_type {
        Some("radio") => FieldType::Radio,
        Some("checkbox") => FieldType::Checkbox,
        Some("file") => FieldType::File,
        _ => FieldType::Text,
    }
}

/// Label text from `<label for=id>`, `<label for=name>`, then a label in the
/// parent container.
async fn find_label(
    page: &dyn BrowserActions,
    handle: &ElementHandle,
    id: Option<&str>,
    name: Option<&str>,
) -> Option<String> {
    for target in [id, name].into_iter().flatten() {
        match page.query(&label_for_selector(target)).await {
            Ok(Some(label)) => {
                if let Some(text) = text_of(page, &label).await {
                    return Some(text);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Error finding label: {e}"),
        }
    }

    match page.query_in_parent(handle, "label").await {
        Ok(Some(label)) => text_of(page, &label).await,
        Ok(None) => None,
        Err(e) => {
            warn!("Error finding label: {e}");
            None
        }
    }
}

async fn text_of(page: &dyn BrowserActions, handle: &ElementHandle) -> Option<String> {
    page.text_content(handle)
        .await
        .ok()
        .flatten()
        .and_then(|t| clean_text(&t))
}

/// Non-blank attribute value; lookup errors count as absent.
async fn attr(page: &dyn BrowserActions, handle: &ElementHandle, name: &str) -> Option<String> {
    page.attribute(handle, name)
        .await
        .ok()
        .flatten()
        .and_then(|v| clean_text(&v))
}

/// Read-only classification of a custom widget. `None` when inconclusive.
async fn classify_widget(page: &dyn BrowserActions, handle: &ElementHandle) -> Option<FieldType> {
    let role = attr(page, handle, "role").await.map(|r| r.to_lowercase());
    if let Some(field_type) = role.as_deref().and_then(field_type_for_role) {
        return Some(field_type);
    }

    let popup = attr(page, handle, "aria-haspopup").await.map(|p| p.to_lowercase());
    if matches!(popup.as_deref(), Some("listbox" | "true")) {
        return Some(FieldType::Dropdown);
    }

    // contenteditable="" is also editable, so read the raw attribute
    match page.attribute(handle, "contenteditable").await {
        Ok(Some(value)) if value.is_empty() || value.eq_ignore_ascii_case("true") => {
            Some(FieldType::Text)
        }
        _ => None,
    }
}

fn field_type_for_role(role: &str) -> Option<FieldType> {
    match role {
        "combobox" | "listbox" => Some(FieldType::Dropdown),
        "radiogroup" | "radio" => Some(FieldType::Radio),
        "checkbox" | "switch" => Some(FieldType::Checkbox),
        "textbox" | "searchbox" => Some(FieldType::Text),
        _ => None,
    }
}

/// Collapse whitespace; `None` when nothing is left.
fn clean_text(text: &str) -> Option<String> {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}
