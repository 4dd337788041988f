//! Shared types used across Blitz.
//!
//! The candidate side ([`Profile`], [`CustomField`]) is supplied by the caller
//! and never modified during a run. The outcome side ([`ApplicationResult`])
//! is the only contract handed back to callers.

use crate::error::BlitzError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Company name reported when none could be extracted from the page.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Job title reported when none could be extracted from the page.
pub const UNKNOWN_POSITION: &str = "Unknown Position";

/// Canonical semantic attributes of a candidate profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileAttribute {
    /// Full name
    FullName,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// Current or preferred location
    Location,
    /// Years or summary of experience
    Experience,
    /// Salary expectation
    Salary,
    /// `LinkedIn` profile URL
    LinkedinUrl,
    /// `GitHub` profile URL
    GithubUrl,
    /// Portfolio or personal website URL
    PortfolioUrl,
    /// Resume document URL
    ResumeUrl,
}

impl ProfileAttribute {
    /// Every canonical attribute.
    pub const ALL: [Self; 10] = [
        Self::FullName,
        Self::Email,
        Self::Phone,
        Self::Location,
        Self::Experience,
        Self::Salary,
        Self::LinkedinUrl,
        Self::GithubUrl,
        Self::PortfolioUrl,
        Self::ResumeUrl,
    ];

    /// Canonical snake_case key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Location => "location",
            Self::Experience => "experience",
            Self::Salary => "salary",
            Self::LinkedinUrl => "linkedin_url",
            Self::GithubUrl => "github_url",
            Self::PortfolioUrl => "portfolio_url",
            Self::ResumeUrl => "resume_url",
        }
    }
}

impl fmt::Display for ProfileAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileAttribute {
    type Err = BlitzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.as_str() == s)
            .ok_or_else(|| BlitzError::Validation(format!("unknown profile attribute '{s}'")))
    }
}

/// Candidate profile: canonical attribute to value.
///
/// Serializes as a flat table keyed by the canonical attribute names. Unknown
/// keys are rejected on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Profile {
    values: BTreeMap<ProfileAttribute, String>,
}

impl Profile {
    /// Create an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, attribute: ProfileAttribute, value: impl Into<String>) -> Self {
        self.set(attribute, value);
        self
    }

    /// Set the value for an attribute, replacing any previous value.
    pub fn set(&mut self, attribute: ProfileAttribute, value: impl Into<String>) {
        self.values.insert(attribute, value.into());
    }

    /// Value for an attribute, if present and not blank.
    #[must_use]
    pub fn get(&self, attribute: ProfileAttribute) -> Option<&str> {
        self.values
            .get(&attribute)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Number of attributes with a non-blank value.
    #[must_use]
    pub fn len(&self) -> usize {
        ProfileAttribute::ALL
            .iter()
            .filter(|attr| self.get(**attr).is_some())
            .count()
    }

    /// Whether no attribute has a non-blank value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TryFrom<BTreeMap<String, String>> for Profile {
    type Error = BlitzError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut profile = Self::new();
        for (key, value) in raw {
            profile.set(key.parse()?, value);
        }
        Ok(profile)
    }
}

impl From<Profile> for BTreeMap<String, String> {
    fn from(profile: Profile) -> Self {
        profile
            .values
            .into_iter()
            .map(|(attr, value)| (attr.as_str().to_string(), value))
            .collect()
    }
}

/// Free-form question/answer pair supplied by the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    /// Question label as the candidate wrote it
    pub field_name: String,
    /// Answer to fill in
    pub field_value: String,
}

impl CustomField {
    /// Create a new custom field.
    pub fn new(field_name: impl Into<String>, field_value: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            field_value: field_value.into(),
        }
    }
}

/// Control or value type of a form field.
///
/// Synonym-table entries declare one of `Text`, `Email`, `Phone`, `Url` or
/// `File`; detected controls carry one of `Text`, `Textarea`, `Dropdown`,
/// `Radio`, `Checkbox` or `File`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line text
    Text,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// URL
    Url,
    /// File upload
    File,
    /// Multi-line text
    Textarea,
    /// Select or listbox
    Dropdown,
    /// Radio button
    Radio,
    /// Checkbox
    Checkbox,
}

impl FieldType {
    /// Lowercase name as reported in results.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Url => "url",
            Self::File => "file",
            Self::Textarea => "textarea",
            Self::Dropdown => "dropdown",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a filled answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// A canonical profile attribute
    Profile,
    /// A candidate custom field
    Custom,
}

impl fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile => f.write_str("profile"),
            Self::Custom => f.write_str("custom"),
        }
    }
}

/// Status of an application run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Form submitted
    Success,
    /// Run ended without a submission
    Failed,
    /// Run still executing
    InProgress,
}

/// A form question that was answered during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    /// Field label as detected on the page
    pub question: String,
    /// Value written into the field
    pub answer: String,
    /// Origin of the value
    pub source: AnswerSource,
    /// Detected control type
    pub field_type: FieldType,
}

/// How the form submission was triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SubmissionMethod {
    /// A visible submit control was clicked
    Button {
        /// Selector or text heuristic that located the control
        selector: String,
    },
    /// No submit control was found and Enter was pressed on the page.
    ///
    /// Nothing confirms that the form was actually submitted.
    KeyboardFallback,
}

/// Terminal outcome of one application run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationResult {
    /// Run status
    pub status: ApplicationStatus,
    /// Company name extracted from the page
    pub company_name: String,
    /// Job title extracted from the page
    pub job_title: String,
    /// Number of answered questions
    pub questions_answered: usize,
    /// Answered questions in fill order
    pub questions_and_answers: Vec<QuestionAnswer>,
    /// Labels of detected fields with no matching data
    pub missing_fields: Vec<String>,
    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Submission trigger, when submission was attempted and succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_via: Option<SubmissionMethod>,
}

impl ApplicationResult {
    /// Result for a run that never got past loading the page.
    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            status: ApplicationStatus::Failed,
            company_name: UNKNOWN_COMPANY.to_string(),
            job_title: UNKNOWN_POSITION.to_string(),
            questions_answered: 0,
            questions_and_answers: Vec::new(),
            missing_fields: Vec::new(),
            error_message: Some(error_message.into()),
            submitted_via: None,
        }
    }

    /// Check if the run submitted the form.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ApplicationStatus::Success
    }
}
