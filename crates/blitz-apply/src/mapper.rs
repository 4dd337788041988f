//! Label-to-value matching.
//!
//! Maps the human-readable label of a form field to a canonical profile
//! attribute or one of the candidate's custom fields. Matching is first-match
//! over a fixed table order, never best-match: a label that fits several
//! attributes always resolves to the one listed first in [`FIELD_MAPPINGS`].
//!
//! Each synonym is tested against the label with three stages, in order:
//!
//! 1. exact equality
//! 2. substring containment in either direction
//! 3. word-token intersection
//!
//! The token stage is deliberately loose. "Company name" shares the token
//! `name` with the full-name synonyms and resolves to the candidate's full
//! name; "Home state" resolves to the location. This favours filling a field
//! over leaving it empty.

use crate::detector::FieldDescriptor;
use blitz_core::{AnswerSource, CustomField, FieldType, Profile, ProfileAttribute};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Known label variants for one canonical attribute.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    /// Profile attribute supplying the value
    pub attribute: ProfileAttribute,
    /// Lowercase label variants
    pub synonyms: &'static [&'static str],
    /// Declared value type
    pub field_type: FieldType,
}

/// Synonym table in match-priority order.
pub const FIELD_MAPPINGS: [FieldMapping; 10] = [
    FieldMapping {
        attribute: ProfileAttribute::FullName,
        synonyms: &[
            "full name",
            "name",
            "fullname",
            "full_name",
            "candidate name",
            "applicant name",
            "your name",
            "first and last name",
            "full legal name",
            "complete name",
        ],
        field_type: FieldType::Text,
    },
    FieldMapping {
        attribute: ProfileAttribute::Email,
        synonyms: &[
            "email",
            "email address",
            "e-mail",
            "contact email",
            "work email",
            "personal email",
            "email id",
            "e-mail address",
        ],
        field_type: FieldType::Email,
    },
    FieldMapping {
        attribute: ProfileAttribute::Phone,
        synonyms: &[
            "phone",
            "phone number",
            "telephone",
            "mobile",
            "cell",
            "contact number",
            "phone no",
            "telephone number",
            "mobile number",
            "cell phone",
            "contact phone",
        ],
        field_type: FieldType::Phone,
    },
    FieldMapping {
        attribute: ProfileAttribute::Location,
        synonyms: &[
            "location",
            "city",
            "state",
            "address",
            "residence",
            "current location",
            "work location",
            "job location",
            "preferred location",
            "relocation",
            "remote",
        ],
        field_type: FieldType::Text,
    },
    FieldMapping {
        attribute: ProfileAttribute::Experience,
        synonyms: &[
            "experience",
            "years of experience",
            "work experience",
            "professional experience",
            "relevant experience",
            "total experience",
            "experience level",
        ],
        field_type: FieldType::Text,
    },
    FieldMapping {
        attribute: ProfileAttribute::Salary,
        synonyms: &[
            "salary",
            "salary expectation",
            "expected salary",
            "salary range",
            "compensation",
            "pay",
            "wage",
            "salary requirements",
            "desired salary",
        ],
        field_type: FieldType::Text,
    },
    FieldMapping {
        attribute: ProfileAttribute::LinkedinUrl,
        synonyms: &[
            "linkedin",
            "linkedin profile",
            "linkedin url",
            "linkedin link",
            "linkedin page",
            "linkedin account",
        ],
        field_type: FieldType::Url,
    },
    FieldMapping {
        attribute: ProfileAttribute::GithubUrl,
        synonyms: &[
            "github",
            "github profile",
            "github url",
            "github link",
            "github account",
            "github username",
        ],
        field_type: FieldType::Url,
    },
    FieldMapping {
        attribute: ProfileAttribute::PortfolioUrl,
        synonyms: &[
            "portfolio",
            "portfolio url",
            "portfolio link",
            "website",
            "personal website",
            "portfolio site",
        ],
        field_type: FieldType::Url,
    },
    FieldMapping {
        attribute: ProfileAttribute::ResumeUrl,
        synonyms: &[
            "resume",
            "cv",
            "resume file",
            "cv file",
            "resume upload",
            "cv upload",
            "resume attachment",
            "cv attachment",
            "resume document",
        ],
        field_type: FieldType::File,
    },
];

/// Value resolved for a field label.
///
/// `value` is never empty: an absent value is no match at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Value to fill in
    pub value: String,
    /// Where the value came from
    pub source: AnswerSource,
    /// Declared type of the matched entry (`Text` for custom fields)
    pub field_type: FieldType,
    /// Canonical attribute name, or the custom field's own name
    pub field_name: String,
}

/// Resolve a field label to a value from the profile or custom fields.
///
/// Profile attributes are tried first, in table order, then custom fields in
/// the order given. Entries whose value is blank never match.
pub fn resolve(
    label: &str,
    profile: &Profile,
    custom_fields: &[CustomField],
) -> Option<MatchResult> {
    let label = normalize(label);
    if label.is_empty() {
        return None;
    }

    for mapping in &FIELD_MAPPINGS {
        let Some(value) = profile.get(mapping.attribute) else {
            continue;
        };
        if mapping
            .synonyms
            .iter()
            .any(|synonym| fuzzy_match(&label, synonym))
        {
            return Some(MatchResult {
                value: value.to_string(),
                source: AnswerSource::Profile,
                field_type: mapping.field_type,
                field_name: mapping.attribute.as_str().to_string(),
            });
        }
    }

    custom_fields.iter().find_map(|field| {
        let name = normalize(&field.field_name);
        if name.is_empty() || field.field_value.trim().is_empty() {
            return None;
        }
        fuzzy_match(&label, &name).then(|| MatchResult {
            value: field.field_value.clone(),
            source: AnswerSource::Custom,
            field_type: FieldType::Text,
            field_name: field.field_name.clone(),
        })
    })
}

/// Labels of the descriptors that [`resolve`] finds no value for.
pub fn missing_fields(
    descriptors: &[FieldDescriptor],
    profile: &Profile,
    custom_fields: &[CustomField],
) -> Vec<String> {
    descriptors
        .iter()
        .filter(|d| resolve(&d.label, profile, custom_fields).is_none())
        .map(|d| d.label.clone())
        .collect()
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Three-stage match between a normalized label and a candidate name.
fn fuzzy_match(label: &str, candidate: &str) -> bool {
    if label == candidate {
        return true;
    }

    if label.contains(candidate) || candidate.contains(label) {
        return true;
    }

    let label_tokens = tokens(label);
    tokens(candidate).iter().any(|t| label_tokens.contains(t))
}

fn tokens(text: &str) -> HashSet<&str> {
    static WORD: OnceLock<Regex> = OnceLock::new();
    let word = WORD.get_or_init(|| Regex::new(r"\w+").expect("valid regex"));
    word.find_iter(text).map(|m| m.as_str()).collect()
}
