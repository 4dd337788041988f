//! Company and job title extraction.

use blitz_browser::BrowserActions;
use blitz_core::{UNKNOWN_COMPANY, UNKNOWN_POSITION};
use serde::Serialize;
use tracing::debug;

/// Job title locations in priority order.
pub const JOB_TITLE_SELECTORS: [&str; 5] = [
    "h1",
    "[data-testid='job-title']",
    ".job-title",
    ".position-title",
    "title",
];

/// Company name locations in priority order.
pub const COMPANY_SELECTORS: [&str; 5] = [
    "[data-testid='company-name']",
    ".company-name",
    ".employer-name",
    ".company",
    "a[href*='company']",
];

/// Posting metadata shown on the application page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobInfo {
    /// Hiring company, or the unknown-company sentinel
    pub company_name: String,
    /// Position title, or the unknown-position sentinel
    pub job_title: String,
}

impl Default for JobInfo {
    fn default() -> Self {
        Self {
            company_name: UNKNOWN_COMPANY.to_string(),
            job_title: UNKNOWN_POSITION.to_string(),
        }
    }
}

/// Extract company and title independently; each falls back to its sentinel.
pub async fn extract_job_info(page: &dyn BrowserActions) -> JobInfo {
    let job_title = first_text(page, &JOB_TITLE_SELECTORS)
        .await
        .unwrap_or_else(|| UNKNOWN_POSITION.to_string());
    let company_name = first_text(page, &COMPANY_SELECTORS)
        .await
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());

    debug!(%company_name, %job_title, "extracted job info");
    JobInfo {
        company_name,
        job_title,
    }
}

/// Trimmed text of the first selector whose first match has any.
async fn first_text(page: &dyn BrowserActions, selectors: &[&str]) -> Option<String> {
    for selector in selectors {
        let Ok(Some(element)) = page.query(selector).await else {
            continue;
        };
        if let Ok(Some(text)) = page.text_content(&element).await {
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}
