//! End-to-end application runs.
//!
//! One run walks a fixed sequence of states:
//!
//! ```text
//! Init -> Navigated -> Detected -> Filled -> MissingCheck -> Submitted | Blocked -> Terminal
//! ```
//!
//! Only a navigation failure or a panic ends a run early. Everything after
//! navigation is best-effort and folds into the returned
//! [`ApplicationResult`]. Every run owns its page exclusively and closes it on
//! every exit path.

use crate::detector::FieldDetector;
use crate::error::{ApplyError, Result};
use crate::filler::FieldFiller;
use crate::job_info::extract_job_info;
use crate::mapper::{missing_fields, resolve};
use crate::submit::submit;
use blitz_browser::{BrowserActions, PageLauncher};
use blitz_core::{
    AppConfig, ApplicationResult, ApplicationStatus, AutomationConfig, CustomField, Profile,
    QuestionAnswer,
};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Message reported when no submission strategy worked.
pub const SUBMISSION_FAILED: &str = "Failed to submit application form";

/// Stages of a single application run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Page acquired, nothing loaded
    Init,
    /// Job page loaded
    Navigated,
    /// Job info extracted and fields detected
    Detected,
    /// Every resolvable field attempted
    Filled,
    /// Unresolvable fields counted
    MissingCheck,
    /// Submission attempted
    Submitted,
    /// Submission withheld because data is missing
    Blocked,
    /// Page released
    Terminal,
}

/// Runs applications against pages from a [`PageLauncher`].
pub struct ApplicationDriver {
    launcher: Arc<dyn PageLauncher>,
    navigation_timeout: Duration,
    automation: AutomationConfig,
    detector: FieldDetector,
    filler: FieldFiller,
    pub(crate) max_concurrent: usize,
}

impl ApplicationDriver {
    /// Create a driver with the given launcher and settings.
    #[must_use]
    pub fn new(launcher: Arc<dyn PageLauncher>, config: &AppConfig) -> Self {
        Self {
            launcher,
            navigation_timeout: config.browser.navigation_timeout(),
            automation: config.automation.clone(),
            detector: FieldDetector::new(&config.automation),
            filler: FieldFiller::new(config.automation.radio_scope),
            max_concurrent: config.batch.max_concurrent.max(1),
        }
    }

    /// Set the maximum number of concurrent runs in a batch.
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    /// Apply to the job at `job_url`.
    ///
    /// Never fails: launch errors, navigation errors and panics all become a
    /// failed [`ApplicationResult`] carrying the error message.
    ///
    /// A successful result whose `submitted_via` is
    /// [`SubmissionMethod::KeyboardFallback`](blitz_core::SubmissionMethod::KeyboardFallback)
    /// only means Enter was pressed; the submission itself was not confirmed.
    pub async fn apply(
        &self,
        job_url: &str,
        profile: &Profile,
        custom_fields: &[CustomField],
    ) -> ApplicationResult {
        info!("Starting application for {job_url}");

        let page = match self.launcher.launch().await {
            Ok(page) => page,
            Err(e) => {
                let err = ApplyError::Launch(e);
                error!("Application to {job_url} failed: {err}");
                return ApplicationResult::failed(err.to_string());
            }
        };

        let run = AssertUnwindSafe(self.run(page.as_ref(), job_url, profile, custom_fields))
            .catch_unwind()
            .await;

        let result = match run {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                error!("Application to {job_url} failed: {err}");
                ApplicationResult::failed(err.to_string())
            }
            Err(panic) => {
                let err = ApplyError::Unexpected(panic_message(panic.as_ref()));
                error!("Application to {job_url} failed: {err}");
                ApplicationResult::failed(err.to_string())
            }
        };

        self.teardown(page.as_ref()).await;
        transition(RunState::Terminal);

        info!(
            status = ?result.status,
            answered = result.questions_answered,
            missing = result.missing_fields.len(),
            "Finished application for {job_url}"
        );
        result
    }

    async fn run(
        &self,
        page: &dyn BrowserActions,
        job_url: &str,
        profile: &Profile,
        custom_fields: &[CustomField],
    ) -> Result<ApplicationResult> {
        transition(RunState::Init);

        page.navigate(job_url, self.navigation_timeout)
            .await
            .map_err(|source| ApplyError::Navigation {
                url: job_url.to_string(),
                source,
            })?;
        pause(self.automation.post_navigation_settle_ms).await;
        transition(RunState::Navigated);

        let job = extract_job_info(page).await;
        let fields = self.detector.detect(page).await;
        info!(count = fields.len(), "Detected form fields");
        transition(RunState::Detected);

        let mut answers = Vec::new();
        for field in &fields {
            let Some(matched) = resolve(&field.label, profile, custom_fields) else {
                debug!(label = %field.label, "no data for field");
                continue;
            };
            if self.filler.fill(page, field, &matched).await.is_filled() {
                answers.push(QuestionAnswer {
                    question: field.label.clone(),
                    answer: matched.value,
                    source: matched.source,
                    field_type: field.field_type,
                });
            }
        }
        transition(RunState::Filled);

        let missing = missing_fields(&fields, profile, custom_fields);
        transition(RunState::MissingCheck);

        let mut result = ApplicationResult {
            status: ApplicationStatus::Failed,
            company_name: job.company_name,
            job_title: job.job_title,
            questions_answered: answers.len(),
            questions_and_answers: answers,
            missing_fields: Vec::new(),
            error_message: None,
            submitted_via: None,
        };

        if !missing.is_empty() {
            transition(RunState::Blocked);
            warn!("Not submitting, missing data for: {}", missing.join(", "));
            result.error_message = Some(format!("Missing required fields: {}", missing.join(", ")));
            result.missing_fields = missing;
            return Ok(result);
        }

        let settle = Duration::from_millis(self.automation.submit_settle_ms);
        match submit(page, settle).await {
            Ok(method) => {
                result.status = ApplicationStatus::Success;
                result.submitted_via = Some(method);
            }
            Err(e) => {
                error!("Error submitting form: {e}");
                result.error_message = Some(SUBMISSION_FAILED.to_string());
            }
        }
        transition(RunState::Submitted);

        Ok(result)
    }

    async fn teardown(&self, page: &dyn BrowserActions) {
        pause(self.automation.teardown_grace_ms).await;
        if let Err(e) = page.close().await {
            warn!("Failed to close browser: {e}");
        }
    }
}

fn transition(state: RunState) {
    debug!(?state, "application run state");
}

async fn pause(millis: u64) {
    if millis > 0 {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
