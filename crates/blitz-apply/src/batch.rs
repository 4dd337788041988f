//! Concurrent application runs.

use crate::driver::ApplicationDriver;
use blitz_core::{ApplicationResult, CustomField, Profile};
use futures::stream::{self, StreamExt};
use tracing::info;

impl ApplicationDriver {
    /// Apply to several jobs concurrently.
    ///
    /// Each run launches its own page; at most `max_concurrent` run at once.
    /// Results come back in the order of `job_urls`, and a run that fails
    /// (even at launch) only fails its own entry.
    pub async fn apply_batch<S: AsRef<str>>(
        &self,
        job_urls: &[S],
        profile: &Profile,
        custom_fields: &[CustomField],
    ) -> Vec<ApplicationResult> {
        info!(
            count = job_urls.len(),
            max_concurrent = self.max_concurrent,
            "Starting batch application"
        );

        let results: Vec<ApplicationResult> = stream::iter(job_urls)
            .map(|url| self.apply(url.as_ref(), profile, custom_fields))
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        info!(
            succeeded,
            failed = results.len() - succeeded,
            "Finished batch application"
        );
        results
    }
}
