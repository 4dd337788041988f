//! Application history storage.
//!
//! Callers inject an [`ApplicationRepository`] instead of sharing global
//! collections. [`InMemoryRepository`] is the bundled implementation; its
//! contents live exactly as long as the value itself.

use crate::error::Result;
use crate::types::{ApplicationResult, ApplicationStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Identifier of a recorded application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(Uuid);

impl ApplicationId {
    /// Create a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored application run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    /// Record identifier
    pub id: ApplicationId,
    /// Candidate the application was made for
    pub candidate_id: String,
    /// Job posting URL
    pub job_url: String,
    /// When the run finished
    pub applied_at: DateTime<Utc>,
    /// Outcome of the run
    pub result: ApplicationResult,
}

/// Aggregate counts over a candidate's history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStats {
    /// Number of recorded applications
    pub total: usize,
    /// Applications that were submitted
    pub successful: usize,
    /// Applications that failed
    pub failed: usize,
    /// Percentage of successful applications (0 when there are none)
    pub success_rate: f64,
}

impl ApplicationStats {
    /// Compute stats over a set of records.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_records(records: &[ApplicationRecord]) -> Self {
        let total = records.len();
        let successful = records
            .iter()
            .filter(|r| r.result.status == ApplicationStatus::Success)
            .count();
        let failed = records
            .iter()
            .filter(|r| r.result.status == ApplicationStatus::Failed)
            .count();
        let success_rate = if total > 0 {
            successful as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total,
            successful,
            failed,
            success_rate,
        }
    }
}

/// Storage abstraction for application runs.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Store a finished run and return the stored record.
    async fn record(
        &self,
        candidate_id: &str,
        job_url: &str,
        result: ApplicationResult,
    ) -> Result<ApplicationRecord>;

    /// Fetch a record by id.
    async fn fetch(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>>;

    /// All records of a candidate, oldest first.
    async fn list_for(&self, candidate_id: &str) -> Result<Vec<ApplicationRecord>>;

    /// Remove a record. Returns whether a record was removed.
    async fn delete(&self, id: ApplicationId) -> Result<bool>;

    /// Aggregate stats for a candidate.
    async fn stats(&self, candidate_id: &str) -> Result<ApplicationStats> {
        let records = self.list_for(candidate_id).await?;
        Ok(ApplicationStats::from_records(&records))
    }
}

/// Process-local repository backed by a vector.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: RwLock<Vec<ApplicationRecord>>,
}

impl InMemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every stored record.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryRepository {
    async fn record(
        &self,
        candidate_id: &str,
        job_url: &str,
        result: ApplicationResult,
    ) -> Result<ApplicationRecord> {
        let record = ApplicationRecord {
            id: ApplicationId::generate(),
            candidate_id: candidate_id.to_string(),
            job_url: job_url.to_string(),
            applied_at: Utc::now(),
            result,
        };
        self.records.write().await.push(record.clone());
        tracing::debug!(id = %record.id, job_url, "recorded application");
        Ok(record)
    }

    async fn fetch(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn list_for(&self, candidate_id: &str) -> Result<Vec<ApplicationRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.candidate_id == candidate_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: ApplicationId) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }
}
