//! URL ingestion jobs.
//!
//! A scrape job is created with a URL, processed by the backend in the
//! background, and moves through a small status lifecycle. Completed and
//! failed jobs can be re-queued.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::{ApiClient, ApiError};
use crate::config::constants::routes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScrapeStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ScrapeStatus {
    /// Terminal states are the only ones the backend accepts a retry for.
    pub fn is_terminal(self) -> bool {
        matches!(self, ScrapeStatus::Completed | ScrapeStatus::Failed)
    }
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScrapeStatus::Pending => "pending",
            ScrapeStatus::InProgress => "in progress",
            ScrapeStatus::Completed => "completed",
            ScrapeStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeJob {
    pub id: i64,
    pub url: String,
    pub status: ScrapeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One extracted block of a completed scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedContent {
    pub id: i64,
    pub content_type: String,
    #[serde(default)]
    pub link: String,
    pub content: String,
}

impl ApiClient {
    pub async fn list_scrapes(&self) -> Result<Vec<ScrapeJob>, ApiError> {
        self.get_json(routes::scrapes::COLLECTION).await
    }

    pub async fn get_scrape(&self, id: i64) -> Result<ScrapeJob, ApiError> {
        self.get_json(&routes::scrapes::detail(id)).await
    }

    /// Register a URL for ingestion; scraping starts server-side
    /// immediately and the job comes back in `Pending`.
    pub async fn create_scrape(&self, url: &str) -> Result<ScrapeJob, ApiError> {
        self.post_json(routes::scrapes::COLLECTION, &json!({ "url": url }))
            .await
    }

    pub async fn delete_scrape(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&routes::scrapes::detail(id)).await
    }

    pub async fn scrape_contents(&self, id: i64) -> Result<Vec<ScrapedContent>, ApiError> {
        self.get_json(&routes::scrapes::contents(id)).await
    }

    /// Re-queue a terminal job. The backend rejects retries for jobs that
    /// are still pending or running.
    pub async fn retry_scrape(&self, id: i64) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post_empty(&routes::scrapes::retry(id)).await?;
        Ok(())
    }
}
