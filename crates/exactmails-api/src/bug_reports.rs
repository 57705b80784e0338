use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, Result};

#[derive(Debug, Clone, Serialize)]
pub struct BugReportSubmission {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugReport {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

/// Client for `/bug-reports`.
#[derive(Clone)]
pub struct BugReportService {
    client: ApiClient,
}

impl BugReportService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn submit(&self, report: &BugReportSubmission) -> Result<BugReport> {
        self.client.post_json("/bug-reports/submit", report).await
    }

    pub async fn list(&self) -> Result<Vec<BugReport>> {
        self.client.get_json("/bug-reports/list").await
    }
}
