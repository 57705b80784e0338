use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, Result};

/// Verification status of a single candidate email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Safe,
    Partial,
    NotFound,
}

/// One candidate email with its verification outcome and confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailFinderResult {
    pub id: i64,
    pub email: String,
    pub status: EmailStatus,
    /// Confidence, 0-100.
    pub success_rate: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonSearchResult {
    pub id: i64,
    pub search_history_id: i64,
    pub name: String,
    pub company: String,
    #[serde(default)]
    pub email_finder_result: Option<EmailFinderResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialSearch {
    #[serde(default)]
    pub email_finder_results: Vec<EmailFinderResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySearchResult {
    pub id: i64,
    pub search_history_id: i64,
    pub company: String,
    pub initial_search: InitialSearch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInSearchResult {
    pub id: i64,
    pub search_history_id: i64,
    pub name: String,
    pub company: String,
    pub linkedin_url: String,
    #[serde(default)]
    pub email_finder_result: Option<EmailFinderResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionMakerSearchResult {
    pub id: i64,
    pub search_history_id: i64,
    pub name: String,
    pub position: String,
    pub company: String,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub email_finder_result: Option<EmailFinderResult>,
}

/// Which of the four lookup kinds produced a history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    CompanySearch,
    LinkedinSearch,
    PersonSearch,
    DecisionMakerSearch,
}

/// Wire shape of one search-history record.
///
/// The backend sends all four nested arrays; only the one matching
/// `search_type` is populated. Conversion into the tagged domain model
/// happens in the core crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHistoryRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub search_type: SearchType,
    #[serde(default)]
    pub company_search_results: Vec<CompanySearchResult>,
    #[serde(default)]
    pub decision_maker_search_results: Vec<DecisionMakerSearchResult>,
    #[serde(default)]
    pub linkedin_search_results: Vec<LinkedInSearchResult>,
    #[serde(default)]
    pub person_search_results: Vec<PersonSearchResult>,
}

/// Requested export payload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportRequestFormat {
    Csv,
    Xlsx,
}

#[derive(Debug, Serialize)]
struct ExportRequest {
    format: ExportRequestFormat,
}

#[derive(Debug, Serialize)]
struct ReportRequest<'a> {
    reason: &'a str,
}

/// Client for the `/history` resource.
#[derive(Clone)]
pub struct HistoryService {
    client: ApiClient,
}

impl HistoryService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Full search history for the signed-in user, newest first.
    pub async fn search_history(&self) -> Result<Vec<SearchHistoryRecord>> {
        self.client.get_json("/history/search-history").await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client
            .delete(&format!("/history/search-history/{}", id))
            .await
    }

    /// Flag a record as containing bad data.
    pub async fn report(&self, id: i64, reason: &str) -> Result<()> {
        self.client
            .post_unit(
                &format!("/history/search-history/{}/report", id),
                &ReportRequest { reason },
            )
            .await
    }

    /// Server-side export; returns the opaque file body to save locally.
    pub async fn export(&self, format: ExportRequestFormat) -> Result<Vec<u8>> {
        self.client
            .post_accept_bytes("/export-search-results", &ExportRequest { format })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_with_missing_arrays_deserializes() {
        // Older backend versions omit the arrays that are empty.
        let record: SearchHistoryRecord = serde_json::from_str(
            r#"{
                "id": 7,
                "created_at": "2025-06-01T10:00:00Z",
                "user_id": 3,
                "search_type": "person_search",
                "person_search_results": [{
                    "id": 1,
                    "search_history_id": 7,
                    "name": "Ada Lovelace",
                    "company": "Analytical Engines",
                    "email_finder_result": {
                        "id": 9,
                        "email": "ada@analytical.engines",
                        "status": "safe",
                        "success_rate": 97,
                        "created_at": "2025-06-01T10:00:00Z"
                    }
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(record.search_type, SearchType::PersonSearch);
        assert_eq!(record.person_search_results.len(), 1);
        assert!(record.company_search_results.is_empty());
        assert!(record.linkedin_search_results.is_empty());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&EmailStatus::NotFound).unwrap(),
            "\"not_found\""
        );
        let status: EmailStatus = serde_json::from_str("\"partial\"").unwrap();
        assert_eq!(status, EmailStatus::Partial);
    }
}
