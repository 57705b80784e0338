use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, Result};
use crate::history::EmailStatus;

/// A freshly found email, before it gains a history id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoundEmail {
    pub email: String,
    pub status: EmailStatus,
    pub success_rate: f64,
}

/// Response for the single-target lookups (person, LinkedIn, decision maker).
#[derive(Debug, Clone, Deserialize)]
pub struct EmailFinderResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub emails: FoundEmail,
    pub search_history_id: i64,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

/// Response for the company-wide lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyEmailResponse {
    pub search_history_id: i64,
    pub emails: Vec<FoundEmail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonSearchRequest {
    pub username: String,
    pub domain: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanySearchRequest {
    pub company_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkedInSearchRequest {
    pub linkedin_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionMakerRequest {
    pub company_name: String,
    pub decision_maker: String,
}

/// Client for the `/email` lookup endpoints. Every call consumes credits
/// server-side; callers refetch the credit counters afterwards.
#[derive(Clone)]
pub struct FinderService {
    client: ApiClient,
}

impl FinderService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn find_person_email(
        &self,
        request: &PersonSearchRequest,
    ) -> Result<EmailFinderResponse> {
        self.client
            .post_json("/email/find-person-email", request)
            .await
    }

    pub async fn find_company_emails(
        &self,
        request: &CompanySearchRequest,
    ) -> Result<CompanyEmailResponse> {
        self.client
            .post_json("/email/find-company-emails", request)
            .await
    }

    pub async fn find_linkedin_email(
        &self,
        request: &LinkedInSearchRequest,
    ) -> Result<EmailFinderResponse> {
        self.client
            .post_json("/email/find-linkedin-email", request)
            .await
    }

    pub async fn find_decision_maker_email(
        &self,
        request: &DecisionMakerRequest,
    ) -> Result<EmailFinderResponse> {
        self.client
            .post_json("/email/find-decision-maker-email", request)
            .await
    }
}
