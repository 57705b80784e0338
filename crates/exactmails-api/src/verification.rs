use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, Result};

/// Scorecard returned by the verification endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailVerificationReport {
    pub email: String,
    pub is_verified: bool,
    pub is_valid_format: bool,
    pub is_free_email: bool,
    pub is_disposable_email: bool,
    pub is_role_email: bool,
    pub is_catchall_email: bool,
    pub is_mx_found: bool,
    pub is_smtp_valid: bool,
    pub score: f64,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    email: &'a str,
}

/// Client for `/email/verify-email`.
#[derive(Clone)]
pub struct VerificationService {
    client: ApiClient,
}

impl VerificationService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn verify(&self, email: &str) -> Result<EmailVerificationReport> {
        self.client
            .post_json("/email/verify-email", &VerifyRequest { email })
            .await
    }
}
