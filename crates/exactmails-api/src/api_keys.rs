use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyDetails {
    pub api_key: String,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
}

/// One recorded API call made with the user's key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyActivity {
    pub endpoint: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub credits_used: i64,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ActivityEnvelope {
    activity: Vec<ApiKeyActivity>,
}

/// Client for `/api-keys`.
#[derive(Clone)]
pub struct ApiKeyService {
    client: ApiClient,
}

impl ApiKeyService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Rotate the key; the old one stops working immediately.
    pub async fn refresh(&self) -> Result<String> {
        let response: RefreshResponse = self
            .client
            .post_json("/api-keys/refresh", &serde_json::json!({}))
            .await?;
        Ok(response.api_key)
    }

    pub async fn details(&self) -> Result<ApiKeyDetails> {
        self.client.get_json("/api-keys/details").await
    }

    pub async fn recent_activity(&self) -> Result<Vec<ApiKeyActivity>> {
        let envelope: ActivityEnvelope = self.client.get_json("/api-keys/recent-activity").await?;
        Ok(envelope.activity)
    }
}
