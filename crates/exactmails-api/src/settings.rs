use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, MessageResponse, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSetting {
    pub notification_type_id: i64,
    pub name: String,
    pub description: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationUpdate {
    pub notification_type_id: i64,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub username: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company_name: String,
}

/// Partial profile update; only the set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileInfoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateResponse {
    pub message: String,
    #[serde(default)]
    pub updated_fields: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ProfileInfoEnvelope {
    data: ProfileInfo,
}

#[derive(Debug, Serialize)]
struct NotificationUpdateRequest<'a> {
    updates: &'a [NotificationUpdate],
}

/// Client for the settings screen: notification preferences plus the
/// account-management endpoints that live under `/auth`.
#[derive(Clone)]
pub struct SettingsService {
    client: ApiClient,
}

impl SettingsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn notifications(&self) -> Result<Vec<NotificationSetting>> {
        self.client.get_json("/notifications/user").await
    }

    pub async fn update_notifications(
        &self,
        updates: &[NotificationUpdate],
    ) -> Result<MessageResponse> {
        self.client
            .post_json(
                "/notifications/update",
                &NotificationUpdateRequest { updates },
            )
            .await
    }

    pub async fn profile_info(&self) -> Result<ProfileInfo> {
        // This one endpoint wraps its payload in {data}.
        let envelope: ProfileInfoEnvelope = self.client.get_json("/auth/get-profile-info").await?;
        Ok(envelope.data)
    }

    pub async fn update_profile_info(
        &self,
        update: &ProfileInfoUpdate,
    ) -> Result<ProfileUpdateResponse> {
        self.client
            .post_json("/auth/update-profile-info", update)
            .await
    }

    /// Starts an email change; the new address stays pending until confirmed.
    pub async fn request_email_update(&self, new_email: &str) -> Result<MessageResponse> {
        self.client
            .post_json(
                "/auth/update-email",
                &serde_json::json!({ "new_email": new_email }),
            )
            .await
    }

    pub async fn cancel_email_update(&self) -> Result<MessageResponse> {
        self.client.get_json("/auth/cancel-email-update").await
    }

    pub async fn update_password(&self, new_password: &str) -> Result<MessageResponse> {
        self.client
            .post_json(
                "/auth/update-password",
                &serde_json::json!({ "new_password": new_password }),
            )
            .await
    }

    pub async fn disable_account(&self) -> Result<MessageResponse> {
        self.client.put_empty("/auth/disable-account").await
    }
}
