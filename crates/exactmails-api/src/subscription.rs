use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub credits: i64,
    pub duration_days: i64,
    pub stripe_price_id: String,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub discount_description: Option<String>,
    #[serde(default)]
    pub trial_days: i64,
}

/// Lifecycle state of the current subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Trial,
    Active,
    PastDue,
    Cancelled,
    Expired,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    pub has_subscription: bool,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub plan_id: Option<i64>,
    #[serde(default)]
    pub subscription_status: Option<PlanStatus>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub credits: Option<i64>,
    #[serde(default)]
    pub auto_renew: Option<bool>,
}

impl SubscriptionStatus {
    pub fn is_trial(&self) -> bool {
        self.subscription_status == Some(PlanStatus::Trial)
    }
}

/// Append-only billing ledger entry; read-only to this layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionHistoryEntry {
    pub id: i64,
    pub description: String,
    pub payment: f64,
    pub action_date: DateTime<Utc>,
    pub action_type: String,
}

#[derive(Debug, Deserialize)]
pub struct SetupIntent {
    /// Handed to the payment processor's hosted element; opaque here.
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionCreated {
    pub subscription_id: String,
}

#[derive(Debug, Serialize)]
struct StartTrialRequest<'a> {
    subscription_plan_id: i64,
    payment_method_id: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateOrUpgradeRequest<'a> {
    plan_id: i64,
    payment_method_id: &'a str,
}

#[derive(Debug, Serialize)]
struct AutoRenewRequest {
    auto_renew: bool,
}

/// Client for the `/subscription` resource.
#[derive(Clone)]
pub struct SubscriptionService {
    client: ApiClient,
}

impl SubscriptionService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn plans(&self) -> Result<Vec<SubscriptionPlan>> {
        self.client.get_json("/subscription/plans").await
    }

    pub async fn plan(&self, plan_id: i64) -> Result<SubscriptionPlan> {
        self.client
            .get_json(&format!("/subscription/plan/{}", plan_id))
            .await
    }

    pub async fn status(&self) -> Result<SubscriptionStatus> {
        self.client.get_json("/subscription/status").await
    }

    /// Prepare a payment-method setup with the payment processor.
    pub async fn create_setup_intent(&self) -> Result<SetupIntent> {
        self.client
            .post_json("/subscription/create-setup-intent", &serde_json::json!({}))
            .await
    }

    pub async fn start_trial(
        &self,
        plan_id: i64,
        payment_method_id: &str,
    ) -> Result<SubscriptionCreated> {
        self.client
            .post_json(
                "/subscription/start-trial",
                &StartTrialRequest {
                    subscription_plan_id: plan_id,
                    payment_method_id,
                },
            )
            .await
    }

    pub async fn create_or_upgrade(
        &self,
        plan_id: i64,
        payment_method_id: &str,
    ) -> Result<SubscriptionCreated> {
        self.client
            .post_json(
                "/subscription/create-or-upgrade",
                &CreateOrUpgradeRequest {
                    plan_id,
                    payment_method_id,
                },
            )
            .await
    }

    pub async fn set_auto_renew(&self, enabled: bool) -> Result<()> {
        self.client
            .post_unit(
                "/subscription/set-auto-renew",
                &AutoRenewRequest { auto_renew: enabled },
            )
            .await
    }

    pub async fn history(&self) -> Result<Vec<SubscriptionHistoryEntry>> {
        self.client
            .get_json("/subscription/subscription-history")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_plan_status_maps_to_other() {
        let status: PlanStatus = serde_json::from_str("\"grandfathered\"").unwrap();
        assert_eq!(status, PlanStatus::Other);
    }

    #[test]
    fn test_trial_detection() {
        let status: SubscriptionStatus = serde_json::from_str(
            r#"{"has_subscription": true, "plan_name": "Starter", "subscription_status": "trial"}"#,
        )
        .unwrap();
        assert!(status.is_trial());
    }
}
