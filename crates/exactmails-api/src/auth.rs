use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{ApiClient, ApiError, MessageResponse};

#[derive(Error, Debug)]
pub enum AuthError {
    /// The account exists but its email address has not been confirmed yet.
    #[error("EMAIL_NOT_VERIFIED")]
    EmailNotVerified,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Username already taken")]
    UsernameTaken,

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Token issued by `/auth/signin` and the Google callback exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Set by the Google callback when this authorization code was already
    /// exchanged once; the caller must not re-persist the token.
    #[serde(default)]
    pub already_processed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    pub api_key: String,
    #[serde(default)]
    pub subscription_id: Option<i64>,
    #[serde(default)]
    pub subscription_plan_status: Option<String>,
    #[serde(default)]
    pub subscription_expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active_credits: i64,
    #[serde(default)]
    pub used_credits: i64,
    /// Pending email change requested from the settings screen, if any.
    #[serde(default)]
    pub new_requested_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `{active, used}` credit counters. `used_credits` is nullable on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Credits {
    pub active_credits: i64,
    #[serde(default)]
    pub used_credits: Option<i64>,
}

impl Credits {
    pub fn used(&self) -> i64 {
        self.used_credits.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
struct GoogleCallbackRequest<'a> {
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Debug, Deserialize)]
struct GoogleAuthUrl {
    auth_url: String,
}

#[derive(Debug, Clone, Serialize)]
struct RenewPasswordRequest<'a> {
    reset_token: &'a str,
    new_password: &'a str,
}

/// Client for the `/auth` resource.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a bearer token.
    ///
    /// The backend takes the email in the `username` form field. A 403 whose
    /// detail mentions an unverified email becomes `AuthError::EmailNotVerified`
    /// so callers can prompt for confirmation instead of showing a generic
    /// failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<TokenGrant> {
        self.client
            .post_form("/auth/signin", &[("username", email), ("password", password)])
            .await
            .map_err(classify_sign_in_error)
    }

    /// Register a new account. Does not authenticate; the caller is expected
    /// to prompt for email verification afterwards.
    pub async fn sign_up(&self, request: &SignupRequest) -> Result<MessageResponse> {
        self.client
            .post_json("/auth/signup", request)
            .await
            .map_err(classify_sign_up_error)
    }

    /// Ask the backend where to send the user for Google sign-in.
    pub async fn google_auth_url(&self, redirect_uri: &str) -> Result<String> {
        let path = format!(
            "/auth/login/google?redirect_uri={}",
            urlencoding::encode(redirect_uri)
        );
        let response: GoogleAuthUrl = self.client.get_json(&path).await?;
        Ok(response.auth_url)
    }

    /// Exchange a Google authorization code for a token.
    pub async fn exchange_google_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant> {
        Ok(self
            .client
            .post_json(
                "/auth/signin/callback/google",
                &GoogleCallbackRequest { code, redirect_uri },
            )
            .await?)
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        Ok(self.client.get_json("/auth/profile").await?)
    }

    pub async fn credits(&self) -> Result<Credits> {
        Ok(self.client.get_json("/auth/credits").await?)
    }

    pub async fn verify_email(&self, token: &str) -> Result<MessageResponse> {
        let path = format!("/auth/verify-email?token={}", urlencoding::encode(token));
        Ok(self.client.get_json(&path).await?)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        Ok(self
            .client
            .post_unit("/auth/forgot-password", &serde_json::json!({ "email": email }))
            .await?)
    }

    pub async fn renew_password(&self, reset_token: &str, new_password: &str) -> Result<()> {
        Ok(self
            .client
            .post_unit(
                "/auth/renew-password",
                &RenewPasswordRequest {
                    reset_token,
                    new_password,
                },
            )
            .await?)
    }
}

/// Sentinel strings are an intentional contract with the backend; the exact
/// substrings matched here must not change.
fn classify_sign_in_error(err: ApiError) -> AuthError {
    if err.status() == Some(403)
        && err
            .detail()
            .map(|d| d.contains("Email not verified"))
            .unwrap_or(false)
    {
        return AuthError::EmailNotVerified;
    }
    AuthError::Api(err)
}

fn classify_sign_up_error(err: ApiError) -> AuthError {
    match err.detail() {
        Some(d) if d.contains("Email already registered") => AuthError::EmailAlreadyRegistered,
        Some(d) if d.contains("Username already taken") => AuthError::UsernameTaken,
        _ => AuthError::Api(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16, detail: &str) -> ApiError {
        ApiError::Status {
            status,
            detail: detail.to_string(),
        }
    }

    #[test]
    fn test_unverified_email_becomes_typed_error() {
        let err = classify_sign_in_error(status_error(403, "Email not verified for this account"));
        assert!(matches!(err, AuthError::EmailNotVerified));
    }

    #[test]
    fn test_unverified_detail_on_other_status_stays_generic() {
        let err = classify_sign_in_error(status_error(401, "Email not verified"));
        assert!(matches!(err, AuthError::Api(_)));
    }

    #[test]
    fn test_sign_up_sentinels() {
        assert!(matches!(
            classify_sign_up_error(status_error(400, "Email already registered")),
            AuthError::EmailAlreadyRegistered
        ));
        assert!(matches!(
            classify_sign_up_error(status_error(400, "Username already taken")),
            AuthError::UsernameTaken
        ));
        assert!(matches!(
            classify_sign_up_error(status_error(500, "database on fire")),
            AuthError::Api(_)
        ));
    }

    #[test]
    fn test_credits_null_used_counts_as_zero() {
        let credits: Credits =
            serde_json::from_str(r#"{"active_credits": 40, "used_credits": null}"#).unwrap();
        assert_eq!(credits.active_credits, 40);
        assert_eq!(credits.used(), 0);
    }
}
