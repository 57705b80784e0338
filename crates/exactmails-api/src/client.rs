// Single HTTP chokepoint - every service call goes through here
use std::sync::{Arc, RwLock};

use reqwest::{header, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API request failed with status {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of the failed request, if the server got far enough to send one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided detail message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Trivial `{message}` response shape shared by several endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error payload the backend sends on every non-2xx response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

const FALLBACK_DETAIL: &str = "Something went wrong";

/// Shared HTTP client for the Exact Mails backend.
///
/// Attaches the JSON content type and the bearer token (when one is set),
/// and normalizes non-2xx responses into `ApiError::Status` carrying the
/// server's `{detail}` message. Deliberately does no retries and sets no
/// timeouts; a failed call surfaces immediately to the caller.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("ExactMails/0.1.0"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into(),
            token: Arc::new(RwLock::new(token)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the bearer token used for subsequent requests.
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    fn builder(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "api request");
        let mut request = self.http.request(method, url);

        if let Ok(token) = self.token.read() {
            if let Some(ref token) = *token {
                request = request.bearer_auth(token);
            }
        }

        request
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.builder(Method::GET, path).send().await?;
        Self::handle_json(response).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.builder(Method::POST, path).json(body).send().await?;
        Self::handle_json(response).await
    }

    /// The sign-in endpoint is the one place the backend wants
    /// `application/x-www-form-urlencoded` instead of JSON.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.builder(Method::POST, path).form(form).send().await?;
        Self::handle_json(response).await
    }

    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.builder(Method::PUT, path).send().await?;
        Self::handle_json(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.builder(Method::DELETE, path).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// POST that expects an opaque binary payload back (export downloads).
    pub async fn post_accept_bytes<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>> {
        let response = self
            .builder(Method::POST, path)
            .header(header::ACCEPT, "application/octet-stream")
            .json(body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// POST with a JSON body where the caller only cares about success.
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let response = self.builder(Method::POST, path).json(body).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn handle_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Turn a non-2xx response into a typed error carrying the server's
    /// `{detail}` message, falling back to the raw body, then to a generic
    /// message.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            detail: extract_detail(&body),
        })
    }
}

fn extract_detail(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.detail;
    }
    if body.trim().is_empty() {
        FALLBACK_DETAIL.to_string()
    } else {
        body.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_from_json_body() {
        assert_eq!(
            extract_detail(r#"{"detail": "Invalid credentials"}"#),
            "Invalid credentials"
        );
    }

    #[test]
    fn test_detail_falls_back_to_body_text() {
        assert_eq!(extract_detail("upstream exploded"), "upstream exploded");
    }

    #[test]
    fn test_detail_falls_back_to_generic_message() {
        assert_eq!(extract_detail(""), FALLBACK_DETAIL);
        assert_eq!(extract_detail("   "), FALLBACK_DETAIL);
    }

    #[test]
    fn test_token_swap_is_visible_to_clones() {
        let client = ApiClient::new("https://api.example.com", None);
        let clone = client.clone();
        assert!(!clone.has_token());

        client.set_token(Some("tok_123".into()));
        assert!(clone.has_token());

        client.set_token(None);
        assert!(!clone.has_token());
    }
}
