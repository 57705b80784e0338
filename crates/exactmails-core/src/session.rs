// Session state machine - the one place that owns "who is signed in".
//
// Screens read this container instead of calling the auth endpoints
// themselves, so every transition that flips the authentication flag also
// refreshes (or clears) the subscription and credit data they depend on.
use std::collections::HashSet;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use exactmails_api::{
    ApiClient, AuthService, Credits, SignupRequest, SubscriptionService, SubscriptionStatus,
    TokenGrant, UserProfile,
};

use crate::session_store::SessionStore;
use crate::{Error, Result};

/// Fixed delay before a Google code exchange fires, collapsing the duplicate
/// invocations a remounting callback screen produces.
pub const GOOGLE_EXCHANGE_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone)]
struct SessionData {
    state: SessionState,
    user: Option<UserProfile>,
    subscription: Option<SubscriptionStatus>,
    credits: Option<Credits>,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            state: SessionState::Loading,
            user: None,
            subscription: None,
            credits: None,
        }
    }
}

/// Backend calls the session depends on. A trait so the state machine can be
/// exercised against a mock without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Point the underlying HTTP client at a new bearer token (or none).
    fn set_bearer(&self, token: Option<String>);

    async fn sign_in(&self, email: &str, password: &str) -> Result<TokenGrant>;
    async fn sign_up(&self, request: SignupRequest) -> Result<String>;
    async fn exchange_google_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant>;
    async fn verify_email(&self, token: &str) -> Result<String>;
    async fn profile(&self) -> Result<UserProfile>;
    async fn credits(&self) -> Result<Credits>;
    async fn subscription_status(&self) -> Result<SubscriptionStatus>;
}

/// Production `SessionApi` over the real services.
pub struct ApiBackend {
    client: ApiClient,
    auth: AuthService,
    subscriptions: SubscriptionService,
}

impl ApiBackend {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthService::new(client.clone()),
            subscriptions: SubscriptionService::new(client.clone()),
            client,
        }
    }
}

#[async_trait]
impl SessionApi for ApiBackend {
    fn set_bearer(&self, token: Option<String>) {
        self.client.set_token(token);
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<TokenGrant> {
        Ok(self.auth.sign_in(email, password).await?)
    }

    async fn sign_up(&self, request: SignupRequest) -> Result<String> {
        Ok(self.auth.sign_up(&request).await?.message)
    }

    async fn exchange_google_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant> {
        Ok(self.auth.exchange_google_code(code, redirect_uri).await?)
    }

    async fn verify_email(&self, token: &str) -> Result<String> {
        Ok(self.auth.verify_email(token).await?.message)
    }

    async fn profile(&self) -> Result<UserProfile> {
        Ok(self.auth.profile().await?)
    }

    async fn credits(&self) -> Result<Credits> {
        Ok(self.auth.credits().await?)
    }

    async fn subscription_status(&self) -> Result<SubscriptionStatus> {
        self.subscriptions.status().await.map_err(Error::from)
    }
}

/// Single-flight registry keyed on the Google authorization code.
///
/// An authorization code is good for exactly one exchange, so a code that is
/// in flight or already completed is rejected rather than sent again.
#[derive(Default)]
struct SingleFlight {
    codes: Mutex<FlightCodes>,
}

#[derive(Default)]
struct FlightCodes {
    in_flight: HashSet<String>,
    completed: HashSet<String>,
}

impl SingleFlight {
    /// Register a key; false means a duplicate was rejected.
    fn try_begin(&self, key: &str) -> bool {
        match self.codes.lock() {
            Ok(mut codes) => {
                if codes.completed.contains(key) {
                    return false;
                }
                codes.in_flight.insert(key.to_string())
            }
            Err(_) => false,
        }
    }

    /// Failed exchange: release the key so a manual retry can go through.
    fn abort(&self, key: &str) {
        if let Ok(mut codes) = self.codes.lock() {
            codes.in_flight.remove(key);
        }
    }

    /// Successful exchange: the key is never usable again.
    fn complete(&self, key: &str) {
        if let Ok(mut codes) = self.codes.lock() {
            codes.in_flight.remove(key);
            codes.completed.insert(key.to_string());
        }
    }
}

/// The session container.
///
/// States: Loading -> Unauthenticated or Loading -> Authenticated; sign-in
/// and sign-out move between the latter two. All data lives behind interior
/// mutability so concurrent screens can share one instance; locks are never
/// held across an await point.
pub struct Session<A: SessionApi> {
    api: A,
    store: Mutex<SessionStore>,
    data: RwLock<SessionData>,
    google_exchanges: SingleFlight,
}

impl<A: SessionApi> Session<A> {
    pub fn new(api: A, store: SessionStore) -> Self {
        Self {
            api,
            store: Mutex::new(store),
            data: RwLock::new(SessionData::default()),
            google_exchanges: SingleFlight::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.data
            .read()
            .map(|d| d.state)
            .unwrap_or(SessionState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.data.read().ok().and_then(|d| d.user.clone())
    }

    pub fn subscription(&self) -> Option<SubscriptionStatus> {
        self.data.read().ok().and_then(|d| d.subscription.clone())
    }

    pub fn credits(&self) -> Option<Credits> {
        self.data.read().ok().and_then(|d| d.credits)
    }

    /// Settle the session from whatever token is on disk.
    pub async fn initialize(&self) -> Result<()> {
        let token = self.store.lock().ok().and_then(|s| s.token());
        match token {
            Some(token) => {
                self.api.set_bearer(Some(token));
                self.refresh_profile().await
            }
            None => {
                self.enter_unauthenticated();
                Ok(())
            }
        }
    }

    /// Fetch the profile and settle into Authenticated, or discard the token
    /// and settle into Unauthenticated when the backend rejects it.
    pub async fn refresh_profile(&self) -> Result<()> {
        match self.api.profile().await {
            Ok(profile) => {
                if let Ok(mut store) = self.store.lock() {
                    store.set_profile(profile.clone());
                    if let Err(e) = store.save() {
                        warn!("failed to persist profile snapshot: {}", e);
                    }
                }
                if let Ok(mut data) = self.data.write() {
                    data.state = SessionState::Authenticated;
                    data.user = Some(profile);
                }
                // Screens expect both to be warm right after sign-in.
                futures::join!(self.refresh_subscription(), self.refresh_credits());
                Ok(())
            }
            Err(e) => {
                debug!("profile fetch failed, discarding stored token: {}", e);
                self.discard_session();
                Ok(())
            }
        }
    }

    /// No-op unless authenticated; a failed fetch clears the cached value.
    pub async fn refresh_subscription(&self) {
        if !self.is_authenticated() {
            return;
        }
        let subscription = match self.api.subscription_status().await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!("failed to fetch subscription status: {}", e);
                None
            }
        };
        if let Ok(mut data) = self.data.write() {
            data.subscription = subscription;
        }
    }

    /// No-op unless authenticated; a failed fetch clears the cached value.
    pub async fn refresh_credits(&self) {
        if !self.is_authenticated() {
            return;
        }
        let credits = match self.api.credits().await {
            Ok(credits) => Some(credits),
            Err(e) => {
                warn!("failed to fetch credits: {}", e);
                None
            }
        };
        if let Ok(mut data) = self.data.write() {
            data.credits = credits;
        }
    }

    /// Exchange credentials for a token, persist it, and re-run the profile
    /// fetch. `Error::EmailNotVerified` is surfaced distinctly so the caller
    /// can prompt for confirmation.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let grant = self.api.sign_in(email, password).await?;
        self.adopt_token(&grant)?;
        self.refresh_profile().await
    }

    /// Register a new account. Does not authenticate; the backend wants the
    /// email address verified first.
    pub async fn sign_up(&self, request: SignupRequest) -> Result<String> {
        self.api.sign_up(request).await
    }

    pub async fn verify_email(&self, token: &str) -> Result<String> {
        self.api.verify_email(token).await
    }

    /// Complete the Google OAuth callback.
    ///
    /// The exchange runs at most once per authorization code: duplicates are
    /// rejected with `Error::SignInInProgress`, and a short debounce before
    /// the network call soaks up rapid re-invocations from the caller.
    pub async fn handle_google_callback(&self, code: &str, redirect_uri: &str) -> Result<()> {
        if !self.google_exchanges.try_begin(code) {
            return Err(Error::SignInInProgress);
        }

        tokio::time::sleep(GOOGLE_EXCHANGE_DEBOUNCE).await;

        let grant = match self.api.exchange_google_code(code, redirect_uri).await {
            Ok(grant) => grant,
            Err(e) => {
                self.google_exchanges.abort(code);
                return Err(e);
            }
        };
        self.google_exchanges.complete(code);

        // The backend saw this code before; keep whatever session we have.
        if grant.already_processed {
            return Ok(());
        }

        self.adopt_token(&grant)?;
        self.refresh_profile().await
    }

    /// Clear token, snapshot, and all derived state.
    pub fn sign_out(&self) {
        self.discard_session();
    }

    fn adopt_token(&self, grant: &TokenGrant) -> Result<()> {
        if let Ok(mut store) = self.store.lock() {
            store.set_token(&grant.access_token);
            store.save()?;
        }
        self.api.set_bearer(Some(grant.access_token.clone()));
        Ok(())
    }

    fn enter_unauthenticated(&self) {
        if let Ok(mut data) = self.data.write() {
            *data = SessionData {
                state: SessionState::Unauthenticated,
                ..SessionData::default()
            };
        }
    }

    fn discard_session(&self) {
        if let Ok(mut store) = self.store.lock() {
            store.clear();
            if let Err(e) = store.save() {
                warn!("failed to clear persisted session: {}", e);
            }
        }
        self.api.set_bearer(None);
        self.enter_unauthenticated();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use exactmails_api::PlanStatus;
    use std::sync::Arc;

    fn sample_profile() -> UserProfile {
        UserProfile {
            id: "u_1".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            profile_picture: None,
            api_key: "ak_live_1".into(),
            subscription_id: Some(3),
            subscription_plan_status: Some("active".into()),
            subscription_expiry: None,
            active_credits: 120,
            used_credits: 30,
            new_requested_email: None,
            created_at: Utc::now(),
        }
    }

    fn sample_credits() -> Credits {
        Credits {
            active_credits: 120,
            used_credits: Some(30),
        }
    }

    fn sample_subscription() -> SubscriptionStatus {
        SubscriptionStatus {
            has_subscription: true,
            plan_name: Some("Starter".into()),
            plan_id: Some(3),
            subscription_status: Some(PlanStatus::Active),
            expiry_date: None,
            credits: Some(120),
            auto_renew: Some(true),
        }
    }

    fn grant(token: &str) -> TokenGrant {
        TokenGrant {
            access_token: token.into(),
            token_type: "bearer".into(),
            expires_in: Some(3600),
            already_processed: false,
        }
    }

    fn store_with_token(dir: &tempfile::TempDir, token: Option<&str>) -> SessionStore {
        let mut store = SessionStore::at_path(dir.path().join("session.json"));
        if let Some(token) = token {
            store.set_token(token);
        }
        store
    }

    fn expect_profile_refresh(mock: &mut MockSessionApi) {
        mock.expect_profile()
            .times(1)
            .returning(|| Ok(sample_profile()));
        mock.expect_subscription_status()
            .times(1)
            .returning(|| Ok(sample_subscription()));
        mock.expect_credits()
            .times(1)
            .returning(|| Ok(sample_credits()));
    }

    #[tokio::test]
    async fn test_initialize_without_token_settles_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockSessionApi::new();

        let session = Session::new(mock, store_with_token(&dir, None));
        assert_eq!(session.state(), SessionState::Loading);

        session.initialize().await.unwrap();
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(session.user().is_none());
        assert!(session.credits().is_none());
        assert!(session.subscription().is_none());
    }

    #[tokio::test]
    async fn test_initialize_with_token_authenticates_and_warms_derived_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockSessionApi::new();
        mock.expect_set_bearer().times(1).return_const(());
        expect_profile_refresh(&mut mock);

        let session = Session::new(mock, store_with_token(&dir, Some("tok_1")));
        session.initialize().await.unwrap();

        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(session.user().unwrap().username, "ada");
        assert_eq!(session.credits().unwrap().active_credits, 120);
        assert!(session.subscription().unwrap().has_subscription);
    }

    #[tokio::test]
    async fn test_rejected_token_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockSessionApi::new();
        // Once with the stored token, once clearing it.
        mock.expect_set_bearer().times(2).return_const(());
        mock.expect_profile()
            .times(1)
            .returning(|| Err(Error::ApiError("401".into())));

        let session = Session::new(mock, store_with_token(&dir, Some("tok_stale")));
        session.initialize().await.unwrap();

        assert_eq!(session.state(), SessionState::Unauthenticated);

        // The file on disk no longer carries the bad token either.
        let reloaded = SessionStore::load_from(dir.path().join("session.json")).unwrap();
        assert!(!reloaded.has_token());
    }

    #[tokio::test]
    async fn test_sign_in_persists_token_and_authenticates() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockSessionApi::new();
        mock.expect_sign_in()
            .times(1)
            .returning(|_, _| Ok(grant("tok_fresh")));
        mock.expect_set_bearer().times(1).return_const(());
        expect_profile_refresh(&mut mock);

        let session = Session::new(mock, store_with_token(&dir, None));
        session.sign_in("ada@example.com", "hunter2").await.unwrap();

        assert!(session.is_authenticated());
        let reloaded = SessionStore::load_from(dir.path().join("session.json")).unwrap();
        assert_eq!(reloaded.token(), Some("tok_fresh".to_string()));
        assert_eq!(reloaded.profile().unwrap().username, "ada");
    }

    #[tokio::test]
    async fn test_sign_in_surfaces_unverified_email() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockSessionApi::new();
        mock.expect_sign_in()
            .times(1)
            .returning(|_, _| Err(Error::EmailNotVerified));

        let session = Session::new(mock, store_with_token(&dir, None));
        session.initialize().await.unwrap();

        let err = session.sign_in("ada@example.com", "hunter2").await;
        assert!(matches!(err, Err(Error::EmailNotVerified)));
        assert_eq!(session.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_concurrent_google_callbacks_exchange_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockSessionApi::new();
        mock.expect_exchange_google_code()
            .times(1)
            .returning(|_, _| Ok(grant("tok_google")));
        mock.expect_set_bearer().times(1).return_const(());
        expect_profile_refresh(&mut mock);

        let session = Arc::new(Session::new(mock, store_with_token(&dir, None)));

        let a = session.clone();
        let b = session.clone();
        let (first, second) = tokio::join!(
            async move { a.handle_google_callback("code_1", "http://localhost/cb").await },
            async move { b.handle_google_callback("code_1", "http://localhost/cb").await },
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(Error::SignInInProgress))));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_completed_code_is_never_exchanged_again() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockSessionApi::new();
        mock.expect_exchange_google_code()
            .times(1)
            .returning(|_, _| Ok(grant("tok_google")));
        mock.expect_set_bearer().times(1).return_const(());
        expect_profile_refresh(&mut mock);

        let session = Session::new(mock, store_with_token(&dir, None));
        session
            .handle_google_callback("code_1", "http://localhost/cb")
            .await
            .unwrap();

        let again = session
            .handle_google_callback("code_1", "http://localhost/cb")
            .await;
        assert!(matches!(again, Err(Error::SignInInProgress)));
    }

    #[tokio::test]
    async fn test_failed_exchange_releases_the_code_for_retry() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockSessionApi::new();
        let mut attempts = 0;
        mock.expect_exchange_google_code()
            .times(2)
            .returning(move |_, _| {
                attempts += 1;
                if attempts == 1 {
                    Err(Error::ApiError("gateway timeout".into()))
                } else {
                    Ok(grant("tok_google"))
                }
            });
        mock.expect_set_bearer().times(1).return_const(());
        expect_profile_refresh(&mut mock);

        let session = Session::new(mock, store_with_token(&dir, None));
        assert!(session
            .handle_google_callback("code_1", "http://localhost/cb")
            .await
            .is_err());
        session
            .handle_google_callback("code_1", "http://localhost/cb")
            .await
            .unwrap();
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_already_processed_grant_keeps_existing_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockSessionApi::new();
        mock.expect_exchange_google_code().times(1).returning(|_, _| {
            Ok(TokenGrant {
                already_processed: true,
                ..grant("tok_google")
            })
        });
        // No set_bearer, no profile fetch.

        let session = Session::new(mock, store_with_token(&dir, None));
        session
            .handle_google_callback("code_1", "http://localhost/cb")
            .await
            .unwrap();
        assert_eq!(session.state(), SessionState::Loading);
    }

    #[tokio::test]
    async fn test_sign_out_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockSessionApi::new();
        mock.expect_set_bearer().times(2).return_const(());
        expect_profile_refresh(&mut mock);

        let session = Session::new(mock, store_with_token(&dir, Some("tok_1")));
        session.initialize().await.unwrap();
        assert!(session.is_authenticated());

        session.sign_out();
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(session.user().is_none());
        assert!(session.credits().is_none());

        let reloaded = SessionStore::load_from(dir.path().join("session.json")).unwrap();
        assert!(!reloaded.has_token());
        assert!(reloaded.profile().is_none());
    }
}
