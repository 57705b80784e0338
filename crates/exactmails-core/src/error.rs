use thiserror::Error;

/// All the ways things can go wrong in the Exact Mails client
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// The account exists but the backend refuses sign-in until the email
    /// address is confirmed. Kept distinct so screens can offer a
    /// "resend verification" path instead of a generic failure banner.
    #[error("EMAIL_NOT_VERIFIED")]
    EmailNotVerified,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Username already taken")]
    UsernameTaken,

    /// A Google sign-in exchange for this authorization code is already
    /// running or has already completed.
    #[error("Google sign-in is already in progress")]
    SignInInProgress,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<exactmails_api::ApiError> for Error {
    fn from(err: exactmails_api::ApiError) -> Self {
        Error::ApiError(err.to_string())
    }
}

impl From<exactmails_api::AuthError> for Error {
    fn from(err: exactmails_api::AuthError) -> Self {
        use exactmails_api::AuthError;
        match err {
            AuthError::EmailNotVerified => Error::EmailNotVerified,
            AuthError::EmailAlreadyRegistered => Error::EmailAlreadyRegistered,
            AuthError::UsernameTaken => Error::UsernameTaken,
            AuthError::Api(api) => Error::ApiError(api.to_string()),
        }
    }
}
