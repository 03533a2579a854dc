//! Errors raised while authorizing against a provider.

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Authorization failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The token endpoint could not be reached.
    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A token endpoint body was not the JSON we expected.
    #[error("Malformed token response: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider answered with an error body.
    #[error("Provider refused the request ({code}): {description}")]
    Refused {
        /// Error code, e.g. `invalid_grant` or `OAuthException`.
        code: String,
        /// Human-readable explanation from the provider.
        description: String,
    },

    /// A refresh was attempted with a token that cannot be refreshed.
    #[error("Token has no refresh token")]
    NoRefreshToken,

    /// The token endpoint answered with something other than a token.
    #[error("Unexpected token response: {0}")]
    InvalidResponse(String),

    /// The user declined access in the browser.
    #[error("Access was denied in the browser")]
    AccessDenied,

    /// The pasted redirect belongs to another authorization attempt.
    #[error("The pasted URL does not match this authorization attempt")]
    StateMismatch,

    /// The pasted redirect carries no authorization code.
    #[error("The pasted URL carries no authorization code")]
    MissingCode,

    /// The pasted text, or a configured endpoint, is not a URL.
    #[error("Not a valid URL: {0}")]
    Url(#[from] url::ParseError),
}
