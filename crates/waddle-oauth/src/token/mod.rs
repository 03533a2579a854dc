//! Access tokens and token endpoint payloads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tokens count as expired this many seconds before they actually expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// An access token and what is known about its lifetime.
///
/// Serialized as JSON when kept in the keyring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Bearer credential sent to the API.
    pub access_token: String,
    /// Token type, normally `Bearer`.
    pub token_type: String,
    /// When the access token stops working, if the provider said.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Long-lived credential for minting new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Scopes actually granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Token {
    /// A token with no known expiry and no refresh token.
    #[must_use]
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_at: None,
            refresh_token: None,
            scope: None,
        }
    }

    /// Attaches a refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Sets the expiry instant.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the token has expired or is about to.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| at - Duration::seconds(EXPIRY_MARGIN_SECS) <= Utc::now())
    }

    /// Inverse of [`Self::is_expired`]. Tokens without an expiry stay valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }

    /// The refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRefreshToken`] if there is none.
    pub fn refresh_token(&self) -> Result<&str> {
        self.refresh_token.as_deref().ok_or(Error::NoRefreshToken)
    }
}

fn bearer() -> String {
    "Bearer".to_string()
}

/// Successful token endpoint body (RFC 6749 section 5.1).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type. Facebook has historically left this out.
    #[serde(default = "bearer")]
    pub token_type: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u32>,
    /// Refresh token, if one was issued.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

impl TryFrom<TokenResponse> for Token {
    type Error = Error;

    fn try_from(response: TokenResponse) -> Result<Self> {
        if response.access_token.is_empty() {
            return Err(Error::InvalidResponse("empty access_token".into()));
        }
        Ok(Self {
            expires_at: response
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(i64::from(secs))),
            access_token: response.access_token,
            token_type: response.token_type,
            refresh_token: response.refresh_token,
            scope: response.scope,
        })
    }
}

/// Error body of a token endpoint.
///
/// Google follows RFC 6749 (`{"error": "...", "error_description": "..."}`);
/// the Graph API nests an object (`{"error": {"message": "...", "type": "..."}}`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorBody {
    Rfc6749 {
        error: String,
        #[serde(default)]
        error_description: String,
    },
    Graph {
        error: GraphError,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GraphError {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
}

impl From<ErrorBody> for Error {
    fn from(body: ErrorBody) -> Self {
        let (code, description) = match body {
            ErrorBody::Rfc6749 {
                error,
                error_description,
            } => (error, error_description),
            ErrorBody::Graph { error } => (error.kind, error.message),
        };
        Self::Refused { code, description }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_margin() {
        let stale = Token::new("a", "Bearer").with_expires_at(Utc::now() + Duration::seconds(30));
        assert!(stale.is_expired());

        let fresh = Token::new("a", "Bearer").with_expires_at(Utc::now() + Duration::hours(1));
        assert!(fresh.is_valid());

        assert!(Token::new("a", "Bearer").is_valid());
    }

    #[test]
    fn test_refresh_token_accessor() {
        let token = Token::new("a", "Bearer");
        assert!(matches!(token.refresh_token(), Err(Error::NoRefreshToken)));
        assert_eq!(token.with_refresh_token("r").refresh_token().unwrap(), "r");
    }

    #[test]
    fn test_facebook_body_without_token_type() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"EAAB","expires_in":5183944}"#).unwrap();
        let token = Token::try_from(response).unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert!(token.expires_at.is_some());
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_empty_access_token_rejected() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"","token_type":"Bearer"}"#).unwrap();
        assert!(matches!(
            Token::try_from(response),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_keyring_json_roundtrip_keeps_refresh_token() {
        let token = Token::new("a", "Bearer").with_refresh_token("r");
        let json = serde_json::to_string(&token).unwrap();
        assert!(!json.contains("expires_at"));
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back.refresh_token.as_deref(), Some("r"));
    }

    #[test]
    fn test_error_bodies() {
        let google: ErrorBody =
            serde_json::from_str(r#"{"error":"invalid_grant","error_description":"Bad code"}"#)
                .unwrap();
        assert!(matches!(
            Error::from(google),
            Error::Refused { code, description } if code == "invalid_grant" && description == "Bad code"
        ));

        let graph: ErrorBody = serde_json::from_str(
            r#"{"error":{"message":"Invalid verification code","type":"OAuthException","code":100}}"#,
        )
        .unwrap();
        assert!(matches!(
            Error::from(graph),
            Error::Refused { code, .. } if code == "OAuthException"
        ));
    }
}
