//! Authorization code grant against a [`Provider`].

mod code;
mod pkce;

pub use code::AuthorizationCodeFlow;
pub use pkce::PkceChallenge;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use reqwest::Client;

use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::token::{ErrorBody, Token, TokenResponse};

/// Random `state` value tying a redirect to the request that caused it.
#[must_use]
pub fn random_state() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// A registered client of one provider.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    /// Client id issued by the provider.
    pub client_id: String,
    /// Client secret, for confidential clients.
    pub client_secret: Option<String>,
    /// Redirect URI registered with the provider.
    pub redirect_uri: Option<String>,
    /// The provider this client belongs to.
    pub provider: Provider,
    http: Client,
}

impl OAuthClient {
    /// A public client with no secret and no redirect URI.
    #[must_use]
    pub fn new(client_id: impl Into<String>, provider: Provider) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: None,
            provider,
            http: Client::new(),
        }
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Bounds every token request by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Trades `token`'s refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRefreshToken`] without any request if `token`
    /// cannot be refreshed, or whatever the token endpoint reports.
    pub async fn refresh_token(&self, token: &Token) -> Result<Token> {
        let refresh_token = token.refresh_token()?;
        let mut fresh = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        // Providers may leave out an unchanged refresh token.
        if fresh.refresh_token.is_none() {
            fresh.refresh_token.clone_from(&token.refresh_token);
        }
        Ok(fresh)
    }

    pub(crate) async fn redeem_code(&self, code: &str, verifier: Option<&str>) -> Result<Token> {
        let mut grant = vec![("grant_type", "authorization_code"), ("code", code)];
        if let Some(uri) = &self.redirect_uri {
            grant.push(("redirect_uri", uri.as_str()));
        }
        if let Some(verifier) = verifier {
            grant.push(("code_verifier", verifier));
        }
        self.request_token(&grant).await
    }

    async fn request_token(&self, grant: &[(&str, &str)]) -> Result<Token> {
        let mut form = vec![("client_id", self.client_id.as_str())];
        form.extend_from_slice(grant);
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let response = self
            .http
            .post(self.provider.token_url.clone())
            .form(&form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Token::try_from(serde_json::from_str::<TokenResponse>(&body)?);
        }
        Err(serde_json::from_str::<ErrorBody>(&body).map_or_else(
            |_| Error::InvalidResponse(format!("token endpoint answered {status}")),
            Error::from,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = OAuthClient::new("app-id", Provider::facebook().unwrap())
            .with_client_secret("app-secret")
            .with_redirect_uri("https://www.facebook.com/connect/login_success.html")
            .with_timeout(Duration::from_secs(5))
            .unwrap();

        assert_eq!(client.client_id, "app-id");
        assert_eq!(client.client_secret.as_deref(), Some("app-secret"));
        assert_eq!(client.provider.name, "Facebook");
    }

    #[test]
    fn test_refresh_without_refresh_token_fails_locally() {
        let client = OAuthClient::new("id", Provider::google().unwrap());
        let result = tokio_test::block_on(client.refresh_token(&Token::new("a", "Bearer")));
        assert!(matches!(result, Err(Error::NoRefreshToken)));
    }

    #[test]
    fn test_random_state() {
        let a = random_state();
        assert_eq!(a.len(), 22);
        assert_ne!(a, random_state());
    }
}
