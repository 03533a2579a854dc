//! The browser leg of the grant: building the consent URL and reading the
//! code back out of the redirect the user pastes.

use url::Url;

use super::{OAuthClient, PkceChallenge};
use crate::error::{Error, Result};
use crate::token::Token;

/// One authorization attempt.
///
/// The user opens [`Self::authorization_url`] in a browser, approves access,
/// and pastes the URL the browser was redirected to back into the terminal.
#[derive(Debug)]
pub struct AuthorizationCodeFlow {
    client: OAuthClient,
    pkce: Option<PkceChallenge>,
}

impl AuthorizationCodeFlow {
    /// Starts an attempt for `client`.
    #[must_use]
    pub const fn new(client: OAuthClient) -> Self {
        Self { client, pkce: None }
    }

    /// Protects the attempt with a fresh PKCE pair.
    #[must_use]
    pub fn with_pkce(mut self) -> Self {
        self.pkce = Some(PkceChallenge::generate());
        self
    }

    /// The client this attempt authorizes.
    #[must_use]
    pub const fn client(&self) -> &OAuthClient {
        &self.client
    }

    /// Consent URL for the provider's scopes. `state` comes back unchanged
    /// in the redirect.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> Url {
        let provider = &self.client.provider;
        let mut url = provider.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client.client_id)
                .append_pair("scope", &provider.scope_param())
                .append_pair("state", state);
            if let Some(uri) = &self.client.redirect_uri {
                query.append_pair("redirect_uri", uri);
            }
            if let Some(pkce) = &self.pkce {
                query
                    .append_pair("code_challenge", pkce.challenge())
                    .append_pair("code_challenge_method", pkce.method());
            }
            query.extend_pairs(provider.extra_auth_params);
        }
        url
    }

    /// Extracts the authorization code from a pasted redirect URL.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] if the text is not a URL
    /// - [`Error::AccessDenied`] if the provider redirected with an `error`
    /// - [`Error::StateMismatch`] if `state` is missing or differs
    /// - [`Error::MissingCode`] if there is no `code`
    pub fn code_from_redirect(&self, redirect: &str, expected_state: &str) -> Result<String> {
        let url = Url::parse(redirect.trim())?;
        let param = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        if param("error").is_some() {
            return Err(Error::AccessDenied);
        }
        if param("state").as_deref() != Some(expected_state) {
            return Err(Error::StateMismatch);
        }
        param("code")
            .filter(|code| !code.is_empty())
            .ok_or(Error::MissingCode)
    }

    /// Redeems `code` for a token, sending the PKCE verifier if there is one.
    ///
    /// # Errors
    ///
    /// Returns whatever the token endpoint reports.
    pub async fn exchange_code(&self, code: &str) -> Result<Token> {
        let verifier = self.pkce.as_ref().map(PkceChallenge::verifier);
        self.client.redeem_code(code, verifier).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::provider::Provider;

    fn google_flow() -> AuthorizationCodeFlow {
        let client = OAuthClient::new("test_client", Provider::google().unwrap())
            .with_redirect_uri("http://localhost");
        AuthorizationCodeFlow::new(client)
    }

    #[test]
    fn test_google_url() {
        let url = google_flow().authorization_url("xyz");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let has = |k: &str, v: &str| pairs.iter().any(|(pk, pv)| pk == k && pv == v);

        assert!(url.as_str().starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(has("client_id", "test_client"));
        assert!(has("response_type", "code"));
        assert!(has("state", "xyz"));
        assert!(has("redirect_uri", "http://localhost"));
        assert!(has("access_type", "offline"));
        assert!(has("prompt", "consent"));
        assert!(!pairs.iter().any(|(k, _)| k == "code_challenge"));
    }

    #[test]
    fn test_pkce_challenge_in_url() {
        let flow = google_flow().with_pkce();
        let url = flow.authorization_url("xyz");
        let challenge = flow.pkce.as_ref().unwrap().challenge().to_string();

        assert!(url.query_pairs().any(|(k, v)| k == "code_challenge" && v == challenge));
        assert!(url.query_pairs().any(|(k, v)| k == "code_challenge_method" && v == "S256"));
    }

    #[test]
    fn test_facebook_url() {
        let client = OAuthClient::new("fb_client", Provider::facebook().unwrap());
        let url = AuthorizationCodeFlow::new(client).authorization_url("xyz");

        assert!(url.as_str().contains("scope=public_profile%2Cuser_events"));
        assert!(!url.as_str().contains("access_type"));
    }

    #[test]
    fn test_code_from_redirect() {
        let flow = google_flow();
        let code = flow
            .code_from_redirect("  http://localhost/?state=abc&code=4%2F0AX&scope=email\n", "abc")
            .unwrap();
        assert_eq!(code, "4/0AX");

        let facebook = "https://www.facebook.com/connect/login_success.html?code=AQD&state=abc#_=_";
        assert_eq!(flow.code_from_redirect(facebook, "abc").unwrap(), "AQD");
    }

    #[test]
    fn test_code_from_redirect_errors() {
        let flow = google_flow();
        assert!(matches!(
            flow.code_from_redirect("http://localhost/?error=access_denied&state=abc", "abc"),
            Err(Error::AccessDenied)
        ));
        assert!(matches!(
            flow.code_from_redirect("http://localhost/?code=x&state=other", "abc"),
            Err(Error::StateMismatch)
        ));
        assert!(matches!(
            flow.code_from_redirect("http://localhost/?code=x", "abc"),
            Err(Error::StateMismatch)
        ));
        assert!(matches!(
            flow.code_from_redirect("http://localhost/?state=abc&code=", "abc"),
            Err(Error::MissingCode)
        ));
        assert!(matches!(
            flow.code_from_redirect("not a url", "abc"),
            Err(Error::Url(_))
        ));
    }
}
