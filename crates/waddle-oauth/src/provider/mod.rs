//! Authorization servers `waddle` knows how to talk to.

use url::Url;

use crate::error::Result;

/// Gmail scope that allows listing and reading messages.
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Facebook Graph API version used for the login dialog.
pub const FACEBOOK_GRAPH_VERSION: &str = "v19.0";

/// Endpoints and request conventions of one authorization server.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Display name, used in logs.
    pub name: &'static str,
    /// Where the user is sent to grant access.
    pub auth_url: Url,
    /// Where codes and refresh tokens are traded for access tokens.
    pub token_url: Url,
    /// Scopes requested on every authorization.
    pub scopes: &'static [&'static str],
    /// Joins scopes in the `scope` parameter.
    pub scope_separator: char,
    /// Extra query parameters on the authorization URL.
    pub extra_auth_params: &'static [(&'static str, &'static str)],
}

impl Provider {
    /// Google, asking for read-only Gmail access and the account email.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL fails to parse.
    pub fn google() -> Result<Self> {
        Ok(Self {
            name: "Google",
            auth_url: Url::parse("https://accounts.google.com/o/oauth2/v2/auth")?,
            token_url: Url::parse("https://oauth2.googleapis.com/token")?,
            scopes: &[GMAIL_READONLY_SCOPE, "email"],
            scope_separator: ' ',
            // Google only issues a refresh token for offline access with fresh consent.
            extra_auth_params: &[("access_type", "offline"), ("prompt", "consent")],
        })
    }

    /// Facebook, asking for the profile name and the user's events.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL fails to parse.
    pub fn facebook() -> Result<Self> {
        Ok(Self {
            name: "Facebook",
            auth_url: Url::parse(&format!(
                "https://www.facebook.com/{FACEBOOK_GRAPH_VERSION}/dialog/oauth"
            ))?,
            token_url: Url::parse(&format!(
                "https://graph.facebook.com/{FACEBOOK_GRAPH_VERSION}/oauth/access_token"
            ))?,
            scopes: &["public_profile", "user_events"],
            scope_separator: ',',
            extra_auth_params: &[],
        })
    }

    /// Value of the `scope` parameter.
    #[must_use]
    pub fn scope_param(&self) -> String {
        self.scopes.join(&self.scope_separator.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_google_scopes_space_separated() {
        let google = Provider::google().unwrap();
        assert_eq!(
            google.scope_param(),
            format!("{GMAIL_READONLY_SCOPE} email")
        );
        assert!(google.extra_auth_params.contains(&("access_type", "offline")));
    }

    #[test]
    fn test_facebook_scopes_comma_separated() {
        let facebook = Provider::facebook().unwrap();
        assert_eq!(facebook.scope_param(), "public_profile,user_events");
        assert!(facebook.extra_auth_params.is_empty());
        assert_eq!(
            facebook.token_url.as_str(),
            "https://graph.facebook.com/v19.0/oauth/access_token"
        );
    }
}
