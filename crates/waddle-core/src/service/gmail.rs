//! Gmail adapter over the Gmail REST API.

use std::time::Duration;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;
use waddle_oauth::{AuthorizationCodeFlow, OAuthClient, Provider, Token};

use super::http::ApiClient;
use super::{SharedRuntime, authorize_in_browser, merge_page};
use crate::config::GmailConfig;
use crate::console::Console;
use crate::credentials::TokenStore;
use crate::error::{AuthError, RenderError, SourceError};
use crate::session::ServiceProfile;
use crate::source::{Connection, CredentialProvider, Identity, Renderer, index_width, truncate_chars};

/// Base URL of the authenticated user's Gmail resources.
pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me/";

const TOKENS: TokenStore = TokenStore::new("gmail");

/// Largest page Gmail hands out for a message listing.
const PAGE_SIZE: usize = 500;

const FROM_WIDTH: usize = 45;
const SNIPPET_CHARS: usize = 140;

/// Gmail bodies are base64url, with or without padding.
const BODY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Session profile for Gmail.
#[must_use]
pub fn profile(config: &GmailConfig) -> ServiceProfile {
    ServiceProfile {
        name: "Gmail".to_string(),
        description: "This service allows you to view emails from your Gmail account.".to_string(),
        noun: "emails".to_string(),
        recent_query: config.recent_query.clone(),
        recent_count: config.recent_count,
    }
}

/// Hands out Gmail connections, reusing the keyring token when it can.
#[derive(Debug)]
pub struct GmailCredentials {
    config: GmailConfig,
    timeout: Duration,
    runtime: SharedRuntime,
}

impl GmailCredentials {
    /// Creates a provider for the configured Google client.
    #[must_use]
    pub const fn new(config: GmailConfig, timeout: Duration, runtime: SharedRuntime) -> Self {
        Self {
            config,
            timeout,
            runtime,
        }
    }

    fn flow(&self) -> Result<AuthorizationCodeFlow, AuthError> {
        let client_id = self.config.client_id.as_deref().ok_or_else(|| {
            AuthError::MissingCredentials("`gmail.client_id` is not configured".into())
        })?;

        let mut client = OAuthClient::new(client_id, Provider::google()?)
            .with_redirect_uri(&self.config.redirect_uri)
            .with_timeout(self.timeout)?;
        if let Some(secret) = &self.config.client_secret {
            client = client.with_client_secret(secret);
        }
        Ok(AuthorizationCodeFlow::new(client).with_pkce())
    }

    /// The stored token, refreshed if it expired. Storage problems are
    /// logged and treated as "no token".
    fn stored_token(&self, flow: &AuthorizationCodeFlow) -> Option<Token> {
        let token = match TOKENS.load() {
            Ok(token) => token?,
            Err(e) => {
                warn!("could not read stored Gmail token: {e}");
                return None;
            }
        };
        if token.is_valid() {
            return Some(token);
        }

        debug!("stored Gmail token expired, refreshing");
        match self.runtime.block_on(flow.client().refresh_token(&token)) {
            Ok(refreshed) => Some(refreshed),
            Err(e) => {
                warn!("could not refresh stored Gmail token: {e}");
                None
            }
        }
    }

    fn connect(&self, token: Token) -> Result<(GmailConnection, Identity), SourceError> {
        let base = Url::parse(GMAIL_API_BASE).map_err(|e| SourceError::Request(e.to_string()))?;
        let api = ApiClient::new(base, token, self.timeout, self.runtime.clone())?;
        let profile: Profile = api.get("profile", &[])?;
        Ok((GmailConnection { api }, Identity::new(profile.email_address)))
    }
}

impl CredentialProvider for GmailCredentials {
    type Connection = GmailConnection;

    fn acquire(
        &mut self,
        console: &mut Console,
        current: Option<&Identity>,
    ) -> Result<(GmailConnection, Identity), AuthError> {
        let flow = self.flow()?;

        if current.is_none()
            && let Some(token) = self.stored_token(&flow)
        {
            match self.connect(token.clone()) {
                Ok(connected) => {
                    info!(identity = %connected.1, "reusing stored Gmail token");
                    remember(&token);
                    return Ok(connected);
                }
                Err(e) if e.is_unauthorized() => {
                    warn!("stored Gmail token was refused: {e}");
                    if let Err(e) = TOKENS.forget() {
                        warn!("could not drop stored Gmail token: {e}");
                    }
                }
                // Transient failure: keep the entry.
                Err(e) => warn!("could not check stored Gmail token: {e}"),
            }
        }

        let token = authorize_in_browser(console, &flow, &self.runtime, "Gmail")?;
        let connected = self
            .connect(token.clone())
            .map_err(|e| AuthError::Rejected(e.to_string()))?;
        remember(&token);
        Ok(connected)
    }
}

fn remember(token: &Token) {
    if let Err(e) = TOKENS.save(token) {
        warn!("could not store Gmail token: {e}");
    }
}

/// An authenticated Gmail API handle.
#[derive(Debug)]
pub struct GmailConnection {
    api: ApiClient,
}

impl Connection for GmailConnection {
    type Summary = GmailMessage;
    type Detail = GmailMessage;

    fn list(&mut self, query: &str, limit: Option<usize>) -> Result<Vec<GmailMessage>, SourceError> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let wanted = limit.map_or(PAGE_SIZE, |l| l.saturating_sub(ids.len()).min(PAGE_SIZE));
            let max_results = wanted.to_string();
            let mut params = vec![("q", query), ("maxResults", max_results.as_str())];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.as_str()));
            }

            let page: ListResponse = self.api.get("messages", &params)?;
            page_token = merge_page(&mut ids, page.ids(), page.next_page_token, limit);
            if page_token.is_none() {
                break;
            }
        }
        debug!(query, count = ids.len(), "fetching Gmail message metadata");

        ids.iter()
            .map(|id| {
                self.api.get::<GmailMessage>(
                    &format!("messages/{id}"),
                    &[
                        ("format", "metadata"),
                        ("metadataHeaders", "From"),
                        ("metadataHeaders", "Subject"),
                        ("metadataHeaders", "Date"),
                    ],
                )
            })
            .collect()
    }

    fn fetch_detail(&mut self, item: &GmailMessage) -> Result<GmailMessage, SourceError> {
        self.api
            .get(&format!("messages/{}", item.id), &[("format", "full")])
    }

    fn close(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// A Gmail message resource, as returned by `messages.get`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailMessage {
    /// Message id.
    pub id: String,
    /// Thread the message belongs to.
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Short plain-text preview.
    #[serde(default)]
    pub snippet: Option<String>,
    /// MIME tree; absent in `minimal` format.
    #[serde(default)]
    pub payload: Option<MessagePart>,
}

/// One node of a message's MIME tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    /// Content type, e.g. `text/plain`.
    #[serde(default)]
    pub mime_type: String,
    /// Headers on this part.
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Inline body of this part.
    #[serde(default)]
    pub body: Option<PartBody>,
    /// Child parts of a multipart node.
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

/// A single message header.
#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

/// Body of a message part.
#[derive(Debug, Clone, Deserialize)]
pub struct PartBody {
    /// base64url-encoded content, if inline.
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

impl ListResponse {
    fn ids(&self) -> Vec<String> {
        self.messages.iter().map(|m| m.id.clone()).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    email_address: String,
}

impl GmailMessage {
    /// Value of the first top-level header called `name`, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Readable body text: `text/plain` if present, else `text/html`
    /// converted to Markdown.
    #[must_use]
    pub fn body_text(&self) -> Option<String> {
        let payload = self.payload.as_ref()?;
        if let Some(text) = payload.find_decoded("text/plain") {
            return Some(text);
        }
        let html = payload.find_decoded("text/html")?;
        match htmd::convert(&html) {
            Ok(markdown) => Some(markdown),
            Err(e) => {
                warn!(id = %self.id, "could not convert HTML body: {e}");
                Some(html)
            }
        }
    }
}

impl MessagePart {
    /// Decoded body of the first part of `mime_type`, depth first.
    fn find_decoded(&self, mime_type: &str) -> Option<String> {
        if self.mime_type.eq_ignore_ascii_case(mime_type)
            && let Some(data) = self.body.as_ref().and_then(|b| b.data.as_deref())
        {
            match BODY_ENGINE.decode(data) {
                Ok(bytes) => return Some(String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => warn!("undecodable {mime_type} part: {e}"),
            }
        }
        self.parts.iter().find_map(|part| part.find_decoded(mime_type))
    }
}

/// Renders Gmail messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct GmailRenderer;

impl Renderer for GmailRenderer {
    type Summary = GmailMessage;
    type Detail = GmailMessage;

    fn summary(&self, index: usize, total: usize, item: &GmailMessage) -> Result<String, RenderError> {
        let from = item
            .header("From")
            .ok_or_else(|| RenderError::missing("message", "From"))?;
        let snippet = item
            .snippet
            .as_deref()
            .ok_or_else(|| RenderError::missing("message", "snippet"))?;

        Ok(format!(
            "|{index:>width$}|{from:>from_width$} | {snippet}",
            width = index_width(total),
            from_width = FROM_WIDTH,
            from = truncate_chars(from, FROM_WIDTH),
            snippet = truncate_chars(snippet, SNIPPET_CHARS),
        ))
    }

    fn detail(&self, item: &GmailMessage) -> Result<String, RenderError> {
        let from = item
            .header("From")
            .ok_or_else(|| RenderError::missing("message", "From"))?;
        let body = item.body_text().unwrap_or_default();

        Ok(format!(
            "From: {from}\nDate: {}\nSubject: {}\n\n{}",
            item.header("Date").unwrap_or_default(),
            item.header("Subject").unwrap_or_default(),
            body.trim_end(),
        ))
    }
}
