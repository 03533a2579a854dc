//! Facebook adapter over the Graph API.

use std::time::Duration;

use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;
use url::Url;
use waddle_oauth::{AuthorizationCodeFlow, OAuthClient, Provider};

use super::http::ApiClient;
use super::{SharedRuntime, authorize_in_browser, merge_page};
use crate::config::FacebookConfig;
use crate::console::Console;
use crate::error::{AuthError, RenderError, SourceError};
use crate::session::ServiceProfile;
use crate::source::{Connection, CredentialProvider, Identity, Renderer, index_width, truncate_chars};

/// Event types `/me/events` can be filtered by.
pub const EVENT_TYPES: [&str; 5] = ["attending", "created", "declined", "maybe", "not_replied"];

/// Format of Graph API timestamps.
pub const EVENT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Format event times are shown in.
pub const EVENT_DISPLAY_FORMAT: &str = "%a %d %b %Y %H:%M";

const EVENT_FIELDS: &str = "id,name,start_time,end_time,rsvp_status,description,place";

/// Names longer than this are cut to [`NAME_KEEP_CHARS`] plus an ellipsis.
const NAME_MAX_CHARS: usize = 23;
const NAME_KEEP_CHARS: usize = 20;

/// Session profile for Facebook.
#[must_use]
pub fn profile(config: &FacebookConfig) -> ServiceProfile {
    ServiceProfile {
        name: "Facebook".to_string(),
        description: "This service allows users to interact with their Facebook account."
            .to_string(),
        noun: "events".to_string(),
        recent_query: config.recent_query.clone(),
        recent_count: config.event_count,
    }
}

/// Hands out Graph API connections via the Facebook login dialog.
#[derive(Debug)]
pub struct FacebookCredentials {
    config: FacebookConfig,
    timeout: Duration,
    runtime: SharedRuntime,
}

impl FacebookCredentials {
    /// Creates a provider for the configured Facebook app.
    #[must_use]
    pub const fn new(config: FacebookConfig, timeout: Duration, runtime: SharedRuntime) -> Self {
        Self {
            config,
            timeout,
            runtime,
        }
    }

    fn flow(&self) -> Result<AuthorizationCodeFlow, AuthError> {
        let client_id = self.config.client_id.as_deref().ok_or_else(|| {
            AuthError::MissingCredentials("`facebook.client_id` is not configured".into())
        })?;
        let secret = self.config.client_secret.as_deref().ok_or_else(|| {
            AuthError::MissingCredentials(
                "`facebook.client_secret` is not configured; set WADDLE_FACEBOOK_CLIENT_SECRET"
                    .into(),
            )
        })?;

        let client = OAuthClient::new(client_id, Provider::facebook()?)
            .with_client_secret(secret)
            .with_redirect_uri(&self.config.redirect_uri)
            .with_timeout(self.timeout)?;
        Ok(AuthorizationCodeFlow::new(client))
    }
}

impl CredentialProvider for FacebookCredentials {
    type Connection = FacebookConnection;

    fn acquire(
        &mut self,
        console: &mut Console,
        _current: Option<&Identity>,
    ) -> Result<(FacebookConnection, Identity), AuthError> {
        let flow = self.flow()?;
        let token = authorize_in_browser(console, &flow, &self.runtime, "Facebook")?;

        let rejected = |e: SourceError| AuthError::Rejected(e.to_string());
        let base = format!("https://graph.facebook.com/{}/", self.config.api_version);
        let base = Url::parse(&base).map_err(|e| AuthError::Rejected(e.to_string()))?;
        let api = ApiClient::new(base, token, self.timeout, self.runtime.clone()).map_err(rejected)?;
        let me: Me = api.get("me", &[("fields", "name")]).map_err(rejected)?;

        Ok((FacebookConnection { api }, Identity::new(me.name)))
    }
}

/// An authenticated Graph API handle.
#[derive(Debug)]
pub struct FacebookConnection {
    api: ApiClient,
}

impl Connection for FacebookConnection {
    type Summary = Event;
    type Detail = Event;

    fn list(&mut self, query: &str, limit: Option<usize>) -> Result<Vec<Event>, SourceError> {
        if !EVENT_TYPES.contains(&query) {
            return Err(SourceError::InvalidQuery(format!(
                "`{query}` is not an event type. Use one of: {}.",
                EVENT_TYPES.join(", ")
            )));
        }

        let page_limit = limit.map_or_else(|| "100".to_string(), |l| l.to_string());
        let first: EventPage = self.api.get(
            "me/events",
            &[
                ("type", query),
                ("fields", EVENT_FIELDS),
                ("limit", page_limit.as_str()),
            ],
        )?;

        let mut events = Vec::new();
        let mut next = first.merge_into(&mut events, limit);
        while let Some(url) = next {
            let url = Url::parse(&url).map_err(|e| SourceError::Decode(e.to_string()))?;
            let page: EventPage = self.api.get_url(url, &[])?;
            next = page.merge_into(&mut events, limit);
        }
        debug!(query, count = events.len(), "listed Facebook events");
        Ok(events)
    }

    fn fetch_detail(&mut self, item: &Event) -> Result<Event, SourceError> {
        self.api.get(&item.id, &[("fields", EVENT_FIELDS)])
    }

    fn close(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// A Facebook event.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event id.
    pub id: String,
    /// Event title.
    #[serde(default)]
    pub name: Option<String>,
    /// Start, in [`EVENT_DATETIME_FORMAT`].
    #[serde(default)]
    pub start_time: Option<String>,
    /// End, in [`EVENT_DATETIME_FORMAT`]; not every event has one.
    #[serde(default)]
    pub end_time: Option<String>,
    /// The user's RSVP status.
    #[serde(default)]
    pub rsvp_status: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Where the event happens.
    #[serde(default)]
    pub place: Option<Place>,
}

/// Event venue.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    /// Venue name.
    #[serde(default)]
    pub name: Option<String>,
    /// Street address.
    #[serde(default)]
    pub location: Option<Location>,
}

/// Street address of a venue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Location {
    /// Street.
    #[serde(default)]
    pub street: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Country.
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventPage {
    #[serde(default)]
    data: Vec<Event>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<String>,
}

impl EventPage {
    /// Appends this page's events; returns the next page URL while more
    /// are wanted.
    fn merge_into(self, events: &mut Vec<Event>, limit: Option<usize>) -> Option<String> {
        let next = self.paging.and_then(|p| p.next);
        merge_page(events, self.data, next, limit)
    }
}

#[derive(Debug, Deserialize)]
struct Me {
    name: String,
}

impl Place {
    fn describe(&self) -> String {
        let name = self.name.as_deref().unwrap_or_default();
        let Some(location) = &self.location else {
            return name.to_string();
        };
        let street = location.street.as_deref().unwrap_or_default();
        let city = location.city.as_deref().unwrap_or_default();
        let country = location.country.as_deref().unwrap_or_default();
        format!("{name}. {street} {city}, {country}")
    }
}

fn display_time(raw: &str, field: &'static str) -> Result<String, RenderError> {
    DateTime::parse_from_str(raw, EVENT_DATETIME_FORMAT)
        .map(|t| t.format(EVENT_DISPLAY_FORMAT).to_string())
        .map_err(|_| RenderError::missing("event", field))
}

fn short_name(name: &str) -> String {
    if name.chars().count() > NAME_MAX_CHARS {
        format!("{}...", truncate_chars(name, NAME_KEEP_CHARS))
    } else {
        name.to_string()
    }
}

/// Renders Facebook events.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacebookRenderer;

impl Renderer for FacebookRenderer {
    type Summary = Event;
    type Detail = Event;

    fn heading(&self) -> Option<String> {
        Some("i Event  Start  RSVP".to_string())
    }

    fn summary(&self, index: usize, total: usize, item: &Event) -> Result<String, RenderError> {
        let name = item
            .name
            .as_deref()
            .ok_or_else(|| RenderError::missing("event", "name"))?;
        let start = item
            .start_time
            .as_deref()
            .ok_or_else(|| RenderError::missing("event", "start_time"))?;
        let rsvp = item
            .rsvp_status
            .as_deref()
            .ok_or_else(|| RenderError::missing("event", "rsvp_status"))?;

        Ok(format!(
            "{index:>width$} {}  {}  {rsvp}",
            short_name(name),
            display_time(start, "start_time")?,
            width = index_width(total),
        ))
    }

    fn detail(&self, item: &Event) -> Result<String, RenderError> {
        let name = item
            .name
            .as_deref()
            .ok_or_else(|| RenderError::missing("event", "name"))?;
        let start = item
            .start_time
            .as_deref()
            .ok_or_else(|| RenderError::missing("event", "start_time"))?;
        let end = item
            .end_time
            .as_deref()
            .map(|raw| display_time(raw, "end_time"))
            .transpose()?
            .unwrap_or_default();
        let location = item.place.as_ref().map(Place::describe).unwrap_or_default();

        Ok(format!(
            "Event:       {name}\n\
             Start Time:  {}\n\
             End Time:    {end}\n\
             Location:    {location}\n\
             RSVP:        {}\n\
             Description: {}",
            display_time(start, "start_time")?,
            item.rsvp_status.as_deref().unwrap_or_default(),
            item.description.as_deref().unwrap_or_default(),
        ))
    }
}
