//! Bearer-authenticated JSON GETs against a REST base URL.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::trace;
use url::Url;
use waddle_oauth::Token;

use super::SharedRuntime;
use crate::error::SourceError;
use crate::source::truncate_chars;

/// Longest slice of an error body quoted back to the user.
const ERROR_BODY_CHARS: usize = 200;

pub(crate) struct ApiClient {
    http: Client,
    base: Url,
    token: Token,
    runtime: SharedRuntime,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// `base` must end in `/` so relative paths join below it.
    pub(crate) fn new(
        base: Url,
        token: Token,
        timeout: Duration,
        runtime: SharedRuntime,
    ) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Request(e.to_string()))?;
        Ok(Self {
            http,
            base,
            token,
            runtime,
        })
    }

    /// GETs `path` relative to the base URL.
    pub(crate) fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| SourceError::Request(format!("bad path `{path}`: {e}")))?;
        self.get_url(url, query)
    }

    /// GETs an absolute URL, such as a pagination cursor.
    pub(crate) fn get_url<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        trace!(%url, "GET");
        self.runtime.block_on(async {
            let response = self
                .http
                .get(url.clone())
                .bearer_auth(&self.token.access_token)
                .query(query)
                .send()
                .await
                .map_err(request_error)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(status_error(status, url.path(), &body));
            }

            response
                .json::<T>()
                .await
                .map_err(|e| SourceError::Decode(e.to_string()))
        })
    }
}

/// Classifies an unsuccessful response.
fn status_error(status: StatusCode, path: &str, body: &str) -> SourceError {
    let detail = || format!("{status}: {}", truncate_chars(body.trim(), ERROR_BODY_CHARS));
    match status {
        StatusCode::NOT_FOUND => SourceError::NotFound(path.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceError::Unauthorized(detail()),
        _ => SourceError::Request(detail()),
    }
}

fn request_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Request("request timed out".into())
    } else {
        SourceError::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_classification() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "/messages/1", ""),
            SourceError::NotFound(path) if path == "/messages/1"
        ));
        assert!(status_error(StatusCode::UNAUTHORIZED, "/profile", "").is_unauthorized());
        assert!(status_error(StatusCode::FORBIDDEN, "/profile", "").is_unauthorized());

        let err = status_error(StatusCode::SERVICE_UNAVAILABLE, "/profile", "  try later \n");
        assert!(!err.is_unauthorized());
        assert_eq!(
            err.to_string(),
            "Request failed: 503 Service Unavailable: try later"
        );
    }

    #[test]
    fn test_status_error_truncates_body() {
        let body = "x".repeat(500);
        let SourceError::Request(message) =
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "/", &body)
        else {
            panic!("expected a request error");
        };
        assert!(message.ends_with(&"x".repeat(ERROR_BODY_CHARS)));
        assert!(!message.ends_with(&"x".repeat(ERROR_BODY_CHARS + 1)));
    }
}
