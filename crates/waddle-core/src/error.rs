//! Error types for the core library.
//!
//! Each type belongs to the boundary that handles it: [`ActionError`] stops at
//! the action boundary, [`AuthError`] at the session boundary,
//! [`ShutdownError`] is collected by the router. User-requested termination is
//! not an error at all; see [`crate::console::Prompted`].

use std::io;

use thiserror::Error;

/// Failure of an outward call made by a service connection.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The requested item does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The service refused the credentials (401 or 403).
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// The query is not one the service understands.
    #[error("{0}")]
    InvalidQuery(String),

    /// The request failed or the service answered with an error status.
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with a body we could not decode.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl SourceError {
    /// Whether the service refused the credentials, as opposed to failing to
    /// answer.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// An upstream record is missing a field the renderer needs.
#[derive(Debug, Error)]
#[error("{record} record has no usable `{field}`")]
pub struct RenderError {
    /// Kind of record, e.g. `message`.
    pub record: &'static str,
    /// Name of the missing or unusable field.
    pub field: String,
}

impl RenderError {
    /// Creates a render error for `field` of a `record`.
    #[must_use]
    pub fn missing(record: &'static str, field: impl Into<String>) -> Self {
        Self {
            record,
            field: field.into(),
        }
    }
}

/// Errors reported by a single session action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Missing, extra or unparsable argument.
    #[error("{0}")]
    InvalidArgument(String),

    /// Index outside the current result cursor.
    #[error("Index greater than number of items. {index}>={len}")]
    IndexOutOfRange {
        /// Index the user asked for.
        index: i64,
        /// Length of the cursor at the time of the request.
        len: usize,
    },

    /// A listed or fetched record could not be rendered.
    #[error("Malformed upstream record: {0}")]
    MalformedRecord(#[from] RenderError),

    /// An outward call failed.
    #[error("{0}")]
    Upstream(SourceError),

    /// The session has no authenticated connection.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Console I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<SourceError> for ActionError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidQuery(message) => Self::InvalidArgument(message),
            other => Self::Upstream(other),
        }
    }
}

/// Uniform authentication failure raised by the handshake.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Required client credentials are not configured.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// The authorization server refused or the exchange failed.
    #[error("Authorization failed: {0}")]
    OAuth(#[from] waddle_oauth::Error),

    /// The service rejected the freshly obtained credentials.
    #[error("Rejected by service: {0}")]
    Rejected(String),

    /// The user typed a termination keyword mid-handshake.
    #[error("User terminated the interaction")]
    Aborted,

    /// Console I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Why a session's `run` returned without a clean termination.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The handshake failed; the command loop never started.
    #[error("Authentication failed: {0}")]
    Authentication(#[from] AuthError),

    /// Console I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A session's disposer failed.
#[derive(Debug, Error)]
#[error("{service} failed to close: {reason}")]
pub struct ShutdownError {
    /// Display name of the session.
    pub service: String,
    /// Reason reported by the disposer.
    pub reason: String,
}

/// Errors reported by the command router.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Two sessions share a display name.
    #[error("Service `{0}` is registered twice")]
    DuplicateService(String),

    /// At least one session failed to close. Every session was still closed.
    #[error("{} service(s) failed to shut down", failed.len())]
    Shutdown {
        /// One entry per failing session, in registry order.
        failed: Vec<ShutdownError>,
    },

    /// Console I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_query_reported_as_invalid_argument() {
        let err = ActionError::from(SourceError::InvalidQuery("bad type".into()));
        assert!(matches!(err, ActionError::InvalidArgument(m) if m == "bad type"));

        let err = ActionError::from(SourceError::NotFound("m1".into()));
        assert!(matches!(err, ActionError::Upstream(SourceError::NotFound(_))));
    }

    #[test]
    fn test_only_refused_credentials_are_unauthorized() {
        assert!(SourceError::Unauthorized("401 Unauthorized".into()).is_unauthorized());
        assert!(!SourceError::Request("request timed out".into()).is_unauthorized());
        assert!(!SourceError::Request("503 Service Unavailable".into()).is_unauthorized());
        assert!(!SourceError::Decode("eof".into()).is_unauthorized());
    }

    #[test]
    fn test_messages() {
        let err = ActionError::IndexOutOfRange { index: 5, len: 2 };
        assert_eq!(err.to_string(), "Index greater than number of items. 5>=2");

        let err = ActionError::from(RenderError::missing("message", "From"));
        assert_eq!(
            err.to_string(),
            "Malformed upstream record: message record has no usable `From`"
        );

        let err = RouterError::Shutdown {
            failed: vec![ShutdownError {
                service: "B".into(),
                reason: "boom".into(),
            }],
        };
        assert_eq!(err.to_string(), "1 service(s) failed to shut down");
    }
}
