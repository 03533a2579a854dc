//! Interfaces to the outside world: credentials, listings, details, rendering.
//!
//! A service session only talks to its service through these traits, so the
//! dispatch core can be driven by in-memory fakes as easily as by Gmail.

use std::fmt;

use crate::console::Console;
use crate::error::{AuthError, RenderError, SourceError};

/// Human-readable identity of an authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    /// Wraps a display name or email address.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identity as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A live, authenticated handle to one service.
pub trait Connection {
    /// Lightweight item produced by a listing.
    type Summary;
    /// Full item produced by a detail fetch.
    type Detail;

    /// Lists items matching `query`, in upstream order, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the query or the call fails.
    fn list(&mut self, query: &str, limit: Option<usize>) -> Result<Vec<Self::Summary>, SourceError>;

    /// Fetches the full item behind a summary.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] if the item is gone, or another
    /// error if the call fails.
    fn fetch_detail(&mut self, item: &Self::Summary) -> Result<Self::Detail, SourceError>;

    /// Releases the connection. Called once, at shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the service could not be closed cleanly.
    fn close(&mut self) -> Result<(), SourceError>;
}

/// Produces authenticated connections.
pub trait CredentialProvider {
    /// Connection type handed out on success.
    type Connection: Connection;

    /// Acquires a fresh connection and the identity it is authenticated as.
    ///
    /// `current` is the identity the session already holds when the user
    /// asked to switch accounts; providers must not silently reuse cached
    /// credentials in that case. The console may be used for interactive
    /// steps.
    ///
    /// # Errors
    ///
    /// Returns an error for missing configuration, remote rejection, or a
    /// termination keyword typed mid-handshake.
    fn acquire(
        &mut self,
        console: &mut Console,
        current: Option<&Identity>,
    ) -> Result<(Self::Connection, Identity), AuthError>;
}

/// Turns summaries and details into text.
pub trait Renderer {
    /// Summary type rendered as one preview line.
    type Summary;
    /// Detail type rendered as a full view.
    type Detail;

    /// Optional line printed above a listing.
    fn heading(&self) -> Option<String> {
        None
    }

    /// Renders the preview of the item at `index` in a listing of `total`.
    ///
    /// # Errors
    ///
    /// Returns an error if the item lacks a field the preview needs.
    fn summary(&self, index: usize, total: usize, item: &Self::Summary) -> Result<String, RenderError>;

    /// Renders the full view of one item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item lacks a field the view needs.
    fn detail(&self, item: &Self::Detail) -> Result<String, RenderError>;
}

/// Width, in digits, of the largest index in a listing of `total` items.
#[must_use]
pub fn index_width(total: usize) -> usize {
    total.saturating_sub(1).to_string().len()
}

/// Truncates `text` to at most `max` characters.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> &str {
    text.char_indices().nth(max).map_or(text, |(end, _)| &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_width() {
        assert_eq!(index_width(0), 1);
        assert_eq!(index_width(10), 1);
        assert_eq!(index_width(11), 2);
        assert_eq!(index_width(101), 3);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 2), "");
    }
}
