//! Service adapters.
//!
//! Each adapter supplies a [`CredentialProvider`](crate::source::CredentialProvider),
//! the [`Connection`](crate::source::Connection) it hands out and a
//! [`Renderer`](crate::source::Renderer) for its records. Outward calls are
//! async and run to completion on a shared runtime, so the command loop
//! stays synchronous.

pub mod facebook;
pub mod gmail;
mod http;

use std::sync::Arc;

use tracing::{debug, warn};
use waddle_oauth::{AuthorizationCodeFlow, Token, random_state};

use crate::console::Console;
use crate::error::AuthError;

pub use facebook::{FacebookConnection, FacebookCredentials, FacebookRenderer};
pub use gmail::{GmailConnection, GmailCredentials, GmailRenderer};

/// Runtime shared by every adapter for its outward calls.
pub type SharedRuntime = Arc<tokio::runtime::Runtime>;

/// Appends one page of results to `merged`, capping it at `limit`.
///
/// Returns the cursor of the next page while more results are wanted.
pub(crate) fn merge_page<T>(
    merged: &mut Vec<T>,
    page: impl IntoIterator<Item = T>,
    next: Option<String>,
    limit: Option<usize>,
) -> Option<String> {
    merged.extend(page);
    if let Some(limit) = limit
        && merged.len() >= limit
    {
        merged.truncate(limit);
        return None;
    }
    next
}

/// Walks the user through the browser leg of an authorization code flow and
/// exchanges the code for a token.
///
/// # Errors
///
/// Returns [`AuthError::Aborted`] if the user terminates at the paste prompt,
/// or [`AuthError::OAuth`] if the redirect is unusable or the exchange fails.
pub(crate) fn authorize_in_browser(
    console: &mut Console,
    flow: &AuthorizationCodeFlow,
    runtime: &SharedRuntime,
    service: &str,
) -> Result<Token, AuthError> {
    let state = random_state();
    let url = flow.authorization_url(&state);

    console.println(format!("First, please go here and authorize: {url}"))?;
    if let Err(e) = opener::open(url.as_str()) {
        warn!(service, "could not open a browser: {e}");
    }

    let Some(redirect) = console.read_reply("Second, paste the full redirect URL here: ")? else {
        return Err(AuthError::Aborted);
    };
    let code = flow.code_from_redirect(&redirect, &state)?;
    debug!(service, "exchanging authorization code");

    Ok(runtime.block_on(flow.exchange_code(&code))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_page_follows_cursor_without_limit() {
        let mut merged = vec![1, 2];
        let next = merge_page(&mut merged, [3, 4], Some("p3".to_string()), None);
        assert_eq!(next.as_deref(), Some("p3"));
        assert_eq!(merged, [1, 2, 3, 4]);

        assert!(merge_page(&mut merged, [5], None, None).is_none());
        assert_eq!(merged, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_merge_page_caps_at_limit() {
        let mut merged = vec![1];
        let next = merge_page(&mut merged, [2, 3, 4], Some("p2".to_string()), Some(3));
        assert!(next.is_none());
        assert_eq!(merged, [1, 2, 3]);
    }

    #[test]
    fn test_merge_page_short_of_limit_keeps_going() {
        let mut merged = Vec::new();
        let next = merge_page(&mut merged, ["a"], Some("p2".to_string()), Some(3));
        assert_eq!(next.as_deref(), Some("p2"));
        assert_eq!(merged, ["a"]);
    }
}
