//! Session authentication state and the authenticate handshake.

use std::mem;

use tracing::{debug, info, warn};

use crate::console::Console;
use crate::error::AuthError;
use crate::source::{Connection, CredentialProvider, Identity};

/// Authentication state of one session.
#[derive(Debug)]
pub enum AuthState<C> {
    /// No connection yet, or it was closed.
    Unauthenticated,
    /// A live connection and the identity it belongs to.
    Authenticated {
        /// The live connection.
        connection: C,
        /// Who the connection is authenticated as.
        identity: Identity,
    },
}

impl<C> Default for AuthState<C> {
    fn default() -> Self {
        Self::Unauthenticated
    }
}

impl<C> AuthState<C> {
    /// The identity held, if authenticated.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Unauthenticated => None,
            Self::Authenticated { identity, .. } => Some(identity),
        }
    }

    /// The live connection, if authenticated.
    pub const fn connection_mut(&mut self) -> Option<&mut C> {
        match self {
            Self::Unauthenticated => None,
            Self::Authenticated { connection, .. } => Some(connection),
        }
    }

    /// Moves the state out, leaving `Unauthenticated` behind.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }
}

/// Whether an answer to the switch-accounts prompt declines the switch.
fn declines(answer: &str) -> bool {
    answer
        .split_whitespace()
        .next()
        .is_some_and(|word| word.eq_ignore_ascii_case("n"))
}

/// Runs the authenticate handshake for `service`.
///
/// With an identity already held, the user is asked whether to switch
/// accounts; declining keeps the connection and never calls `provider`.
/// Otherwise `provider` is asked for a fresh connection, which replaces the
/// current one only on success.
///
/// # Errors
///
/// Returns [`AuthError::Aborted`] if the user terminates at the prompt, or
/// whatever the provider reports.
pub fn handshake<P: CredentialProvider>(
    service: &str,
    state: &mut AuthState<P::Connection>,
    provider: &mut P,
    console: &mut Console,
) -> Result<(), AuthError> {
    if let Some(identity) = state.identity() {
        let prompt = format!(
            "You are currently authenticated as {identity}. Would you like to switch accounts? [y/n] "
        );
        let Some(answer) = console.read_reply(&prompt)? else {
            return Err(AuthError::Aborted);
        };
        if declines(&answer) {
            debug!(service, %identity, "keeping current account");
            return Ok(());
        }
    } else {
        info!(service, "no authentication is currently active");
    }

    let (connection, identity) = provider.acquire(console, state.identity())?;
    info!(service, %identity, "authenticated");

    let previous = mem::replace(
        state,
        AuthState::Authenticated {
            connection,
            identity,
        },
    );
    if let AuthState::Authenticated {
        mut connection,
        identity,
    } = previous
        && let Err(e) = connection.close()
    {
        warn!(service, %identity, "failed to close replaced connection: {e}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declines() {
        assert!(declines("n"));
        assert!(declines(" N "));
        assert!(declines("n please"));
        assert!(!declines("no"));
        assert!(!declines("y"));
        assert!(!declines("maybe"));
    }

    #[test]
    fn test_take_leaves_unauthenticated() {
        let mut state = AuthState::Authenticated {
            connection: 7u8,
            identity: Identity::new("alice@example.com"),
        };
        assert_eq!(state.identity().map(Identity::as_str), Some("alice@example.com"));

        let taken = state.take();
        assert!(matches!(taken, AuthState::Authenticated { connection: 7, .. }));
        assert!(state.identity().is_none());
        assert!(state.connection_mut().is_none());
    }
}
