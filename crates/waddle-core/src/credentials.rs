//! Tokens kept in the platform keyring between runs.
//!
//! Each service gets one entry holding its [`Token`] as JSON. The keyring
//! backend is whatever the platform offers: Secret Service on Linux, the
//! Keychain on macOS and Credential Manager on Windows.

use keyring::Entry;
use tracing::debug;
use waddle_oauth::Token;

const KEYRING_APP: &str = "waddle";

/// Failure talking to the keyring or reading back what it holds.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The keyring refused the operation.
    #[error("keyring unavailable: {0}")]
    Keyring(#[from] keyring::Error),

    /// The entry exists but does not hold a token.
    #[error("stored token is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Shorthand for keyring results.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;

/// The keyring slot of one service.
#[derive(Debug, Clone, Copy)]
pub struct TokenStore {
    service: &'static str,
}

impl TokenStore {
    /// The slot for `service`, e.g. `"gmail"`.
    #[must_use]
    pub const fn new(service: &'static str) -> Self {
        Self { service }
    }

    fn entry(self) -> CredentialResult<Entry> {
        let user = format!("{KEYRING_APP}_oauth_token_{}", self.service);
        Entry::new(KEYRING_APP, &user).map_err(CredentialError::from)
    }

    /// Reads the token back. An empty slot is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyring fails or the entry does not parse.
    pub fn load(self) -> CredentialResult<Option<Token>> {
        let json = match self.entry()?.get_password() {
            Err(keyring::Error::NoEntry) => {
                debug!(service = self.service, "no token in keyring");
                return Ok(None);
            }
            other => other?,
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Overwrites the slot with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyring fails.
    pub fn save(self, token: &Token) -> CredentialResult<()> {
        let json = serde_json::to_string(token)?;
        self.entry()?.set_password(&json)?;
        debug!(service = self.service, "token saved to keyring");
        Ok(())
    }

    /// Empties the slot. Emptying an empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyring fails.
    pub fn forget(self) -> CredentialResult<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                debug!(service = self.service, "token removed from keyring");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Run with `cargo test -- --ignored` on a machine with a keyring.

    #[test]
    #[ignore = "needs a system keyring"]
    fn test_save_load_forget() {
        let store = TokenStore::new("waddle-test-slot");
        let token = Token::new("access", "Bearer").with_refresh_token("refresh");

        store.save(&token).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));

        store.forget().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    #[ignore = "needs a system keyring"]
    fn test_forget_empty_slot() {
        TokenStore::new("waddle-test-empty").forget().unwrap();
    }
}
