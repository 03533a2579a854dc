//! # waddle-oauth
//!
//! `OAuth2` authorization code grant for a terminal user: the consent URL is
//! opened in a browser and the user pastes the redirect URL back.
//!
//! Covers Google (read-only Gmail) and Facebook (profile and events), PKCE,
//! refresh, and token endpoints that omit `token_type` or nest their errors.
//!
//! ```ignore
//! use waddle_oauth::{AuthorizationCodeFlow, OAuthClient, Provider, random_state};
//!
//! let client = OAuthClient::new("client-id", Provider::google()?)
//!     .with_redirect_uri("http://localhost");
//! let flow = AuthorizationCodeFlow::new(client).with_pkce();
//!
//! let state = random_state();
//! println!("Visit: {}", flow.authorization_url(&state));
//!
//! let code = flow.code_from_redirect(&pasted, &state)?;
//! let token = flow.exchange_code(&code).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod flow;
pub mod provider;
pub mod token;

pub use error::{Error, Result};
pub use flow::{AuthorizationCodeFlow, OAuthClient, PkceChallenge, random_state};
pub use provider::Provider;
pub use token::Token;
