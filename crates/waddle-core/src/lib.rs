//! # waddle-core
//!
//! Command routing and service sessions for the `waddle` terminal client.
//!
//! This crate provides:
//! - A console abstraction with termination keywords ([`console`])
//! - A top-level [`Router`] that lists services and hands control to one
//! - Per-service sessions with `recent`, `list`, `read`, `back` and `help`
//!   ([`ServiceSession`])
//! - The authenticate handshake and account switching ([`auth`])
//! - Gmail and Facebook adapters ([`service`])
//! - Configuration and keyring token storage
//!
//! The `test-util` feature exposes a scripted console for driving sessions
//! from tests.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod action;
pub mod auth;
pub mod command;
pub mod config;
pub mod console;
pub mod controller;
pub mod credentials;
pub mod cursor;
mod error;
pub mod router;
pub mod service;
pub mod session;
pub mod source;

pub use command::CommandLine;
pub use config::{Config, ConfigError, FacebookConfig, GmailConfig};
pub use console::{Console, Prompted};
#[cfg(any(test, feature = "test-util"))]
pub use console::{ScriptedSource, Transcript};
pub use controller::{
    Authenticable, Closeable, Described, Dispatchable, Runnable, ServiceController,
};
pub use credentials::{CredentialError, CredentialResult, TokenStore};
pub use cursor::ResultCursor;
pub use error::{
    ActionError, AuthError, RenderError, RouterError, SessionError, ShutdownError, SourceError,
};
pub use router::Router;
pub use service::SharedRuntime;
pub use session::{ServiceProfile, ServiceSession};
pub use source::{Connection, CredentialProvider, Identity, Renderer};
