//! Capability traits implemented by the router and by service sessions.

use crate::command::CommandLine;
use crate::console::Console;
use crate::error::{ActionError, AuthError, SessionError, ShutdownError};
use crate::source::Identity;

/// Something that drives an interactive loop on the console.
pub trait Runnable {
    /// Error returned when the loop ends abnormally.
    type Error;

    /// Runs until the user terminates the loop.
    ///
    /// # Errors
    ///
    /// Returns an error when the loop could not run to a clean termination.
    fn run(&mut self, console: &mut Console) -> Result<(), Self::Error>;
}

/// Something that answers command lines.
pub trait Dispatchable {
    /// Routes one command line to its action.
    ///
    /// # Errors
    ///
    /// Returns the action's error; the caller decides whether to continue.
    fn dispatch(&mut self, line: &CommandLine, console: &mut Console) -> Result<(), ActionError>;

    /// Prints the command reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the console cannot be written.
    fn help(&self, console: &mut Console) -> Result<(), ActionError>;
}

/// Something that holds an authenticated identity.
pub trait Authenticable {
    /// The identity currently held, if any.
    fn identity(&self) -> Option<&Identity>;

    /// Establishes or reconfirms the identity.
    ///
    /// # Errors
    ///
    /// Returns the uniform authentication failure.
    fn authenticate(&mut self, console: &mut Console) -> Result<(), AuthError>;
}

/// Something with a name and a description shown in menus.
pub trait Described {
    /// Display name, also the routing key.
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str;
}

/// Something owning resources released at shutdown.
pub trait Closeable {
    /// Releases resources. Must tolerate being called on an unused service.
    ///
    /// # Errors
    ///
    /// Returns an error if the resources could not be released cleanly.
    fn close(&mut self) -> Result<(), ShutdownError>;
}

/// Everything the router needs from a registered service.
pub trait ServiceController: Described + Runnable<Error = SessionError> + Closeable {}

impl<T> ServiceController for T where T: Described + Runnable<Error = SessionError> + Closeable {}
