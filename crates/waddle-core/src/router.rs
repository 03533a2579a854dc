//! Top-level command router.

use std::io;

use tracing::{debug, error, info, warn};

use crate::action::{ROUTER_ACTIONS, RouterAction};
use crate::console::{Console, Prompted};
use crate::controller::{Closeable, Described, Runnable, ServiceController};
use crate::error::{RouterError, SessionError};

/// Prompt shown at the top level.
pub const TOP_LEVEL_PROMPT: &str = ">> $: ";

/// Owns every service session and the termination/shutdown protocol.
pub struct Router {
    services: Vec<Box<dyn ServiceController>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.services.iter().map(|s| s.name()))
            .finish()
    }
}

impl Router {
    /// Builds the service registry, in menu order.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateService`] if two services share a name.
    pub fn new(services: Vec<Box<dyn ServiceController>>) -> Result<Self, RouterError> {
        for (i, service) in services.iter().enumerate() {
            if services[..i].iter().any(|s| s.name() == service.name()) {
                return Err(RouterError::DuplicateService(service.name().to_string()));
            }
        }
        Ok(Self { services })
    }

    /// Display names, in menu order.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(|s| s.name())
    }

    /// Prints the service menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the console cannot be written.
    pub fn menu(&self, console: &mut Console) -> io::Result<()> {
        console.println("Please select a service to use:")?;
        for service in &self.services {
            console.println(format!(
                "Name: {}. Description: {}",
                service.name(),
                service.description()
            ))?;
        }
        Ok(())
    }

    /// Closes every service, even after failures.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Shutdown`] listing every service that failed.
    pub fn shutdown(&mut self) -> Result<(), RouterError> {
        let mut failed = Vec::new();
        for service in &mut self.services {
            match service.close() {
                Ok(()) => debug!(service = service.name(), "closed"),
                Err(e) => {
                    error!("{e}");
                    failed.push(e);
                }
            }
        }

        if failed.is_empty() {
            info!("all services shut down");
            Ok(())
        } else {
            Err(RouterError::Shutdown { failed })
        }
    }

    fn interact(&mut self, console: &mut Console) -> io::Result<()> {
        loop {
            let line = match console.read_command(TOP_LEVEL_PROMPT)? {
                Prompted::Command(line) => line,
                Prompted::Terminate => {
                    debug!("user terminated the router");
                    return Ok(());
                }
            };

            if line.len() > 1 {
                self.menu(console)?;
                continue;
            }

            match ROUTER_ACTIONS.resolve(line.word()) {
                RouterAction::Menu => self.menu(console)?,
                RouterAction::Select => self.select(line.word(), console)?,
            }
        }
    }

    fn select(&mut self, name: &str, console: &mut Console) -> io::Result<()> {
        let Some(service) = self.services.iter_mut().find(|s| s.name() == name) else {
            console.println(format!("{name} is not a valid service."))?;
            return self.menu(console);
        };

        match service.run(console) {
            Ok(()) => Ok(()),
            Err(SessionError::Io(e)) => Err(e),
            Err(e) => {
                warn!(service = name, "service had a problem running: {e}");
                Ok(())
            }
        }
    }
}

impl Runnable for Router {
    type Error = RouterError;

    /// Runs the top-level loop, then shuts every service down.
    ///
    /// Shutdown runs even when the loop ends on a console failure.
    fn run(&mut self, console: &mut Console) -> Result<(), RouterError> {
        let outcome = self.interact(console);
        let shutdown = self.shutdown();
        outcome?;
        shutdown
    }
}
