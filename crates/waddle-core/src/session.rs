//! Per-service session: authentication, result cursor and actions.

use tracing::{debug, warn};

use crate::action::{SESSION_ACTIONS, SessionAction};
use crate::auth::{AuthState, handshake};
use crate::command::CommandLine;
use crate::console::{Console, Prompted};
use crate::controller::{Authenticable, Closeable, Described, Dispatchable, Runnable};
use crate::cursor::ResultCursor;
use crate::error::{ActionError, AuthError, RenderError, SessionError, ShutdownError};
use crate::source::{Connection, CredentialProvider, Identity, Renderer};

type SummaryOf<P> = <<P as CredentialProvider>::Connection as Connection>::Summary;
type DetailOf<P> = <<P as CredentialProvider>::Connection as Connection>::Detail;

/// What a session shows the user and the defaults its actions use.
#[derive(Debug, Clone)]
pub struct ServiceProfile {
    /// Display name and routing key, e.g. `Gmail`.
    pub name: String,
    /// One-line menu description.
    pub description: String,
    /// Plural noun for listed items, e.g. `emails`.
    pub noun: String,
    /// Query used by `recent`.
    pub recent_query: String,
    /// Item count used by `recent` without an argument.
    pub recent_count: usize,
}

/// A stateful session with one service.
pub struct ServiceSession<P, R>
where
    P: CredentialProvider,
{
    profile: ServiceProfile,
    provider: P,
    renderer: R,
    auth: AuthState<P::Connection>,
    cursor: ResultCursor<SummaryOf<P>>,
}

impl<P, R> std::fmt::Debug for ServiceSession<P, R>
where
    P: CredentialProvider,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSession")
            .field("profile", &self.profile)
            .field("identity", &self.auth.identity())
            .field("listed", &self.cursor.len())
            .finish_non_exhaustive()
    }
}

impl<P, R> ServiceSession<P, R>
where
    P: CredentialProvider,
    R: Renderer<Summary = SummaryOf<P>, Detail = DetailOf<P>>,
{
    /// Creates an unauthenticated session.
    pub fn new(profile: ServiceProfile, provider: P, renderer: R) -> Self {
        Self {
            profile,
            provider,
            renderer,
            auth: AuthState::Unauthenticated,
            cursor: ResultCursor::new(),
        }
    }

    /// The session's profile.
    #[must_use]
    pub const fn profile(&self) -> &ServiceProfile {
        &self.profile
    }

    /// The current result cursor.
    #[must_use]
    pub const fn cursor(&self) -> &ResultCursor<SummaryOf<P>> {
        &self.cursor
    }

    /// `recent [count]`
    ///
    /// # Errors
    ///
    /// See [`Self::list`].
    pub fn recent(&mut self, args: &[String], console: &mut Console) -> Result<(), ActionError> {
        let count = match args {
            [] => self.profile.recent_count,
            [count] => parse_count(count)?,
            _ => {
                return Err(ActionError::InvalidArgument(
                    "`recent` takes at most one argument: how many to list.".into(),
                ));
            }
        };
        let query = self.profile.recent_query.clone();
        self.show_listing(&query, Some(count), console)
    }

    /// `list <query> [count]`
    ///
    /// The cursor is replaced only once every preview rendered.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvalidArgument`] for a missing query or a bad
    /// count, [`ActionError::MalformedRecord`] if any preview fails, or
    /// [`ActionError::Upstream`] if the listing call fails.
    pub fn list(&mut self, args: &[String], console: &mut Console) -> Result<(), ActionError> {
        let (query, limit) = match args {
            [] => {
                return Err(ActionError::InvalidArgument(format!(
                    "Please provide a query with this command. I.e. `list {}`",
                    self.profile.recent_query
                )));
            }
            [query] => (query, None),
            [query, count] => (query, Some(parse_count(count)?)),
            _ => {
                return Err(ActionError::InvalidArgument(
                    "`list` takes a query and an optional count. Queries cannot contain spaces."
                        .into(),
                ));
            }
        };
        self.show_listing(query, limit, console)
    }

    /// `read <index>`
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvalidArgument`] unless given exactly one
    /// integer, [`ActionError::IndexOutOfRange`] if it is outside the cursor.
    pub fn read(&mut self, args: &[String], console: &mut Console) -> Result<(), ActionError> {
        let [arg] = args else {
            return Err(ActionError::InvalidArgument(
                "Please provide the index of the item to read.".into(),
            ));
        };

        let item = self.cursor.resolve(arg)?;
        let connection = self
            .auth
            .connection_mut()
            .ok_or(ActionError::NotAuthenticated)?;
        let detail = connection.fetch_detail(item)?;
        let text = self.renderer.detail(&detail)?;
        console.println(text)?;
        Ok(())
    }

    /// `back`
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvalidArgument`] if given any argument.
    pub fn back(&mut self, args: &[String], console: &mut Console) -> Result<(), ActionError> {
        if !args.is_empty() {
            return Err(ActionError::InvalidArgument(
                "`back` takes no arguments.".into(),
            ));
        }
        if self.cursor.is_empty() {
            console.println(format!(
                "No {} listed. Try `recent` or `list <query>`.",
                self.profile.noun
            ))?;
            return Ok(());
        }
        let text = render_listing(&self.renderer, self.cursor.items())?;
        console.println(text)?;
        Ok(())
    }

    fn show_listing(
        &mut self,
        query: &str,
        limit: Option<usize>,
        console: &mut Console,
    ) -> Result<(), ActionError> {
        let connection = self
            .auth
            .connection_mut()
            .ok_or(ActionError::NotAuthenticated)?;
        let items = connection.list(query, limit)?;
        debug!(service = %self.profile.name, query, count = items.len(), "listed");

        if items.is_empty() {
            self.cursor.replace(items);
            console.println(format!("No {} match `{query}`.", self.profile.noun))?;
            return Ok(());
        }

        let text = render_listing(&self.renderer, &items)?;
        self.cursor.replace(items);
        console.println(text)?;
        Ok(())
    }

    fn help_text(&self) -> String {
        let ServiceProfile {
            noun,
            recent_query,
            recent_count,
            ..
        } = &self.profile;
        format!(
            "Commands:
`recent [int]`: Lists the last [int] {noun} matching `{recent_query}`. Default {recent_count}.
`list [query] [int]`: Lists the first [int] {noun} that match the query [query].
        If no int is provided, all {noun} matching the query are returned.
`read [int]`: Shows the item at index [int] of the previous list. [int] must be
        less than the number of {noun} listed.
`back`: Prints the previous list again.
`quit` or `exit`: Returns to the service menu."
        )
    }
}

fn parse_count(arg: &str) -> Result<usize, ActionError> {
    match arg.parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ActionError::InvalidArgument(format!(
            "The value {arg} is not a positive integer."
        ))),
    }
}

fn render_listing<R: Renderer>(renderer: &R, items: &[R::Summary]) -> Result<String, RenderError> {
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.extend(renderer.heading());
    for (index, item) in items.iter().enumerate() {
        lines.push(renderer.summary(index, items.len(), item)?);
    }
    Ok(lines.join("\n"))
}

impl<P, R> Dispatchable for ServiceSession<P, R>
where
    P: CredentialProvider,
    R: Renderer<Summary = SummaryOf<P>, Detail = DetailOf<P>>,
{
    fn dispatch(&mut self, line: &CommandLine, console: &mut Console) -> Result<(), ActionError> {
        let args = line.args();
        match SESSION_ACTIONS.resolve(line.word()) {
            SessionAction::Recent => self.recent(args, console),
            SessionAction::List => self.list(args, console),
            SessionAction::Read => self.read(args, console),
            SessionAction::Back => self.back(args, console),
            SessionAction::Help => {
                if line.word() != "help" {
                    console.println("Not a valid command.")?;
                }
                self.help(console)
            }
        }
    }

    fn help(&self, console: &mut Console) -> Result<(), ActionError> {
        console.println(self.help_text())?;
        Ok(())
    }
}

impl<P, R> Authenticable for ServiceSession<P, R>
where
    P: CredentialProvider,
    R: Renderer<Summary = SummaryOf<P>, Detail = DetailOf<P>>,
{
    fn identity(&self) -> Option<&Identity> {
        self.auth.identity()
    }

    fn authenticate(&mut self, console: &mut Console) -> Result<(), AuthError> {
        handshake(&self.profile.name, &mut self.auth, &mut self.provider, console)
    }
}

impl<P, R> Runnable for ServiceSession<P, R>
where
    P: CredentialProvider,
    R: Renderer<Summary = SummaryOf<P>, Detail = DetailOf<P>>,
{
    type Error = SessionError;

    fn run(&mut self, console: &mut Console) -> Result<(), SessionError> {
        if let Err(e) = self.authenticate(console) {
            warn!(service = %self.profile.name, "authentication failed: {e}");
            console.println(format!(
                "Could not authenticate with {}: {e}",
                self.profile.name
            ))?;
            return Err(e.into());
        }

        let prompt = format!("{}>> $: ", self.profile.name);
        loop {
            let line = match console.read_command(&prompt)? {
                Prompted::Command(line) => line,
                Prompted::Terminate => {
                    debug!(service = %self.profile.name, "user terminated the session");
                    return Ok(());
                }
            };

            match self.dispatch(&line, console) {
                Ok(()) => {}
                Err(ActionError::Io(e)) => return Err(e.into()),
                Err(e @ (ActionError::Upstream(_) | ActionError::MalformedRecord(_))) => {
                    warn!(service = %self.profile.name, command = line.word(), "{e}");
                    console.println(e)?;
                }
                Err(e) => {
                    debug!(service = %self.profile.name, command = line.word(), "{e}");
                    console.println(e)?;
                }
            }
        }
    }
}

impl<P, R> Described for ServiceSession<P, R>
where
    P: CredentialProvider,
{
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn description(&self) -> &str {
        &self.profile.description
    }
}

impl<P, R> Closeable for ServiceSession<P, R>
where
    P: CredentialProvider,
{
    fn close(&mut self) -> Result<(), ShutdownError> {
        let AuthState::Authenticated {
            mut connection,
            identity,
        } = self.auth.take()
        else {
            return Ok(());
        };
        debug!(service = %self.profile.name, %identity, "closing connection");
        connection.close().map_err(|e| ShutdownError {
            service: self.profile.name.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("3").ok(), Some(3));
        assert!(matches!(parse_count("0"), Err(ActionError::InvalidArgument(_))));
        assert!(matches!(parse_count("-2"), Err(ActionError::InvalidArgument(_))));
        assert!(matches!(parse_count("ten"), Err(ActionError::InvalidArgument(_))));
    }
}
