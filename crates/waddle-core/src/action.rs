//! Static command-word tables.

/// Mapping from exact command word to an action, with a default for
/// unrecognized words. Built at compile time and never mutated.
#[derive(Debug)]
pub struct ActionTable<A: Copy + 'static> {
    entries: &'static [(&'static str, A)],
    default: A,
}

impl<A: Copy + 'static> ActionTable<A> {
    /// Creates a table from `(word, action)` pairs and a default action.
    #[must_use]
    pub const fn new(entries: &'static [(&'static str, A)], default: A) -> Self {
        Self { entries, default }
    }

    /// Resolves `word` with an exact, case-sensitive match.
    #[must_use]
    pub fn resolve(&self, word: &str) -> A {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == word)
            .map_or(self.default, |(_, action)| *action)
    }

    /// Words the table recognizes, in table order.
    pub fn words(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(word, _)| *word)
    }
}

/// Actions a service session understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// List the most recent items using the service defaults.
    Recent,
    /// List items matching a query.
    List,
    /// Show one item from the current result cursor.
    Read,
    /// Show the current result cursor again.
    Back,
    /// Print the command reference.
    Help,
}

/// Session-scope table; unknown words show help.
pub const SESSION_ACTIONS: ActionTable<SessionAction> = ActionTable::new(
    &[
        ("recent", SessionAction::Recent),
        ("list", SessionAction::List),
        ("read", SessionAction::Read),
        ("back", SessionAction::Back),
        ("help", SessionAction::Help),
    ],
    SessionAction::Help,
);

/// Actions the command router understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterAction {
    /// Print the service menu.
    Menu,
    /// Treat the word as a service name.
    Select,
}

/// Router-scope table; every other word is a service name.
pub const ROUTER_ACTIONS: ActionTable<RouterAction> = ActionTable::new(
    &[
        ("help", RouterAction::Menu),
        ("menu", RouterAction::Menu),
        ("?", RouterAction::Menu),
    ],
    RouterAction::Select,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_words() {
        assert_eq!(SESSION_ACTIONS.resolve("recent"), SessionAction::Recent);
        assert_eq!(SESSION_ACTIONS.resolve("read"), SessionAction::Read);
        assert_eq!(SESSION_ACTIONS.resolve("back"), SessionAction::Back);
        assert_eq!(
            SESSION_ACTIONS.words().collect::<Vec<_>>(),
            ["recent", "list", "read", "back", "help"]
        );
    }

    #[test]
    fn test_unknown_word_uses_default() {
        assert_eq!(SESSION_ACTIONS.resolve("delete"), SessionAction::Help);
        assert_eq!(SESSION_ACTIONS.resolve("RECENT"), SessionAction::Help);
        assert_eq!(ROUTER_ACTIONS.resolve("Gmail"), RouterAction::Select);
        assert_eq!(ROUTER_ACTIONS.resolve("?"), RouterAction::Menu);
    }
}
