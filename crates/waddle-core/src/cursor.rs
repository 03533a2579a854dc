//! The result cursor: items from the most recent listing.

use crate::error::ActionError;

/// Ordered items produced by the most recent successful listing.
#[derive(Debug, Clone)]
pub struct ResultCursor<T> {
    items: Vec<T>,
}

impl<T> Default for ResultCursor<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> ResultCursor<T> {
    /// Creates an empty cursor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole cursor with a new listing.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Items in listing order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been listed, or the last listing was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks up the item named by a user-supplied index argument.
    ///
    /// # Errors
    ///
    /// - [`ActionError::InvalidArgument`] if `arg` is not an integer
    /// - [`ActionError::IndexOutOfRange`] if it is negative or not below the
    ///   current length
    pub fn resolve(&self, arg: &str) -> Result<&T, ActionError> {
        let index = parse_index(arg)
            .ok_or_else(|| ActionError::InvalidArgument(format!("The value {arg} is not an integer.")))?;

        usize::try_from(index)
            .ok()
            .and_then(|i| self.items.get(i))
            .ok_or(ActionError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
    }
}

/// Parses a signed integer, saturating values too large for `i64`.
fn parse_index(arg: &str) -> Option<i64> {
    if let Ok(index) = arg.parse() {
        return Some(index);
    }
    let digits = arg.strip_prefix(['+', '-']).unwrap_or(arg);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if arg.starts_with('-') { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cursor() -> ResultCursor<&'static str> {
        let mut cursor = ResultCursor::new();
        cursor.replace(vec!["alice", "bob"]);
        cursor
    }

    #[test]
    fn test_resolve_in_range() {
        assert_eq!(*cursor().resolve("1").unwrap(), "bob");
    }

    #[test]
    fn test_resolve_not_an_integer() {
        assert!(matches!(
            cursor().resolve("abc"),
            Err(ActionError::InvalidArgument(_))
        ));
        assert!(matches!(
            cursor().resolve("1.5"),
            Err(ActionError::InvalidArgument(_))
        ));
        for arg in ["-", "+", "--5", "1e3"] {
            assert!(matches!(
                cursor().resolve(arg),
                Err(ActionError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_resolve_out_of_range() {
        assert!(matches!(
            cursor().resolve("2"),
            Err(ActionError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(
            cursor().resolve("-1"),
            Err(ActionError::IndexOutOfRange { index: -1, len: 2 })
        ));
        assert!(matches!(
            cursor().resolve("99999999999999999999"),
            Err(ActionError::IndexOutOfRange { index: i64::MAX, len: 2 })
        ));
        assert!(matches!(
            cursor().resolve("-99999999999999999999"),
            Err(ActionError::IndexOutOfRange { index: i64::MIN, len: 2 })
        ));
    }

    #[test]
    fn test_replace_discards_previous() {
        let mut cursor = cursor();
        cursor.replace(vec!["carol"]);
        assert_eq!(cursor.items(), ["carol"]);
        assert!(cursor.resolve("1").is_err());
    }

    proptest! {
        #[test]
        fn prop_resolve_checks_current_length(
            first in prop::collection::vec(any::<u8>(), 0..20),
            second in prop::collection::vec(any::<u8>(), 0..20),
            index in 0usize..25,
        ) {
            let mut cursor = ResultCursor::new();
            cursor.replace(first);
            cursor.replace(second.clone());
            let result = cursor.resolve(&index.to_string());
            if index < second.len() {
                prop_assert_eq!(*result.unwrap(), second[index]);
            } else {
                let out_of_range = matches!(result, Err(ActionError::IndexOutOfRange { .. }));
                prop_assert!(out_of_range);
            }
        }
    }
}
