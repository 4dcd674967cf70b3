//! Ordered action names of one flow.

/// The actions of a flow in registration order.
///
/// Append-only while the flow is being built and read-only afterwards.
/// Uniqueness is enforced by the registrar, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSequence {
    names: Vec<String>,
}

impl ActionSequence {
    /// Creates an empty sequence.
    #[must_use]
    pub const fn new() -> Self {
        Self { names: Vec::new() }
    }

    /// Appends an action name.
    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    /// Returns `true` if `name` is part of the sequence.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Returns the action following `name`.
    ///
    /// `None` if `name` is the last action or not in the sequence at all.
    #[must_use]
    pub fn next_after(&self, name: &str) -> Option<&str> {
        let index = self.names.iter().position(|n| n == name)?;
        self.names.get(index + 1).map(String::as_str)
    }

    /// Returns the first action, the entry point of a flow run.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// Returns the most recently registered action.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    /// Returns the names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no action has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> ActionSequence {
        let mut seq = ActionSequence::new();
        seq.push("a");
        seq.push("b");
        seq.push("c");
        seq
    }

    #[test]
    fn next_after_walks_in_order() {
        let seq = abc();
        assert_eq!(seq.next_after("a"), Some("b"));
        assert_eq!(seq.next_after("b"), Some("c"));
        assert_eq!(seq.next_after("c"), None);
    }

    #[test]
    fn unknown_name_has_no_successor() {
        assert_eq!(abc().next_after("x"), None);
        assert_eq!(ActionSequence::new().next_after("a"), None);
    }

    #[test]
    fn ends() {
        let seq = abc();
        assert_eq!(seq.first(), Some("a"));
        assert_eq!(seq.last(), Some("c"));
        assert_eq!(seq.len(), 3);
        assert!(seq.contains("b"));
        assert!(!seq.contains("d"));

        let empty = ActionSequence::default();
        assert!(empty.is_empty());
        assert_eq!(empty.first(), None);
        assert_eq!(empty.last(), None);
    }
}
