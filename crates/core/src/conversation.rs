//! Conversation-related types.

use std::slice;

use movli_model::Message;

/// An ordered record of one identity's conversation.
///
/// Entries keep the order they were inserted in; nothing is ever
/// reordered or removed individually. The whole record can only be
/// replaced (history hydration) or cleared (identity change).
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Conversation {
    items: Vec<Message>,
}

impl Conversation {
    /// Creates an empty conversation.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every entry with `messages`, keeping their order.
    #[inline]
    pub fn replace_all<I: IntoIterator<Item = Message>>(
        &mut self,
        messages: I,
    ) {
        self.items.clear();
        self.items.extend(messages);
    }

    /// Adds a message to the end.
    #[inline]
    pub fn append(&mut self, message: Message) {
        self.items.push(message);
    }

    /// Removes every entry.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns an owned copy of the current entries.
    ///
    /// Later changes to the conversation are not reflected in it.
    #[inline]
    pub fn snapshot(&self) -> Vec<Message> {
        self.items.clone()
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates the entries in order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Message> {
        self.items.iter()
    }
}
