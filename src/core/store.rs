//! In-memory chat store
//!
//! Holds every chat session of the running process, keyed by title, together
//! with the title of the active chat. Nothing here outlives the process.

use crate::conversation::Message;

/// Title of the chat created whenever the store would otherwise be empty
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Number of turns shown in the history preview
pub const PREVIEW_LEN: usize = 10;

/// A titled, append-only sequence of turns
#[derive(Debug, Clone)]
pub struct Chat {
    pub title: String,
    pub messages: Vec<Message>,
}

impl Chat {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            messages: Vec::new(),
        }
    }
}

/// Errors from store mutations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Chat title must not be empty")]
    EmptyTitle,

    #[error("'{0}' already exists.")]
    DuplicateTitle(String),
}

/// Title-keyed chat sessions plus the active title.
///
/// Chats are kept in creation order so listings are stable.
#[derive(Debug, Default)]
pub struct ChatStore {
    chats: Vec<Chat>,
    current: String,
}

impl ChatStore {
    /// Create a store holding only the default chat
    pub fn new() -> Self {
        let mut store = Self::default();
        store.ensure_default();
        store
    }

    /// Insert the default chat if the store is empty
    pub fn ensure_default(&mut self) {
        if self.chats.is_empty() {
            self.chats.push(Chat::new(DEFAULT_CHAT_TITLE));
        }
        if !self.contains(&self.current) {
            self.current = self.chats[0].title.clone();
        }
    }

    /// Create an empty chat and make it current.
    ///
    /// The title is trimmed first. On error the store is left untouched.
    pub fn create_chat(&mut self, title: &str) -> Result<&str, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        if self.contains(title) {
            return Err(StoreError::DuplicateTitle(title.to_string()));
        }

        self.chats.push(Chat::new(title));
        self.current = title.to_string();
        Ok(&self.current)
    }

    /// Make `title` the current chat. Returns whether the selection changed.
    pub fn switch_to(&mut self, title: &str) -> bool {
        if title == self.current || !self.contains(title) {
            return false;
        }
        self.current = title.to_string();
        true
    }

    /// Drop every message of the current chat, keeping its title
    pub fn clear_current(&mut self) {
        let current = self.current.clone();
        if let Some(chat) = self.chat_mut(&current) {
            chat.messages.clear();
        }
    }

    /// Append a turn to the chat named `title`
    pub fn append(&mut self, title: &str, message: Message) {
        match self.chat_mut(title) {
            Some(chat) => chat.messages.push(message),
            None => tracing::debug!(title, "Dropping message for unknown chat"),
        }
    }

    /// Messages of `title`, or an empty slice if there is no such chat
    pub fn messages_for(&self, title: &str) -> &[Message] {
        self.chat(title)
            .map(|chat| chat.messages.as_slice())
            .unwrap_or(&[])
    }

    /// The latest `n` messages of `title`, oldest first
    pub fn preview_tail(&self, title: &str, n: usize) -> &[Message] {
        let messages = self.messages_for(title);
        &messages[messages.len().saturating_sub(n)..]
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn contains(&self, title: &str) -> bool {
        self.chat(title).is_some()
    }

    /// Titles in creation order
    pub fn titles(&self) -> Vec<String> {
        self.chats.iter().map(|chat| chat.title.clone()).collect()
    }

    pub fn chat(&self, title: &str) -> Option<&Chat> {
        self.chats.iter().find(|chat| chat.title == title)
    }

    fn chat_mut(&mut self, title: &str) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|chat| chat.title == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_default_on_empty_store() {
        let mut store = ChatStore::default();
        assert!(store.titles().is_empty());

        store.ensure_default();
        assert_eq!(store.titles(), vec![DEFAULT_CHAT_TITLE]);
        assert_eq!(store.current(), DEFAULT_CHAT_TITLE);
        assert!(store.messages_for(DEFAULT_CHAT_TITLE).is_empty());
    }

    #[test]
    fn test_ensure_default_is_idempotent() {
        let mut store = ChatStore::new();
        store.create_chat("Trip").unwrap();
        store.append("Trip", Message::user("Hello"));

        store.ensure_default();
        store.ensure_default();

        assert_eq!(store.titles(), vec![DEFAULT_CHAT_TITLE, "Trip"]);
        assert_eq!(store.current(), "Trip");
        assert_eq!(store.messages_for("Trip"), &[Message::user("Hello")]);
    }

    #[test]
    fn test_create_chat_trims_and_selects() {
        let mut store = ChatStore::new();
        let title = store.create_chat("  Trip  ").unwrap().to_string();

        assert_eq!(title, "Trip");
        assert_eq!(store.current(), "Trip");
        assert_eq!(store.titles().len(), 2);
    }

    #[test]
    fn test_create_chat_rejects_blank_title() {
        let mut store = ChatStore::new();
        assert_eq!(store.create_chat("   "), Err(StoreError::EmptyTitle));
        assert_eq!(store.titles().len(), 1);
        assert_eq!(store.current(), DEFAULT_CHAT_TITLE);
    }

    #[test]
    fn test_duplicate_title_leaves_store_unchanged() {
        let mut store = ChatStore::new();
        store.create_chat("Trip").unwrap();
        store.create_chat("Work").unwrap();
        let before = store.titles();

        let err = store.create_chat(" Trip ").unwrap_err();
        assert_eq!(err, StoreError::DuplicateTitle("Trip".to_string()));
        assert_eq!(err.to_string(), "'Trip' already exists.");
        assert_eq!(store.titles(), before);
        assert_eq!(store.current(), "Work");
    }

    #[test]
    fn test_switch_to() {
        let mut store = ChatStore::new();
        store.create_chat("Trip").unwrap();

        assert!(store.switch_to(DEFAULT_CHAT_TITLE));
        assert_eq!(store.current(), DEFAULT_CHAT_TITLE);

        // Already current
        assert!(!store.switch_to(DEFAULT_CHAT_TITLE));

        // Unknown titles are ignored
        assert!(!store.switch_to("Nowhere"));
        assert_eq!(store.current(), DEFAULT_CHAT_TITLE);
    }

    #[test]
    fn test_clear_current_only_touches_current() {
        let mut store = ChatStore::new();
        store.append(DEFAULT_CHAT_TITLE, Message::user("keep me"));
        store.create_chat("Trip").unwrap();
        store.append("Trip", Message::user("Hello"));
        store.append("Trip", Message::assistant("Hi there"));

        store.clear_current();

        assert!(store.messages_for("Trip").is_empty());
        assert!(store.contains("Trip"));
        assert_eq!(store.current(), "Trip");
        assert_eq!(store.messages_for(DEFAULT_CHAT_TITLE).len(), 1);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = ChatStore::new();
        for i in 0..5 {
            let before = store.messages_for(DEFAULT_CHAT_TITLE).len();
            store.append(DEFAULT_CHAT_TITLE, Message::user(format!("m{i}")));
            assert_eq!(store.messages_for(DEFAULT_CHAT_TITLE).len(), before + 1);
        }

        let contents: Vec<_> = store
            .messages_for(DEFAULT_CHAT_TITLE)
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["m0", "m1", "m2", "m3", "m4"]);
    }

    #[test]
    fn test_messages_for_unknown_chat_is_empty() {
        let store = ChatStore::new();
        assert!(store.messages_for("missing").is_empty());
        assert!(store.preview_tail("missing", PREVIEW_LEN).is_empty());
    }

    #[test]
    fn test_preview_tail() {
        let mut store = ChatStore::new();
        for i in 0..3 {
            store.append(DEFAULT_CHAT_TITLE, Message::user(format!("m{i}")));
        }
        assert_eq!(store.preview_tail(DEFAULT_CHAT_TITLE, PREVIEW_LEN).len(), 3);

        for i in 3..25 {
            store.append(DEFAULT_CHAT_TITLE, Message::user(format!("m{i}")));
        }
        let tail = store.preview_tail(DEFAULT_CHAT_TITLE, PREVIEW_LEN);
        assert_eq!(tail.len(), PREVIEW_LEN);
        assert_eq!(tail[0].content, "m15");
        assert_eq!(tail[9].content, "m24");
        assert_eq!(store.messages_for(DEFAULT_CHAT_TITLE).len(), 25);
    }
}
