//! Session controller
//!
//! Turns user actions (new chat, switch, clear, send) into chat store
//! operations and drives the model call for each sent message. Every action
//! leaves the controller in a state the UI can render with [`SessionController::view`].
//!
//! Sending follows `Idle -> AwaitingResponse -> Idle` per chat: the user turn is
//! stored before the model is called, the assistant turn only if the call
//! succeeds. Only one send may be in flight per chat.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::conversation::Message;
use crate::providers::{ChatModel, ProviderError};

use super::store::{ChatStore, StoreError, PREVIEW_LEN};

/// Longest preview line shown untruncated
const PREVIEW_MAX_CHARS: usize = 50;

/// Characters kept when a preview line is truncated
const PREVIEW_KEEP_CHARS: usize = 47;

/// Shown in place of the history preview while the current chat is empty
pub const EMPTY_HISTORY_HINT: &str = "🗨️ Start chatting to see history here.";

/// Transient status line shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "text", rename_all = "lowercase")]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    AwaitingResponse,
}

/// Everything the UI needs to redraw itself
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub current: String,
    pub chats: Vec<String>,
    pub messages: Vec<Message>,
    pub history: Vec<String>,
    pub status: SessionStatus,
    pub notice: Option<Notice>,
}

/// Errors from user actions
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("'{0}' is still waiting for a response")]
    Busy(String),

    #[error("Model call failed: {0}")]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Default)]
struct SessionState {
    store: ChatStore,
    /// Chats with a model call in flight
    pending: HashSet<String>,
    /// Latest notice per chat title
    notices: HashMap<String, Notice>,
}

pub struct SessionController {
    state: Mutex<SessionState>,
    model: Arc<dyn ChatModel>,
}

impl SessionController {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            state: Mutex::new(SessionState {
                store: ChatStore::new(),
                ..Default::default()
            }),
            model,
        }
    }

    /// Start New Chat. Blank titles are ignored and return `Ok(false)`.
    pub fn start_new_chat(&self, title: &str) -> Result<bool, SessionError> {
        let mut state = self.lock();
        let current = state.store.current().to_string();
        state.notices.remove(&current);

        match state.store.create_chat(title).map(str::to_string) {
            Ok(title) => {
                tracing::info!(title = %title, "Started new chat");
                Ok(true)
            }
            Err(StoreError::EmptyTitle) => Ok(false),
            Err(err) => {
                tracing::debug!(%err, "Rejected new chat");
                state
                    .notices
                    .insert(current, Notice::Warning(format!("⚠️ {}", err)));
                Err(err.into())
            }
        }
    }

    /// Switch Chat. Returns whether the selection changed.
    pub fn switch_chat(&self, title: &str) -> bool {
        let mut state = self.lock();
        let changed = state.store.switch_to(title);
        if changed {
            tracing::info!(title, "Switched chat");
        }
        changed
    }

    /// Clear Current Chat
    pub fn clear_current_chat(&self) -> Result<(), SessionError> {
        let mut state = self.lock();
        let current = state.store.current().to_string();
        if state.pending.contains(&current) {
            return Err(SessionError::Busy(current));
        }

        state.store.clear_current();
        state.notices.remove(&current);
        tracing::info!(title = %current, "Cleared chat");
        Ok(())
    }

    /// Send Message to the current chat and wait for the reply.
    ///
    /// The user turn stays in the chat even when the model call fails.
    pub async fn send_message(&self, text: &str) -> Result<Message, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let (title, history) = {
            let mut state = self.lock();
            let title = state.store.current().to_string();
            if state.pending.contains(&title) {
                return Err(SessionError::Busy(title));
            }

            let history = state.store.messages_for(&title).to_vec();
            state.store.append(&title, Message::user(text));
            state.pending.insert(title.clone());
            state.notices.remove(&title);
            (title, history)
        };

        let _pending = PendingGuard {
            controller: self,
            title: title.clone(),
        };

        tracing::debug!(title = %title, history = history.len(), "Awaiting response");
        let result = self.model.complete(&history, text).await;

        let mut state = self.lock();
        match result {
            Ok(reply) => {
                let message = Message::assistant(reply);
                state.store.append(&title, message.clone());
                tracing::debug!(title = %title, "Response received");
                Ok(message)
            }
            Err(err) => {
                tracing::warn!(title = %title, error = %err, "Model call failed");
                state
                    .notices
                    .insert(title.clone(), Notice::Error(format!("❌ {}", err)));
                Err(err.into())
            }
        }
    }

    pub fn view(&self) -> SessionView {
        let state = self.lock();
        let current = state.store.current().to_string();
        let messages = state.store.messages_for(&current).to_vec();

        let notice = state.notices.get(&current).cloned().or_else(|| {
            messages
                .is_empty()
                .then(|| Notice::Info(EMPTY_HISTORY_HINT.to_string()))
        });

        SessionView {
            chats: state.store.titles(),
            history: state
                .store
                .preview_tail(&current, PREVIEW_LEN)
                .iter()
                .map(preview_line)
                .collect(),
            status: if state.pending.contains(&current) {
                SessionStatus::AwaitingResponse
            } else {
                SessionStatus::Idle
            },
            messages,
            notice,
            current,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases a chat's in-flight slot, even if the send future is dropped
struct PendingGuard<'a> {
    controller: &'a SessionController,
    title: String,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.controller.lock().pending.remove(&self.title);
    }
}

/// One-line rendering of a turn for the history preview
pub fn preview_line(message: &Message) -> String {
    let content = message.content.trim();
    let preview = if content.chars().count() > PREVIEW_MAX_CHARS {
        let kept: String = content.chars().take(PREVIEW_KEEP_CHARS).collect();
        format!("{}...", kept)
    } else {
        content.to_string()
    };
    format!("{} {}", message.role.marker(), preview)
}
