//! Per-chat session state.
//!
//! Holds each chat's service tokens and its position in a multi-step
//! conversation. The store is an explicit value the caller owns and passes
//! into the chat layer by reference; deliberately not process-wide state.

use std::collections::HashMap;

use crate::integrations::{EventRef, Project, TaskRef};

/// Chat session identifier assigned by the transport.
pub type ChatId = i64;

/// Access tokens a chat has linked.
#[derive(Debug, Clone, Default)]
pub struct SessionTokens {
    pub google: Option<String>,
    pub todoist: Option<String>,
}

/// Where a multi-step conversation currently stands. One pending action per
/// chat; the next incoming message consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    /// /add_event was issued; the next message describes the event.
    AwaitingEventText,
    /// /add_task listed these projects; the next message picks one by number.
    AwaitingProjectChoice { projects: Vec<Project> },
    /// A project was picked; the next message describes the task.
    AwaitingTaskText { project_id: String },
    /// /delete_event listed these events; the next message picks one by number.
    AwaitingEventDeletion { events: Vec<EventRef> },
    /// /delete_task listed these tasks; the next message picks one by number.
    AwaitingTaskDeletion { tasks: Vec<TaskRef> },
}

/// Keyed store of tokens and pending conversation state.
#[derive(Debug, Default)]
pub struct SessionStore {
    tokens: HashMap<ChatId, SessionTokens>,
    pending: HashMap<ChatId, PendingAction>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_google_token(&mut self, chat_id: ChatId, token: impl Into<String>) {
        self.tokens.entry(chat_id).or_default().google = Some(token.into());
    }

    pub fn set_todoist_token(&mut self, chat_id: ChatId, token: impl Into<String>) {
        self.tokens.entry(chat_id).or_default().todoist = Some(token.into());
    }

    pub fn google_token(&self, chat_id: ChatId) -> Option<&str> {
        self.tokens.get(&chat_id)?.google.as_deref()
    }

    pub fn todoist_token(&self, chat_id: ChatId) -> Option<&str> {
        self.tokens.get(&chat_id)?.todoist.as_deref()
    }

    pub fn set_pending(&mut self, chat_id: ChatId, action: PendingAction) {
        self.pending.insert(chat_id, action);
    }

    /// Remove and return the chat's pending action. Handlers re-set it
    /// explicitly when the conversation should stay at the same step.
    pub fn take_pending(&mut self, chat_id: ChatId) -> Option<PendingAction> {
        self.pending.remove(&chat_id)
    }

    pub fn has_pending(&self, chat_id: ChatId) -> bool {
        self.pending.contains_key(&chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_kept_per_chat() {
        let mut store = SessionStore::new();
        store.set_google_token(1, "g-token");
        store.set_todoist_token(2, "t-token");

        assert_eq!(store.google_token(1), Some("g-token"));
        assert_eq!(store.google_token(2), None);
        assert_eq!(store.todoist_token(2), Some("t-token"));
        assert_eq!(store.todoist_token(1), None);
    }

    #[test]
    fn second_token_does_not_clobber_the_first() {
        let mut store = SessionStore::new();
        store.set_google_token(1, "g-token");
        store.set_todoist_token(1, "t-token");
        assert_eq!(store.google_token(1), Some("g-token"));
        assert_eq!(store.todoist_token(1), Some("t-token"));
    }

    #[test]
    fn take_pending_consumes_the_state() {
        let mut store = SessionStore::new();
        store.set_pending(1, PendingAction::AwaitingEventText);

        assert!(store.has_pending(1));
        assert_eq!(store.take_pending(1), Some(PendingAction::AwaitingEventText));
        assert_eq!(store.take_pending(1), None);
        assert!(!store.has_pending(1));
    }
}
