//! Conversation history shared between the agent and its tools.
//!
//! The agent appends one `(user query, assistant reply)` pair per completed
//! reply; the history tool reads the tail of it. Handles are cheap clones over
//! the same store.

use crate::types::Message;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Append-only log of prior exchanges.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    inner: Arc<RwLock<Vec<Message>>>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one message.
    pub fn add_message(&self, message: Message) {
        self.write().push(message);
    }

    /// Append a user query and the reply to it as one unit.
    ///
    /// Concurrent readers never observe the query without its reply.
    pub fn append_exchange(&self, query: Message, reply: Message) {
        let mut guard = self.write();
        guard.push(query);
        guard.push(reply);
    }

    /// Snapshot of the full history in insertion order.
    pub fn get(&self) -> Vec<Message> {
        self.read().clone()
    }

    /// The last `n` messages rendered as `"{role}: {content}"`.
    pub fn get_as_string_list(&self, n: usize) -> Vec<String> {
        let guard = self.read();
        let start = guard.len().saturating_sub(n);
        guard[start..]
            .iter()
            .map(|m| format!("{}: {}", m.role, m.text()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panicking writer can only leave a fully pushed message behind, so a
    // poisoned lock is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Message>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Message>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
