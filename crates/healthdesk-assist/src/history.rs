//! Conversation history.
//!
//! Messages are only ever appended. Overlapping submissions are serialized by
//! the lock, so append order is the only ordering guarantee.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use healthdesk_contracts::{
    chat::{ChatMessage, Sender, SessionId},
    error::{HealthdeskError, HealthdeskResult},
};

/// Append-only message list for one chat session.
///
/// Cloning shares the underlying list.
#[derive(Debug, Clone)]
pub struct History {
    session_id: SessionId,
    messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl History {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Append a message authored by `sender` and return it.
    ///
    /// The message id is its 1-based position in the session.
    pub fn append(&self, sender: Sender, text: impl Into<String>) -> HealthdeskResult<ChatMessage> {
        let mut messages = self.lock()?;
        let message = ChatMessage::now(messages.len() as u64 + 1, sender, text);
        debug!(session_id = %self.session_id, id = message.id, %sender, "history append");
        messages.push(message.clone());
        Ok(message)
    }

    /// All messages so far, in append order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.messages.lock() {
            Ok(messages) => messages.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> HealthdeskResult<MutexGuard<'_, Vec<ChatMessage>>> {
        self.messages
            .lock()
            .map_err(|e| HealthdeskError::HistoryWriteFailed {
                reason: format!("history lock poisoned: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn filled() -> History {
        let history = History::new(SessionId::new());
        history.append(Sender::Assistant, "welcome").unwrap();
        history.append(Sender::User, "hello").unwrap();
        history.append(Sender::Assistant, "hi there").unwrap();
        history
    }

    #[test]
    fn test_ids_are_positions() {
        let history = filled();
        let ids: Vec<u64> = history.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(history.messages()[1].sender, Sender::User);
        assert_eq!(history.len(), 3);
        assert!(!history.is_empty());
    }

    #[test]
    fn test_new_history_is_empty() {
        let history = History::new(SessionId::new());
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn test_clones_share_messages() {
        let history = filled();
        let other = history.clone();
        other.append(Sender::User, "again").unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history.messages()[3].text, "again");
    }

    /// Concurrent appends never lose or duplicate ids.
    #[test]
    fn test_concurrent_appends() {
        let history = History::new(SessionId::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let history = history.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        history.append(Sender::User, format!("t{t}-m{i}")).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let ids: Vec<u64> = history.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, (1..=100).collect::<Vec<u64>>());
    }
}
