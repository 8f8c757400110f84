//! In-memory conversation storage.
//!
//! Transcripts are keyed by conversation id, append-only, and live for the
//! process lifetime. Each conversation carries its own async mutex: the
//! chat handler holds it for the duration of a loop run, so appends for one
//! id are serialized and two concurrent requests for the same conversation
//! cannot interleave their rounds. The store itself is injected into the
//! entry points rather than living in a global, so tests get isolated
//! stores per case.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::message::Message;

/// One stored transcript.
#[derive(Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// A copy of the transcript for a loop run to extend.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Commits a completed run: everything in `transcript` beyond the
    /// snapshot this run started from is appended in one batch. Skipping
    /// this call on failure leaves the conversation untouched.
    pub fn commit(&mut self, transcript: Vec<Message>) {
        debug_assert!(transcript.len() >= self.messages.len());
        self.messages = transcript;
    }
}

/// Keyed store of conversations, shared across requests.
#[derive(Default)]
pub struct ConversationStore {
    inner: Mutex<HashMap<String, Arc<Mutex<Conversation>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the conversation for `id`, creating it on first reference.
    /// Callers lock the returned handle for the whole run.
    pub async fn get_or_create(&self, id: &str) -> Arc<Mutex<Conversation>> {
        let mut map = self.inner.lock().await;
        Arc::clone(map.entry(id.to_string()).or_default())
    }

    /// Number of known conversations.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn conversations_are_created_on_first_reference() {
        let store = ConversationStore::new();
        assert!(store.is_empty().await);
        let conv = store.get_or_create("default").await;
        assert_eq!(store.len().await, 1);
        assert!(conv.lock().await.is_empty());

        // Same id returns the same conversation.
        let again = store.get_or_create("default").await;
        assert!(Arc::ptr_eq(&conv, &again));
    }

    #[tokio::test]
    async fn commit_replaces_with_extended_transcript() {
        let store = ConversationStore::new();
        let handle = store.get_or_create("c1").await;

        {
            let mut conv = handle.lock().await;
            let mut transcript = conv.snapshot();
            transcript.push(Message::user("hi"));
            transcript.push(Message::assistant("hello"));
            conv.commit(transcript);
        }

        let conv = handle.lock().await;
        assert_eq!(conv.len(), 2);
    }

    #[tokio::test]
    async fn abandoned_run_leaves_transcript_untouched() {
        let store = ConversationStore::new();
        let handle = store.get_or_create("c1").await;

        {
            let mut conv = handle.lock().await;
            let mut transcript = conv.snapshot();
            transcript.push(Message::user("hi"));
            conv.commit(transcript);
        }

        // A second run takes a snapshot, extends it, then fails before
        // committing. Nothing changes.
        {
            let conv = handle.lock().await;
            let mut transcript = conv.snapshot();
            transcript.push(Message::user("doomed"));
        }

        assert_eq!(handle.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn distinct_ids_are_isolated() {
        let store = ConversationStore::new();
        let a = store.get_or_create("a").await;
        let b = store.get_or_create("b").await;
        {
            let mut conv = a.lock().await;
            let mut t = conv.snapshot();
            t.push(Message::user("only in a"));
            conv.commit(t);
        }
        assert_eq!(a.lock().await.len(), 1);
        assert!(b.lock().await.is_empty());
    }
}
