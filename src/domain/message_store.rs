//! Canonical ordered message list.
//!
//! [`MessageStore`] keeps the authoritative list in memory behind a
//! [`tokio::sync::RwLock`] and mirrors every change into a
//! [`ListBackend`] for durability. The in-memory list is the read path of
//! record, so readers never observe the backend's rewrite window.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Message, MessageId};
use crate::error::BoardError;
use crate::persistence::ListBackend;

/// The single process-wide ordered list of live messages.
///
/// Messages are held oldest-first (append order) and handed out
/// newest-first by [`MessageStore::snapshot`].
///
/// # Concurrency
///
/// - Mutations hold the write lock across the backend round trip, so only
///   one mutation is in flight at a time.
/// - Snapshots and lookups share the read lock and wait for an in-flight
///   mutation to finish.
/// - A mutation whose backend write fails leaves the in-memory list
///   untouched.
#[derive(Debug)]
pub struct MessageStore {
    messages: RwLock<Vec<Message>>,
    backend: Arc<dyn ListBackend>,
}

impl MessageStore {
    /// Creates an empty store over `backend` without reading it.
    #[must_use]
    pub fn new(backend: Arc<dyn ListBackend>) -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            backend,
        }
    }

    /// Creates a store hydrated from the records already in `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BackingStore`] if the backend read fails.
    pub async fn load(backend: Arc<dyn ListBackend>) -> Result<Self, BoardError> {
        let mut messages = backend.range_all().await?;
        messages.reverse();
        tracing::info!(count = messages.len(), "message store loaded");
        Ok(Self {
            messages: RwLock::new(messages),
            backend,
        })
    }

    /// Adds `message` to the tail of the canonical order.
    ///
    /// Not retried on failure: a blind retry could duplicate the entry.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BackingStore`] if the backend write fails.
    pub async fn append(&self, message: Message) -> Result<(), BoardError> {
        let mut messages = self.messages.write().await;
        self.backend.push_front(&message).await?;
        messages.push(message);
        Ok(())
    }

    /// Looks up a message by id.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::MessageNotFound`] if no live message has `id`.
    pub async fn find_by_id(&self, id: MessageId) -> Result<Message, BoardError> {
        let messages = self.messages.read().await;
        messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| BoardError::MessageNotFound(id.to_string()))
    }

    /// Replaces the content of message `id` on behalf of `editor_id` and
    /// returns the updated record.
    ///
    /// # Errors
    ///
    /// - [`BoardError::MessageNotFound`] if `id` is unknown.
    /// - [`BoardError::Forbidden`] if `editor_id` is not the author.
    /// - [`BoardError::BackingStore`] if the backend rewrite fails.
    pub async fn update(
        &self,
        id: MessageId,
        content: String,
        editor_id: &str,
    ) -> Result<Message, BoardError> {
        let mut messages = self.messages.write().await;
        let position = owned_position(&messages, id, editor_id)?;

        let mut next = messages.clone();
        let Some(target) = next.get_mut(position) else {
            return Err(BoardError::MessageNotFound(id.to_string()));
        };
        target.edit(content);
        let updated = target.clone();

        self.rewrite(&next).await?;
        *messages = next;
        Ok(updated)
    }

    /// Deletes message `id` on behalf of `requester_id`.
    ///
    /// # Errors
    ///
    /// - [`BoardError::MessageNotFound`] if `id` is unknown.
    /// - [`BoardError::Forbidden`] if `requester_id` is not the author.
    /// - [`BoardError::BackingStore`] if the backend rewrite fails.
    pub async fn remove(&self, id: MessageId, requester_id: &str) -> Result<(), BoardError> {
        let mut messages = self.messages.write().await;
        let position = owned_position(&messages, id, requester_id)?;

        let mut next = messages.clone();
        next.remove(position);

        self.rewrite(&next).await?;
        *messages = next;
        Ok(())
    }

    /// Returns every live message, newest-first.
    pub async fn snapshot(&self) -> Vec<Message> {
        let messages = self.messages.read().await;
        messages.iter().rev().cloned().collect()
    }

    /// Returns the number of live messages.
    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Returns `true` if the board holds no messages.
    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }

    /// Mirrors `oldest_first` into the backend, which stores newest-first.
    async fn rewrite(&self, oldest_first: &[Message]) -> Result<(), BoardError> {
        let newest_first: Vec<Message> = oldest_first.iter().rev().cloned().collect();
        self.backend.replace_all(&newest_first).await.inspect_err(|err| {
            tracing::error!(error = %err, "backing list rewrite failed");
        })
    }
}

/// Finds the position of `id` and checks that `user_id` authored it.
fn owned_position(messages: &[Message], id: MessageId, user_id: &str) -> Result<usize, BoardError> {
    let (position, message) = messages
        .iter()
        .enumerate()
        .find(|(_, m)| m.id == id)
        .ok_or_else(|| BoardError::MessageNotFound(id.to_string()))?;
    if !message.is_authored_by(user_id) {
        return Err(BoardError::Forbidden(id));
    }
    Ok(position)
}
