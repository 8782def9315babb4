//! Message service: validates, mutates, publishes.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::auth::Identity;
use crate::domain::{BroadcastHub, Envelope, Message, MessageId, MessageStore, Subscription};
use crate::error::BoardError;

/// Orchestration layer for every board mutation and subscription.
///
/// Every mutation follows the pattern: validate → enter the sequencer →
/// mutate the store → publish the envelope → return the record. The
/// sequencer is held across the store call and the publish, so the order
/// in which subscribers see envelopes is the order in which mutations
/// committed. [`MessageService::subscribe`] takes the same sequencer, so a
/// new subscriber's `initial` snapshot is followed by exactly the
/// mutations committed after it.
#[derive(Debug)]
pub struct MessageService {
    store: Arc<MessageStore>,
    hub: BroadcastHub,
    sequencer: Mutex<()>,
}

impl MessageService {
    /// Creates a new `MessageService`.
    #[must_use]
    pub fn new(store: Arc<MessageStore>, hub: BroadcastHub) -> Self {
        Self {
            store,
            hub,
            sequencer: Mutex::new(()),
        }
    }

    /// Returns a reference to the inner [`BroadcastHub`].
    #[must_use]
    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Returns a reference to the inner [`MessageStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<MessageStore> {
        &self.store
    }

    /// Posts a new message as `author`.
    ///
    /// The author's profile is snapshotted into the record.
    ///
    /// # Errors
    ///
    /// - [`BoardError::InvalidInput`] if `content` is blank.
    /// - [`BoardError::BackingStore`] if the append fails.
    pub async fn create_message(
        &self,
        author: &Identity,
        content: &str,
    ) -> Result<Message, BoardError> {
        validate_content(content)?;
        let message = Message::new(content.to_string(), author);

        let _seq = self.sequencer.lock().await;
        self.store.append(message.clone()).await?;
        let delivered = self.hub.publish(&Envelope::NewMessage {
            message: message.clone(),
        });

        tracing::info!(
            message_id = %message.id,
            author_id = %author.user_id,
            delivered,
            "message created"
        );
        Ok(message)
    }

    /// Replaces the content of one of `editor`'s messages.
    ///
    /// # Errors
    ///
    /// - [`BoardError::InvalidInput`] if `content` is blank.
    /// - [`BoardError::MessageNotFound`] if `id` is unknown.
    /// - [`BoardError::Forbidden`] if `editor` is not the author.
    /// - [`BoardError::BackingStore`] if the rewrite fails.
    pub async fn edit_message(
        &self,
        editor: &Identity,
        id: MessageId,
        content: &str,
    ) -> Result<Message, BoardError> {
        validate_content(content)?;

        let _seq = self.sequencer.lock().await;
        let message = self
            .store
            .update(id, content.to_string(), &editor.user_id)
            .await?;
        let delivered = self.hub.publish(&Envelope::EditMessage {
            message: message.clone(),
        });

        tracing::info!(
            message_id = %id,
            author_id = %editor.user_id,
            delivered,
            "message edited"
        );
        Ok(message)
    }

    /// Deletes one of `requester`'s messages.
    ///
    /// # Errors
    ///
    /// - [`BoardError::MessageNotFound`] if `id` is unknown.
    /// - [`BoardError::Forbidden`] if `requester` is not the author.
    /// - [`BoardError::BackingStore`] if the rewrite fails.
    pub async fn delete_message(
        &self,
        requester: &Identity,
        id: MessageId,
    ) -> Result<MessageId, BoardError> {
        let _seq = self.sequencer.lock().await;
        self.store.remove(id, &requester.user_id).await?;
        let delivered = self.hub.publish(&Envelope::DeleteMessage { id });

        tracing::info!(
            message_id = %id,
            author_id = %requester.user_id,
            delivered,
            "message deleted"
        );
        Ok(id)
    }

    /// Looks up a single message.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::MessageNotFound`] if `id` is unknown.
    pub async fn get_message(&self, id: MessageId) -> Result<Message, BoardError> {
        self.store.find_by_id(id).await
    }

    /// Returns all live messages, newest-first.
    pub async fn list_messages(&self) -> Vec<Message> {
        self.store.snapshot().await
    }

    /// Opens a subscription whose first frame is the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Internal`] if the snapshot cannot be encoded.
    pub async fn subscribe(&self) -> Result<Subscription, BoardError> {
        let _seq = self.sequencer.lock().await;
        let snapshot = self.store.snapshot().await;
        self.hub.register(snapshot)
    }
}

/// Rejects content that is empty after trimming whitespace.
///
/// # Errors
///
/// Returns [`BoardError::InvalidInput`] if `content` is blank.
pub fn validate_content(content: &str) -> Result<(), BoardError> {
    if content.trim().is_empty() {
        return Err(BoardError::InvalidInput(
            "message content is required".to_string(),
        ));
    }
    Ok(())
}
