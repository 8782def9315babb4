//! The abstract ordered-list store.

use async_trait::async_trait;

use crate::domain::Message;
use crate::error::BoardError;

/// Ordered collection of serialized [`Message`] records.
///
/// The head of the list is the most recently pushed record, so
/// [`ListBackend::range_all`] yields messages newest-first.
#[async_trait]
pub trait ListBackend: Send + Sync + std::fmt::Debug {
    /// Inserts `message` at the head of the list.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BackingStore`] if the write fails.
    async fn push_front(&self, message: &Message) -> Result<(), BoardError>;

    /// Returns every record, head first.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BackingStore`] if the read fails or a record
    /// cannot be decoded.
    async fn range_all(&self) -> Result<Vec<Message>, BoardError>;

    /// Removes every record.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BackingStore`] if the write fails.
    async fn clear(&self) -> Result<(), BoardError>;

    /// Rewrites the whole list so that `range_all` afterwards returns
    /// `newest_first`.
    ///
    /// The default composes `clear` and `push_front` and is not atomic;
    /// backends with transactions should override it.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BackingStore`] if any underlying write fails.
    /// The stored list may then be partially rewritten.
    async fn replace_all(&self, newest_first: &[Message]) -> Result<(), BoardError> {
        self.clear().await?;
        for message in newest_first.iter().rev() {
            self.push_front(message).await?;
        }
        Ok(())
    }
}
