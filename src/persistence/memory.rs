//! In-process list backend.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::ListBackend;
use crate::domain::Message;
use crate::error::BoardError;

/// Volatile [`ListBackend`] holding JSON-encoded records in a deque.
///
/// Used when persistence is disabled and in tests. Records are stored
/// serialized, like a remote list store would hold them.
#[derive(Debug, Default)]
pub struct MemoryListBackend {
    items: Mutex<VecDeque<String>>,
}

impl MemoryListBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    /// Returns `true` if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

#[async_trait]
impl ListBackend for MemoryListBackend {
    async fn push_front(&self, message: &Message) -> Result<(), BoardError> {
        let record =
            serde_json::to_string(message).map_err(|e| BoardError::BackingStore(e.to_string()))?;
        self.items.lock().await.push_front(record);
        Ok(())
    }

    async fn range_all(&self) -> Result<Vec<Message>, BoardError> {
        let items = self.items.lock().await;
        items
            .iter()
            .map(|record| {
                serde_json::from_str(record).map_err(|e| BoardError::BackingStore(e.to_string()))
            })
            .collect()
    }

    async fn clear(&self) -> Result<(), BoardError> {
        self.items.lock().await.clear();
        Ok(())
    }
}
