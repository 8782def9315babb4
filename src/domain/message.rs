//! The board message record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::MessageId;
use crate::auth::Identity;

/// A single message on the board.
///
/// `id`, `created_at` and `author_id` are fixed at creation. The author
/// profile fields are a snapshot taken when the message was posted and
/// are not re-synced when the author later changes their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier (immutable).
    pub id: MessageId,
    /// Message body. Never empty after trimming.
    pub content: String,
    /// Creation timestamp (immutable).
    pub created_at: DateTime<Utc>,
    /// Time of the most recent edit, `None` until the first edit.
    pub updated_at: Option<DateTime<Utc>>,
    /// Identifier of the posting user (immutable, used for ownership checks).
    pub author_id: String,
    /// Author display name at creation time.
    pub author_display_name: String,
    /// Author avatar URL at creation time. Empty when the author has none.
    pub author_avatar_url: String,
}

impl Message {
    /// Creates a new message authored by `author`, stamped with the current time.
    #[must_use]
    pub fn new(content: String, author: &Identity) -> Self {
        Self {
            id: MessageId::new(),
            content,
            created_at: Utc::now(),
            updated_at: None,
            author_id: author.user_id.clone(),
            author_display_name: author.profile.display_name(),
            author_avatar_url: author.profile.image_url.clone().unwrap_or_default(),
        }
    }

    /// Returns `true` if `user_id` is the author of this message.
    #[must_use]
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id == user_id
    }

    /// Replaces the content and stamps `updated_at` with the current time.
    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.updated_at = Some(Utc::now());
    }
}
