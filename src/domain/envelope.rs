//! Wire envelopes pushed to board subscribers.
//!
//! Every store mutation is turned into an [`Envelope`] and encoded once
//! into a [`Frame`] that the broadcast hub hands to every subscriber.
//! The JSON form always carries a `type` discriminator:
//!
//! ```json
//! {"type": "initial", "messages": [...]}
//! {"type": "new-message", "message": {...}}
//! {"type": "edit-message", "message": {...}}
//! {"type": "delete-message", "id": "..."}
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Message, MessageId};

/// Typed event sent to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Envelope {
    /// Full snapshot, newest-first. First envelope on every subscription.
    Initial {
        /// All live messages, newest-first.
        messages: Vec<Message>,
    },
    /// A message was appended.
    NewMessage {
        /// The created record.
        message: Message,
    },
    /// A message was edited. Carries the full updated record.
    EditMessage {
        /// The updated record.
        message: Message,
    },
    /// A message was deleted.
    DeleteMessage {
        /// Identifier of the removed message.
        id: MessageId,
    },
}

impl Envelope {
    /// Returns the `type` discriminator as a static string slice.
    #[must_use]
    pub const fn type_str(&self) -> &'static str {
        match self {
            Self::Initial { .. } => "initial",
            Self::NewMessage { .. } => "new-message",
            Self::EditMessage { .. } => "edit-message",
            Self::DeleteMessage { .. } => "delete-message",
        }
    }

    /// Returns the message id this envelope refers to, if it refers to one.
    #[must_use]
    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            Self::Initial { .. } => None,
            Self::NewMessage { message } | Self::EditMessage { message } => Some(message.id),
            Self::DeleteMessage { id } => Some(*id),
        }
    }
}

/// A unit of output on a subscription channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Encoded JSON envelope. Shared between all subscribers of one publish.
    Data(Arc<str>),
    /// No-op keep-alive; carries no payload and is ignored by clients.
    KeepAlive,
}

impl Frame {
    /// Returns the JSON payload for data frames.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Data(json) => Some(&**json),
            Self::KeepAlive => None,
        }
    }
}

/// Encodes an envelope into a data frame.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if the envelope cannot be serialized,
/// which only happens on programmer error.
pub fn encode(envelope: &Envelope) -> Result<Frame, serde_json::Error> {
    let json = serde_json::to_string(envelope)?;
    Ok(Frame::Data(Arc::from(json)))
}
