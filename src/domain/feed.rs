//! Client-side replica of the board.
//!
//! [`LocalFeed`] applies envelopes the way a connected client does, so a
//! replica fed from a subscription can be checked against the store.

use super::envelope::{Envelope, Frame};
use super::Message;

/// Newest-first view of the board rebuilt from envelopes.
#[derive(Debug, Clone, Default)]
pub struct LocalFeed {
    messages: Vec<Message>,
    synced: bool,
}

impl LocalFeed {
    /// Creates an empty, unsynced feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one envelope.
    ///
    /// `initial` replaces the whole view. A `new-message` for an id that
    /// is already present (seen in the snapshot) is ignored, and edits or
    /// deletes for unknown ids are no-ops.
    pub fn apply(&mut self, envelope: Envelope) {
        match envelope {
            Envelope::Initial { messages } => {
                self.messages = messages;
                self.synced = true;
            }
            Envelope::NewMessage { message } => {
                if !self.messages.iter().any(|m| m.id == message.id) {
                    self.messages.insert(0, message);
                }
            }
            Envelope::EditMessage { message } => {
                if let Some(slot) = self.messages.iter_mut().find(|m| m.id == message.id) {
                    *slot = message;
                }
            }
            Envelope::DeleteMessage { id } => self.messages.retain(|m| m.id != id),
        }
    }

    /// Applies a wire frame. Keep-alives are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if a data frame is not a valid
    /// envelope.
    pub fn apply_frame(&mut self, frame: &Frame) -> Result<(), serde_json::Error> {
        if let Some(json) = frame.payload() {
            self.apply(serde_json::from_str(json)?);
        }
        Ok(())
    }

    /// Returns the current view, newest-first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns `true` once an `initial` envelope has been applied.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        self.synced
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::auth::{Identity, Profile};
    use crate::domain::envelope::encode;

    fn message(content: &str) -> Message {
        let author = Identity {
            user_id: "u1".to_string(),
            profile: Profile::default(),
        };
        Message::new(content.to_string(), &author)
    }

    #[test]
    fn initial_replaces_view() {
        let mut feed = LocalFeed::new();
        feed.apply(Envelope::NewMessage {
            message: message("stale"),
        });
        assert!(!feed.is_synced());

        let fresh = vec![message("b"), message("a")];
        feed.apply(Envelope::Initial {
            messages: fresh.clone(),
        });
        assert!(feed.is_synced());
        assert_eq!(feed.messages(), fresh.as_slice());
    }

    #[test]
    fn lifecycle_converges() {
        let mut feed = LocalFeed::new();
        feed.apply(Envelope::Initial {
            messages: Vec::new(),
        });

        let a = message("a");
        let mut b = message("b");
        feed.apply(Envelope::NewMessage { message: a.clone() });
        feed.apply(Envelope::NewMessage { message: b.clone() });
        b.edit("b2".to_string());
        feed.apply(Envelope::EditMessage { message: b.clone() });
        feed.apply(Envelope::DeleteMessage { id: a.id });

        assert_eq!(feed.messages(), [b].as_slice());
    }

    #[test]
    fn duplicate_new_message_is_ignored() {
        let a = message("a");
        let mut feed = LocalFeed::new();
        feed.apply(Envelope::Initial {
            messages: vec![a.clone()],
        });
        feed.apply(Envelope::NewMessage { message: a.clone() });
        assert_eq!(feed.messages().len(), 1);
    }

    #[test]
    fn keep_alive_frames_are_ignored() {
        let mut feed = LocalFeed::new();
        assert!(feed.apply_frame(&Frame::KeepAlive).is_ok());
        assert!(!feed.is_synced());

        let Ok(frame) = encode(&Envelope::Initial {
            messages: Vec::new(),
        }) else {
            panic!("encoding failed");
        };
        assert!(feed.apply_frame(&frame).is_ok());
        assert!(feed.is_synced());
    }
}
