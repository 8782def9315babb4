//! Domain layer: message model, canonical store, envelopes, fan-out.
//!
//! This module contains the server-side model of the board: message
//! identity and records, the [`MessageStore`] holding the canonical
//! ordered list, the [`Envelope`] encoder, and the [`BroadcastHub`] that
//! pushes encoded envelopes to every live subscription.

pub mod broadcast_hub;
pub mod envelope;
pub mod feed;
pub mod message;
pub mod message_id;
pub mod message_store;

pub use broadcast_hub::{BroadcastHub, SubscriberId, Subscription, SubscriptionState};
pub use envelope::{Envelope, Frame, encode};
pub use feed::LocalFeed;
pub use message::Message;
pub use message_id::MessageId;
pub use message_store::MessageStore;
