//! Service layer: mutation orchestration.
//!
//! [`MessageService`] validates requests, mutates the
//! [`crate::domain::MessageStore`], and publishes the resulting envelopes
//! through the [`crate::domain::BroadcastHub`].

pub mod message_service;

pub use message_service::MessageService;
