//! Server-sent event transport.
//!
//! The endpoint at `/api/v1/messages/stream` holds one long-lived
//! `text/event-stream` response per client and relays the frames of a
//! [`crate::domain::Subscription`].

pub mod handler;
