//! # board-gateway
//!
//! Real-time message board: authenticated users post, edit and delete
//! short messages, and every connected client sees the changes live over
//! server-sent events.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, text/event-stream)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── SSE Handler (sse/)
//!     ├── Authenticator (auth/)
//!     │
//!     ├── MessageService (service/)
//!     ├── BroadcastHub (domain/)
//!     │
//!     ├── MessageStore (domain/)
//!     │
//!     └── ListBackend: memory or PostgreSQL (persistence/)
//! ```
//!
//! A mutation is validated by the service, committed to the store, encoded
//! once into an envelope and pushed to every live subscription. A new
//! subscription starts with an `initial` snapshot; after a dropped
//! connection the client simply reconnects and resyncs from a fresh one.

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod sse;
