//! Persistence layer: the ordered-list backing store.
//!
//! The board keeps its canonical list in memory and mirrors every change
//! into a [`ListBackend`]. The backend only offers head insertion, a full
//! ordered read and a clear; anything else is composed from those
//! primitives.

pub mod backend;
pub mod memory;
pub mod postgres;

pub use backend::ListBackend;
pub use memory::MemoryListBackend;
pub use postgres::PostgresListBackend;
