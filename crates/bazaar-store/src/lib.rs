//! # bazaar-store
//!
//! Conversation storage for the Bazaar inbox.
//!
//! The crate defines the domain models, the [`ConversationRepository`] seam,
//! an in-memory implementation for tests and fixtures, and a SQLite-backed
//! [`Database`] that runs its own schema migrations.

pub mod conversations;
pub mod database;
pub mod migrations;
pub mod models;
pub mod repository;

mod error;
mod messages;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
pub use repository::{ConversationRepository, MemoryRepository};
