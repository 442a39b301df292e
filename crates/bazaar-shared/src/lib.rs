//! # bazaar-shared
//!
//! Identifiers, enums and validation shared by the store and the inbox.

pub mod constants;
pub mod error;
pub mod types;

pub use error::ValidationError;
pub use types::{ConversationId, DisplayMode, ProductStatus, Role, UserId, Username};
