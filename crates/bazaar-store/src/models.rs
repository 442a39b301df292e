//! Domain model structs for the marketplace inbox.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the UI layer.

use bazaar_shared::{ConversationId, ProductStatus, Role, UserId, Username};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Reference data for a marketplace account.  Read-only inside the inbox.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    /// Average review score, 0.0 when the user has no reviews yet.
    pub rating: f32,
    pub location: String,
    pub num_products: u32,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Product snapshot
// ---------------------------------------------------------------------------

/// The listing a conversation is about, embedded in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub name: String,
    pub price: f64,
    pub image_ref: Option<String>,
    pub status: ProductStatus,
    pub marked_as_sold_to: Option<Username>,
}

impl ProductSnapshot {
    pub fn available(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            image_ref: None,
            status: ProductStatus::Available,
            marked_as_sold_to: None,
        }
    }

    pub fn is_sold(&self) -> bool {
        self.status == ProductStatus::Sold
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.  Immutable once appended to its conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub sender: Username,
    /// Empty for image-only messages.
    pub text: String,
    /// Inline displayable image (a `data:` URL) or a hosted image reference.
    pub image_ref: Option<String>,
    /// Display-formatted time, e.g. "3:07 PM".
    pub time: String,
    pub sent_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// Denormalized last-message summary shown in the conversation list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Preview {
    pub text: String,
    pub time: String,
}

/// A two-party conversation about one listing.
///
/// Exactly one of `sender` / `recipient` is the logged-in user; `role` says
/// which side of the sale that user is on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub role: Role,
    pub sender: Username,
    pub recipient: Username,
    pub product: Option<ProductSnapshot>,
    pub messages: Vec<Message>,
    pub unread: bool,
    /// Soft-delete flag.  Deleted conversations stay in storage but are
    /// filtered from every view.
    pub deleted: bool,
    pub preview: Preview,
}

impl Conversation {
    /// A fresh, empty thread opened by `me` towards `counterparty`.
    pub fn open(
        role: Role,
        me: Username,
        counterparty: Username,
        product: Option<ProductSnapshot>,
    ) -> Self {
        Self {
            id: ConversationId::new(),
            role,
            sender: me,
            recipient: counterparty,
            product,
            messages: Vec::new(),
            unread: false,
            deleted: false,
            preview: Preview::default(),
        }
    }

    pub fn involves(&self, username: &Username) -> bool {
        &self.sender == username || &self.recipient == username
    }

    /// The participant who is not `me`, or `None` when `me` is not exactly
    /// one of the two participants.
    pub fn counterparty(&self, me: &Username) -> Option<&Username> {
        match (&self.sender == me, &self.recipient == me) {
            (true, false) => Some(&self.recipient),
            (false, true) => Some(&self.sender),
            _ => None,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append `message` and refresh the preview from it.
    pub fn push_message(&mut self, message: Message, preview_text: impl Into<String>) {
        self.preview = Preview {
            text: preview_text.into(),
            time: message.time.clone(),
        };
        self.messages.push(message);
    }
}
