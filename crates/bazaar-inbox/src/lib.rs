//! # bazaar-inbox
//!
//! Buyer/seller messaging for the Bazaar marketplace: the conversation
//! list, unread tracking, bulk actions, sending text and images, and the
//! product actions reachable from a conversation.

pub mod attachment;
pub mod chat;
pub mod config;
pub mod notice;
pub mod product;
pub mod read_state;
pub mod selection;
pub mod state;
pub mod store;

mod error;

use tracing_subscriber::{fmt, EnvFilter};

pub use attachment::{EncodedImage, ImageFile, ImageTarget, PendingImage};
pub use config::InboxConfig;
pub use error::{InboxError, Result};
pub use notice::{Notice, NoticeKind, NoticeQueue, Notifier, TracingNotifier};
pub use product::ReviewDraft;
pub use selection::SelectionController;
pub use state::{profile_route, Inbox, InboxRow};
pub use store::ConversationStore;

/// Install the global tracing subscriber.  `RUST_LOG` overrides the default
/// filter.  Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bazaar_inbox=debug,bazaar_store=info,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
