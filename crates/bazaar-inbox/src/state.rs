//! The inbox page state.
//!
//! [`Inbox`] ties the conversation store to the transient UI state around
//! it: which counterparty is open, which rows are selected, which action
//! menu is showing.  Operations live in the sibling modules as further
//! `impl Inbox` blocks.

use bazaar_shared::constants::PROFILE_ROUTE_PREFIX;
use bazaar_shared::{ConversationId, DisplayMode, Role, Username};
use bazaar_store::{Conversation, ConversationRepository, Preview, ProductSnapshot, User};
use serde::Serialize;

use crate::config::InboxConfig;
use crate::error::{InboxError, Result};
use crate::notice::{Notice, Notifier};
use crate::read_state;
use crate::selection::SelectionController;
use crate::store::ConversationStore;

pub struct Inbox<R> {
    pub(crate) store: ConversationStore<R>,
    pub(crate) selection: SelectionController,

    /// Counterparty whose thread is open in the message pane.
    pub(crate) open: Option<Username>,

    /// Conversation whose action menu is expanded.
    pub(crate) open_menu: Option<ConversationId>,

    /// Listing context for a thread that does not exist yet, attached when
    /// the first message creates it.
    pub(crate) pending_product: Option<ProductSnapshot>,

    /// Set once the user has submitted a review this session.
    pub(crate) has_reviewed: bool,

    pub(crate) notifier: Box<dyn Notifier>,
    pub(crate) config: InboxConfig,
}

/// One line of the conversation list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxRow {
    pub conversation_id: ConversationId,
    pub counterparty: Username,
    pub user: Option<User>,
    pub preview: Preview,
    pub unread: bool,
    pub product_name: Option<String>,
    pub archived: bool,
    pub blocked: bool,
}

impl<R: ConversationRepository> Inbox<R> {
    pub fn new(
        me: Username,
        users: Vec<User>,
        repo: R,
        config: InboxConfig,
        notifier: impl Notifier + 'static,
    ) -> Result<Self> {
        let store = ConversationStore::load(repo, me, users, config.start_view)?;
        Ok(Self {
            store,
            selection: SelectionController::default(),
            open: None,
            open_menu: None,
            pending_product: None,
            has_reviewed: false,
            notifier: Box::new(notifier),
            config,
        })
    }

    pub fn me(&self) -> &Username {
        self.store.me()
    }

    pub fn view(&self) -> Role {
        self.store.view()
    }

    pub fn store(&self) -> &ConversationStore<R> {
        &self.store
    }

    pub fn config(&self) -> &InboxConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.store.mode()
    }

    /// Show default, archived or blocked conversations.  Clears the
    /// selection, since selected rows may no longer be visible.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        if self.store.mode() != mode {
            self.store.set_mode(mode);
            self.selection.clear();
            self.open_menu = None;
        }
    }

    /// Filter the list.  Selected rows the new query hides are deselected.
    pub fn set_search(&mut self, query: &str) {
        self.store.set_search(query);
        let visible = self.visible_user_ids();
        self.selection.retain_visible(&visible);
    }

    pub fn list_active(&self) -> Vec<&Conversation> {
        self.store.list_active()
    }

    /// The conversation list as the UI renders it.  Unread is derived on
    /// every call.
    pub fn rows(&self) -> Vec<InboxRow> {
        let me = self.store.me();
        self.store
            .list_active()
            .into_iter()
            .filter_map(|conv| {
                let counterparty = self.store.counterparty_of(conv)?.clone();
                Some(InboxRow {
                    conversation_id: conv.id,
                    user: self.store.user_by_name(&counterparty).cloned(),
                    counterparty,
                    preview: conv.preview.clone(),
                    unread: read_state::is_unread(conv, me),
                    product_name: conv.product.as_ref().map(|p| p.name.clone()),
                    archived: self.store.is_archived(conv.id),
                    blocked: self.store.is_blocked(conv.id),
                })
            })
            .collect()
    }

    pub fn open_menu(&mut self, id: ConversationId) {
        self.open_menu = Some(id);
    }

    pub fn close_menu(&mut self) {
        self.open_menu = None;
    }

    pub fn menu(&self) -> Option<ConversationId> {
        self.open_menu
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Tell the user a write did not go through and hand the error back.
    /// Errors that already produced their own notice pass through quietly.
    pub(crate) fn write_failed(&self, err: InboxError, message: &str) -> InboxError {
        if let InboxError::Store(cause) = &err {
            tracing::error!(error = %cause, "{}", message);
            self.notify(Notice::error(message));
        }
        err
    }
}

/// Navigation target for a user's profile page.
pub fn profile_route(username: &Username) -> String {
    format!("{PROFILE_ROUTE_PREFIX}{username}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_route_uses_username() {
        let name = Username::parse("rucas").unwrap();
        assert_eq!(profile_route(&name), "/profile/rucas");
    }
}
