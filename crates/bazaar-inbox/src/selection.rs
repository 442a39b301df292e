//! Multi-select over the visible conversation list and the bulk actions
//! that consume it.
//!
//! Rows are selected by counterparty [`UserId`], not conversation id.  Every
//! bulk action resolves the ids to usernames and acts on the active partition
//! only.  The selection is cleared once the action has been stored; after a
//! failed write it stays as it was so the user can retry.

use std::collections::{BTreeSet, HashSet};

use bazaar_shared::{ConversationId, UserId, Username};
use bazaar_store::ConversationRepository;

use crate::error::{InboxError, Result};
use crate::notice::Notice;
use crate::state::Inbox;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    selected: BTreeSet<UserId>,
}

impl SelectionController {
    /// Flip one id.  Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: UserId) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Select every visible id, or clear the selection when all of them are
    /// already selected.
    pub fn toggle_all(&mut self, visible: &[UserId]) {
        let all_selected =
            !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id));
        if all_selected {
            self.selected.clear();
        } else {
            self.selected = visible.iter().copied().collect();
        }
    }

    /// Drop ids that are no longer on screen.
    pub fn retain_visible(&mut self, visible: &[UserId]) {
        self.selected.retain(|id| visible.contains(id));
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.selected.iter().copied()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

impl<R: ConversationRepository> Inbox<R> {
    /// Counterparty ids of the rows currently on screen.
    pub fn visible_user_ids(&self) -> Vec<UserId> {
        self.store
            .list_active()
            .into_iter()
            .filter_map(|c| self.store.counterparty_of(c))
            .filter_map(|name| self.store.user_by_name(name))
            .map(|u| u.id)
            .collect()
    }

    pub fn toggle_select(&mut self, id: UserId) -> bool {
        self.selection.toggle(id)
    }

    pub fn toggle_select_all(&mut self) {
        let visible = self.visible_user_ids();
        self.selection.toggle_all(&visible);
    }

    /// Mark every selected thread in the active partition as read.
    pub fn bulk_mark_read(&mut self) -> Result<usize> {
        let targets = self.selected_usernames()?;
        let view = self.store.view();
        let count = self
            .store
            .mark_read(view, &targets)
            .map_err(|e| self.write_failed(e, "Could not mark conversations as read"))?;
        self.selection.clear();

        tracing::info!(partition = %view, count, "bulk mark as read");
        self.notify(Notice::success("Marked as read"));
        Ok(count)
    }

    /// Soft-delete every selected thread in the active partition.  Closes the
    /// open thread if it was among them.
    pub fn bulk_delete(&mut self) -> Result<usize> {
        let targets = self.selected_usernames()?;
        let view = self.store.view();
        let me = self.store.me().clone();

        let deleted = self
            .store
            .update_where(
                |c| {
                    c.role == view
                        && !c.deleted
                        && c
                            .counterparty(&me)
                            .is_some_and(|other| targets.contains(other))
                },
                |c| {
                    c.deleted = true;
                    true
                },
            )
            .map_err(|e| self.write_failed(e, "Could not delete conversations"))?;
        self.selection.clear();

        if self
            .open
            .as_ref()
            .is_some_and(|open| targets.contains(open))
        {
            self.open = None;
            self.pending_product = None;
        }
        if self.open_menu.is_some_and(|id| deleted.contains(&id)) {
            self.open_menu = None;
        }

        tracing::info!(partition = %view, count = deleted.len(), "bulk delete");
        self.notify(Notice::success("Conversations deleted"));
        Ok(deleted.len())
    }

    pub fn archive_selected(&mut self) -> Result<usize> {
        let ids = self.selected_conversation_ids()?;
        self.store.archive(&ids);
        tracing::info!(count = ids.len(), "archived");
        self.notify(Notice::success("Conversations archived"));
        Ok(ids.len())
    }

    pub fn block_selected(&mut self) -> Result<usize> {
        let ids = self.selected_conversation_ids()?;
        self.store.block(&ids);
        tracing::info!(count = ids.len(), "blocked");
        self.notify(Notice::success("Users blocked"));
        Ok(ids.len())
    }

    /// Move selected threads back to the default view.
    pub fn restore_selected(&mut self) -> Result<usize> {
        let ids = self.selected_conversation_ids()?;
        self.store.restore(&ids);
        tracing::info!(count = ids.len(), "restored");
        self.notify(Notice::success("Conversations restored"));
        Ok(ids.len())
    }

    /// Resolve and clear the selection for the in-memory folder moves.
    fn selected_conversation_ids(&mut self) -> Result<Vec<ConversationId>> {
        let targets = self.selected_usernames()?;
        let ids = targets
            .iter()
            .filter_map(|name| self.store.find_by_counterparty(name))
            .map(|c| c.id)
            .collect();
        self.selection.clear();
        Ok(ids)
    }

    /// Resolve the selection to usernames.  An empty selection is a
    /// validation error reported to the user.
    fn selected_usernames(&self) -> Result<HashSet<Username>> {
        if self.selection.is_empty() {
            self.notify(Notice::error("Select at least one conversation"));
            return Err(InboxError::EmptySelection);
        }

        let mut names = HashSet::new();
        for id in self.selection.ids() {
            match self.store.user_by_id(id) {
                Some(user) => {
                    names.insert(user.username.clone());
                }
                None => tracing::warn!(user = %id, "selected user not in directory"),
            }
        }
        Ok(names)
    }
}
