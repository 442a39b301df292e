//! Unread tracking.
//!
//! The stored `unread` flag only counts when someone else spoke last: a
//! thread whose latest message came from the session user is always caught
//! up.  Nothing here is cached; every read reapplies the rule.

use std::collections::{BTreeSet, HashSet};

use bazaar_shared::{Role, Username};
use bazaar_store::{Conversation, ConversationRepository};

use crate::error::Result;
use crate::state::Inbox;
use crate::store::ConversationStore;

/// Whether `conv` should be shown as unread to `me`.
pub fn is_unread(conv: &Conversation, me: &Username) -> bool {
    conv.unread
        && conv
            .last_message()
            .map_or(true, |message| &message.sender != me)
}

impl<R: ConversationRepository> ConversationStore<R> {
    /// Clear `unread` on every live conversation in `role` whose counterparty
    /// is in `counterparties`.  The other partition is never touched.
    pub fn mark_read(&mut self, role: Role, counterparties: &HashSet<Username>) -> Result<usize> {
        let me = self.me().clone();
        let changed = self.update_where(
            |c| {
                c.role == role
                    && !c.deleted
                    && c
                        .counterparty(&me)
                        .is_some_and(|other| counterparties.contains(other))
            },
            |c| std::mem::replace(&mut c.unread, false),
        )?;

        if !changed.is_empty() {
            tracing::debug!(partition = %role, count = changed.len(), "marked read");
        }
        Ok(changed.len())
    }

    /// Counterparties with at least one unread thread in `role`.
    pub fn unread_counterparties(&self, role: Role) -> BTreeSet<Username> {
        let me = self.me();
        self.partition(role)
            .filter(|c| is_unread(c, me))
            .filter_map(|c| c.counterparty(me).cloned())
            .collect()
    }
}

impl<R: ConversationRepository> Inbox<R> {
    /// Number of visible unread conversations, for the inbox badge.
    pub fn unread_count(&self) -> usize {
        let me = self.store.me();
        self.store
            .list_active()
            .into_iter()
            .filter(|c| is_unread(c, me))
            .count()
    }
}
