//! In-memory view of the logged-in user's conversations.
//!
//! [`ConversationStore`] loads every conversation once from a
//! [`ConversationRepository`] and keeps them in a single list tagged by
//! [`Role`].  The seller and buyer partitions are filters over that list.
//!
//! Writes are replace-on-write: the caller edits a clone, the clone is
//! persisted, and only a successful write swaps it into memory.

use std::collections::{HashMap, HashSet};

use bazaar_shared::{ConversationId, DisplayMode, Role, UserId, Username};
use bazaar_store::{Conversation, ConversationRepository, User};

use crate::error::Result;

pub struct ConversationStore<R> {
    repo: R,
    me: Username,
    conversations: Vec<Conversation>,
    /// Live (non-deleted) conversations keyed by partition and counterparty.
    by_counterparty: HashMap<(Role, Username), ConversationId>,
    users: Vec<User>,
    view: Role,
    mode: DisplayMode,
    archived: HashSet<ConversationId>,
    blocked: HashSet<ConversationId>,
    search: Option<String>,
}

impl<R: ConversationRepository> ConversationStore<R> {
    /// Load all conversations for `me` from `repo`.
    ///
    /// Conversations that do not have `me` as exactly one participant are
    /// left in storage but never shown.
    pub fn load(repo: R, me: Username, users: Vec<User>, view: Role) -> Result<Self> {
        let mut conversations = repo.list()?;
        let total = conversations.len();
        conversations.retain(|c| {
            let ok = c.counterparty(&me).is_some();
            if !ok {
                tracing::warn!(
                    id = %c.id,
                    sender = %c.sender,
                    recipient = %c.recipient,
                    "skipping conversation not addressed to the session user"
                );
            }
            ok
        });

        let mut store = Self {
            repo,
            me,
            conversations,
            by_counterparty: HashMap::new(),
            users,
            view,
            mode: DisplayMode::Default,
            archived: HashSet::new(),
            blocked: HashSet::new(),
            search: None,
        };
        store.rebuild_index();

        tracing::info!(
            user = %store.me,
            loaded = store.conversations.len(),
            skipped = total - store.conversations.len(),
            "conversation store loaded"
        );
        Ok(store)
    }

    fn rebuild_index(&mut self) {
        self.by_counterparty.clear();
        for conv in &self.conversations {
            if conv.deleted {
                continue;
            }
            let Some(other) = conv.counterparty(&self.me) else {
                continue;
            };
            let key = (conv.role, other.clone());
            if self.by_counterparty.contains_key(&key) {
                tracing::warn!(id = %conv.id, counterparty = %other, "duplicate thread in partition");
                continue;
            }
            self.by_counterparty.insert(key, conv.id);
        }
    }

    // ------------------------------------------------------------------
    // View state
    // ------------------------------------------------------------------

    pub fn me(&self) -> &Username {
        &self.me
    }

    pub fn view(&self) -> Role {
        self.view
    }

    /// Switch the visible partition.  Data is untouched.
    pub fn set_view(&mut self, view: Role) {
        self.view = view;
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Filter the visible list by a case-insensitive query.  Blank clears it.
    pub fn set_search(&mut self, query: &str) {
        let query = query.trim();
        self.search = if query.is_empty() {
            None
        } else {
            Some(query.to_lowercase())
        };
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// The visible conversations: active partition, not deleted, matching
    /// the display mode and search query.  Storage order is kept.
    pub fn list_active(&self) -> Vec<&Conversation> {
        self.conversations
            .iter()
            .filter(|c| c.role == self.view && !c.deleted)
            .filter(|c| match self.mode {
                DisplayMode::Default => {
                    !self.archived.contains(&c.id) && !self.blocked.contains(&c.id)
                }
                DisplayMode::Archived => self.archived.contains(&c.id),
                DisplayMode::Blocked => self.blocked.contains(&c.id),
            })
            .filter(|c| self.matches_search(*c))
            .collect()
    }

    fn matches_search(&self, conv: &Conversation) -> bool {
        let Some(query) = self.search.as_deref() else {
            return true;
        };
        let Some(other) = conv.counterparty(&self.me) else {
            return false;
        };
        if other.as_str().to_lowercase().contains(query) {
            return true;
        }
        if let Some(user) = self.user_by_name(other) {
            if user.full_name().to_lowercase().contains(query) {
                return true;
            }
        }
        conv.product
            .as_ref()
            .is_some_and(|p| p.name.to_lowercase().contains(query))
    }

    /// Live conversations of one partition, regardless of display mode.
    pub fn partition(&self, role: Role) -> impl Iterator<Item = &Conversation> + '_ {
        self.conversations
            .iter()
            .filter(move |c| c.role == role && !c.deleted)
    }

    /// Every conversation held in memory, deleted ones included.
    pub fn all(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// The live thread with `username` in the active partition.
    pub fn find_by_counterparty(&self, username: &Username) -> Option<&Conversation> {
        self.find_in(self.view, username)
    }

    pub fn find_in(&self, role: Role, username: &Username) -> Option<&Conversation> {
        let id = self.by_counterparty.get(&(role, username.clone()))?;
        self.get(*id)
    }

    pub fn counterparty_of<'a>(&'a self, conv: &'a Conversation) -> Option<&'a Username> {
        conv.counterparty(&self.me)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user_by_id(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_name(&self, username: &Username) -> Option<&User> {
        self.users.iter().find(|u| &u.username == username)
    }

    pub fn is_archived(&self, id: ConversationId) -> bool {
        self.archived.contains(&id)
    }

    pub fn is_blocked(&self, id: ConversationId) -> bool {
        self.blocked.contains(&id)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Persist a new conversation and add it to memory.
    pub fn insert(&mut self, conv: Conversation) -> Result<()> {
        self.repo.create(&conv)?;
        self.conversations.push(conv);
        self.rebuild_index();
        Ok(())
    }

    /// Persist an edited copy of an existing conversation, then swap it in.
    pub fn replace(&mut self, updated: Conversation) -> Result<()> {
        self.repo.update(&updated)?;
        if let Some(slot) = self.conversations.iter_mut().find(|c| c.id == updated.id) {
            *slot = updated;
        }
        self.rebuild_index();
        Ok(())
    }

    /// Clone every conversation matching `select`, apply `edit`, and persist
    /// those for which `edit` returned `true` as one batch.  Returns the
    /// replaced ids.
    ///
    /// Memory is only touched once the whole batch is stored, so a failure
    /// leaves every conversation as it was.
    pub fn update_where(
        &mut self,
        select: impl Fn(&Conversation) -> bool,
        mut edit: impl FnMut(&mut Conversation) -> bool,
    ) -> Result<Vec<ConversationId>> {
        let staged: Vec<Conversation> = self
            .conversations
            .iter()
            .filter(|c| select(*c))
            .filter_map(|c| {
                let mut copy = c.clone();
                edit(&mut copy).then_some(copy)
            })
            .collect();
        if staged.is_empty() {
            return Ok(Vec::new());
        }

        self.repo.update_all(&staged)?;

        let ids: Vec<ConversationId> = staged.iter().map(|c| c.id).collect();
        for updated in staged {
            if let Some(slot) = self.conversations.iter_mut().find(|c| c.id == updated.id) {
                *slot = updated;
            }
        }
        self.rebuild_index();
        Ok(ids)
    }

    /// Move ids into the archived set (and out of blocked).
    pub fn archive(&mut self, ids: &[ConversationId]) {
        for id in ids {
            self.blocked.remove(id);
            self.archived.insert(*id);
        }
    }

    /// Move ids into the blocked set (and out of archived).
    pub fn block(&mut self, ids: &[ConversationId]) {
        for id in ids {
            self.archived.remove(id);
            self.blocked.insert(*id);
        }
    }

    /// Return ids to the default view.
    pub fn restore(&mut self, ids: &[ConversationId]) {
        for id in ids {
            self.archived.remove(id);
            self.blocked.remove(id);
        }
    }
}
