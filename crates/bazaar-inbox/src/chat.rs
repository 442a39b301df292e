//! Opening threads, sending messages and switching between the buyer and
//! seller views.

use std::collections::HashSet;

use bazaar_shared::constants::IMAGE_PREVIEW_TEXT;
use bazaar_shared::error::validate_message_text;
use bazaar_shared::{ConversationId, Role, UserId, Username};
use bazaar_store::{Conversation, ConversationRepository, Message, ProductSnapshot};
use chrono::{Local, Utc};

use crate::attachment::{EncodedImage, ImageFile, ImageTarget, PendingImage};
use crate::error::{InboxError, Result};
use crate::notice::Notice;
use crate::state::Inbox;

impl<R: ConversationRepository> Inbox<R> {
    /// Open the thread with a user from the list and mark it read.
    pub fn open_conversation(&mut self, user_id: UserId) -> Result<()> {
        let username = self
            .store
            .user_by_id(user_id)
            .map(|u| u.username.clone())
            .ok_or(InboxError::UnknownUser)?;
        self.open_counterparty(username)
    }

    /// Open the thread with `username` in the active partition, whether or
    /// not a conversation exists yet.
    pub fn open_counterparty(&mut self, username: Username) -> Result<()> {
        if self.open.as_ref() != Some(&username) {
            self.pending_product = None;
        }
        self.open_menu = None;

        let view = self.store.view();
        let targets: HashSet<Username> = [username.clone()].into_iter().collect();
        self.store
            .mark_read(view, &targets)
            .map_err(|e| self.write_failed(e, "Could not open conversation"))?;

        tracing::debug!(counterparty = %username, partition = %view, "conversation opened");
        self.open = Some(username);
        Ok(())
    }

    /// Entry point from a listing page: chat with its seller about `product`.
    /// Lands in the buyer view.
    pub fn start_chat(&mut self, seller: Username, product: Option<ProductSnapshot>) -> Result<()> {
        if self.store.view() != Role::AsBuyer {
            self.toggle_view();
        }
        let has_thread = self.store.find_by_counterparty(&seller).is_some();
        self.open_counterparty(seller)?;
        if !has_thread {
            self.pending_product = product;
        }
        Ok(())
    }

    pub fn close_conversation(&mut self) {
        self.open = None;
        self.pending_product = None;
    }

    pub fn open_username(&self) -> Option<&Username> {
        self.open.as_ref()
    }

    /// The open thread's conversation record, if one exists yet.
    pub fn open_thread(&self) -> Option<&Conversation> {
        self.open
            .as_ref()
            .and_then(|name| self.store.find_by_counterparty(name))
    }

    /// Messages of the open thread: every live conversation in the active
    /// partition involving the open counterparty, in storage order.
    pub fn thread_messages(&self) -> Vec<&Message> {
        let Some(open) = self.open.as_ref() else {
            return Vec::new();
        };
        self.store
            .partition(self.store.view())
            .filter(|c| c.involves(open))
            .flat_map(|c| c.messages.iter())
            .collect()
    }

    /// Append a text message to the open thread, creating the thread if
    /// needed.  Blank input is rejected without touching any state.
    pub fn send_text(&mut self, text: &str) -> Result<ConversationId> {
        let text = match validate_message_text(text, self.config.max_message_len) {
            Ok(text) => text.to_string(),
            Err(e) => {
                self.notify(Notice::error(e.to_string()));
                return Err(e.into());
            }
        };
        let counterparty = self.require_open()?;
        let view = self.store.view();

        let message = self.new_message(text.clone(), None);
        let id = self.append(view, counterparty.clone(), message, text)?;

        tracing::info!(conversation = %id, to = %counterparty, partition = %view, "message sent");
        Ok(id)
    }

    /// Start encoding `file` for the open thread.  Returns immediately; the
    /// caller awaits the returned handle and passes the result to
    /// [`finish_image`](Self::finish_image).
    pub fn send_image(&mut self, file: ImageFile) -> Result<PendingImage> {
        let counterparty = self.require_open()?;

        let size = file.bytes.len();
        if size > self.config.max_image_bytes {
            let err = InboxError::ImageTooLarge {
                size,
                max: self.config.max_image_bytes,
            };
            self.notify(Notice::error(err.to_string()));
            return Err(err);
        }

        let view = self.store.view();
        let target = ImageTarget {
            role: view,
            conversation: self.store.find_in(view, &counterparty).map(|c| c.id),
            counterparty,
        };
        tracing::debug!(file = %file.name, size, to = %target.counterparty, "encoding image");
        PendingImage::spawn(target, file)
    }

    /// Apply a finished encode to the thread captured when it started.
    ///
    /// Nothing is appended when encoding failed or when that thread has
    /// since been deleted or blocked.
    pub fn finish_image(&mut self, encoded: EncodedImage) -> Result<ConversationId> {
        let EncodedImage {
            target,
            file_name,
            result,
        } = encoded;

        let data_url = match result {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "image encoding failed");
                self.notify(Notice::error("Could not send image"));
                return Err(e);
            }
        };

        if let Some(id) = target.conversation {
            let live = self.store.get(id).is_some_and(|c| !c.deleted);
            if !live || self.store.is_blocked(id) {
                tracing::warn!(conversation = %id, "image target gone, dropping image");
                self.notify(Notice::error("Conversation is no longer available"));
                return Err(InboxError::StaleTarget);
            }
        }

        let message = self.new_message(String::new(), Some(data_url));
        let id = self.append(
            target.role,
            target.counterparty.clone(),
            message,
            IMAGE_PREVIEW_TEXT,
        )?;

        tracing::info!(conversation = %id, file = %file_name, "image sent");
        Ok(id)
    }

    /// Flip between the seller and buyer partitions.  Selection and menus
    /// reset; the open thread survives only if it exists in the new view.
    pub fn toggle_view(&mut self) -> Role {
        let next = self.store.view().other();
        self.store.set_view(next);
        self.selection.clear();
        self.open_menu = None;

        let keep = self
            .open
            .as_ref()
            .is_some_and(|name| self.store.find_in(next, name).is_some());
        if !keep {
            self.open = None;
            self.pending_product = None;
        }

        tracing::debug!(partition = %next, "view switched");
        next
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn require_open(&self) -> Result<Username> {
        match self.open.clone() {
            Some(name) => Ok(name),
            None => {
                self.notify(Notice::error("Pick a conversation first"));
                Err(InboxError::NoOpenConversation)
            }
        }
    }

    fn new_message(&self, text: String, image_ref: Option<String>) -> Message {
        let sent_at = Utc::now();
        Message {
            sender: self.store.me().clone(),
            text,
            image_ref,
            time: sent_at
                .with_timezone(&Local)
                .format(&self.config.time_format)
                .to_string(),
            sent_at,
        }
    }

    /// Find-or-create the thread with `counterparty` in `role` and append.
    /// Every failure has been reported to the user by the time it returns.
    fn append(
        &mut self,
        role: Role,
        counterparty: Username,
        message: Message,
        preview: impl Into<String>,
    ) -> Result<ConversationId> {
        if let Some(existing) = self.store.find_in(role, &counterparty) {
            if self.store.is_blocked(existing.id) {
                self.notify(Notice::error("This user is blocked"));
                return Err(InboxError::Blocked);
            }
            let mut updated = existing.clone();
            updated.push_message(message, preview);
            let id = updated.id;
            self.store
                .replace(updated)
                .map_err(|e| self.write_failed(e, "Message not sent"))?;
            return Ok(id);
        }

        let for_open_thread =
            self.open.as_ref() == Some(&counterparty) && self.store.view() == role;
        let product = if for_open_thread {
            self.pending_product.clone()
        } else {
            None
        };
        let mut conv = Conversation::open(role, self.store.me().clone(), counterparty, product);
        conv.push_message(message, preview);
        let id = conv.id;
        self.store
            .insert(conv)
            .map_err(|e| self.write_failed(e, "Message not sent"))?;
        if for_open_thread {
            self.pending_product = None;
        }
        tracing::debug!(conversation = %id, partition = %role, "conversation created");
        Ok(id)
    }
}
