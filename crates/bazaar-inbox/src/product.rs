//! Listing actions reachable from the open thread: marking a product sold
//! (seller side) and reviewing a purchase (buyer side).
//!
//! Both are gated by role and product status.  The `can_*` predicates drive
//! whether the UI shows the control; the actions re-check and quietly do
//! nothing when the gate is closed.

use bazaar_shared::constants::{MAX_RATING, MIN_RATING};
use bazaar_shared::{ProductStatus, Role, Username};
use bazaar_store::ConversationRepository;
use serde::Serialize;

use crate::error::{InboxError, Result};
use crate::notice::Notice;
use crate::state::Inbox;

/// A review ready to be posted to the marketplace backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub reviewer: Username,
    pub seller: Username,
    pub product_name: String,
    pub rating: u8,
    pub comment: String,
}

impl<R: ConversationRepository> Inbox<R> {
    /// Seller view, open thread about a product that is still available.
    pub fn can_mark_as_sold(&self) -> bool {
        self.store.view() == Role::AsSeller
            && self
                .open_thread()
                .and_then(|c| c.product.as_ref())
                .is_some_and(|p| p.status == ProductStatus::Available)
    }

    /// Mark the open thread's product as sold.
    ///
    /// `buyer` is recorded as `marked_as_sold_to` when given; without it the
    /// field stays unset and the buyer cannot leave a review from this sale.
    /// Returns `Ok(false)` when the action is not available.
    pub fn mark_as_sold(&mut self, buyer: Option<Username>) -> Result<bool> {
        if !self.can_mark_as_sold() {
            tracing::debug!(partition = %self.store.view(), "mark as sold not available");
            return Ok(false);
        }
        let Some(mut updated) = self.open_thread().cloned() else {
            return Ok(false);
        };
        let Some(product) = updated.product.as_mut() else {
            return Ok(false);
        };
        product.status = ProductStatus::Sold;
        if buyer.is_some() {
            product.marked_as_sold_to = buyer;
        }
        let product_name = product.name.clone();
        let id = updated.id;

        self.store
            .replace(updated)
            .map_err(|e| self.write_failed(e, "Could not mark product as sold"))?;

        tracing::info!(conversation = %id, product = %product_name, "product marked as sold");
        self.notify(Notice::success("Product marked as sold"));
        Ok(true)
    }

    /// Buyer view, product sold to the session user, no review yet this
    /// session.
    pub fn can_review(&self) -> bool {
        if self.has_reviewed || self.store.view() != Role::AsBuyer {
            return false;
        }
        let me = self.store.me();
        self.open_thread()
            .and_then(|c| c.product.as_ref())
            .is_some_and(|p| p.is_sold() && p.marked_as_sold_to.as_ref() == Some(me))
    }

    pub fn has_reviewed(&self) -> bool {
        self.has_reviewed
    }

    /// Build a review of the open thread's seller.  Returns `Ok(None)` when
    /// reviewing is not available.
    pub fn submit_review(&mut self, rating: u8, comment: &str) -> Result<Option<ReviewDraft>> {
        if !self.can_review() {
            tracing::debug!("review not available");
            return Ok(None);
        }
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            self.notify(Notice::error("Pick a rating from 1 to 5 stars"));
            return Err(InboxError::InvalidRating(rating));
        }

        let Some(conv) = self.open_thread() else {
            return Ok(None);
        };
        let Some(seller) = self.store.counterparty_of(conv).cloned() else {
            return Ok(None);
        };
        let draft = ReviewDraft {
            reviewer: self.store.me().clone(),
            seller,
            product_name: conv
                .product
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            rating,
            comment: comment.trim().to_string(),
        };

        self.has_reviewed = true;
        tracing::info!(seller = %draft.seller, rating, "review submitted");
        self.notify(Notice::success("Review submitted"));
        Ok(Some(draft))
    }
}
