mod common;

use bazaar_inbox::{ImageFile, Inbox, InboxConfig, InboxError, NoticeKind, NoticeQueue};
use bazaar_shared::constants::IMAGE_PREVIEW_TEXT;
use bazaar_shared::{ProductStatus, Role};
use bazaar_store::{ConversationRepository, Database};

use common::{fixture, fixture_with, lamp, name, seed};

const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

#[test]
fn first_send_creates_one_thread_then_appends() {
    let mut f = fixture();
    f.inbox.open_conversation(f.user_id("bob")).unwrap();
    assert!(f.inbox.open_thread().is_none(), "no buyer thread with bob yet");

    let first = f.inbox.send_text("Hi Bob, is the bookshelf solid oak?").unwrap();
    let thread = f.inbox.open_thread().unwrap();
    assert_eq!(thread.id, first);
    assert_eq!(thread.messages.len(), 1);
    assert_eq!(thread.sender, name("alice"));
    assert_eq!(thread.recipient, name("bob"));
    assert_eq!(thread.role, Role::AsBuyer);

    let second = f.inbox.send_text("  Also, can you deliver?  ").unwrap();
    assert_eq!(first, second);
    let thread = f.inbox.open_thread().unwrap();
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(thread.messages[1].text, "Also, can you deliver?");
    assert_eq!(thread.preview.text, "Also, can you deliver?");
    assert!(!thread.unread);

    let bob_threads = f
        .inbox
        .store()
        .partition(Role::AsBuyer)
        .filter(|c| c.involves(&name("bob")))
        .count();
    assert_eq!(bob_threads, 1);
}

#[test]
fn sending_keeps_thread_caught_up() {
    let mut f = fixture();
    f.inbox.open_conversation(f.user_id("rucas")).unwrap();
    f.inbox.send_text("Is the lamp still available?").unwrap();

    let thread = f.inbox.open_thread().unwrap();
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(&thread.last_message().unwrap().sender, f.inbox.me());
    assert_eq!(f.inbox.unread_count(), 0);
}

#[test]
fn blank_text_is_a_noop() {
    let mut f = fixture();
    f.inbox.open_conversation(f.user_id("rucas")).unwrap();
    let before = f.inbox.store().all().to_vec();

    assert!(matches!(f.inbox.send_text("   \n"), Err(InboxError::Validation(_))));
    assert_eq!(f.inbox.store().all(), before.as_slice());
    assert_eq!(f.notices.drain()[0].kind, NoticeKind::Error);
}

#[test]
fn send_without_open_thread_fails() {
    let mut f = fixture();
    assert!(matches!(
        f.inbox.send_text("hello?"),
        Err(InboxError::NoOpenConversation)
    ));
}

#[test]
fn overlong_text_is_rejected() {
    let config = InboxConfig {
        max_message_len: 5,
        ..InboxConfig::default()
    };
    let mut f = fixture_with(seed(), config);
    f.inbox.open_conversation(f.user_id("rucas")).unwrap();
    assert!(f.inbox.send_text("too long for five").is_err());
    assert_eq!(f.inbox.open_thread().unwrap().messages.len(), 1);
}

#[test]
fn start_chat_attaches_product_to_new_thread() {
    let mut f = fixture();
    f.inbox.toggle_view();
    f.inbox.start_chat(name("bob"), Some(lamp())).unwrap();
    assert_eq!(f.inbox.view(), Role::AsBuyer);
    assert_eq!(f.inbox.open_username(), Some(&name("bob")));

    f.inbox.send_text("Interested in the lamp").unwrap();
    let thread = f.inbox.open_thread().unwrap();
    assert_eq!(thread.product.as_ref().unwrap().name, "Brass desk lamp");
}

#[test]
fn sending_to_blocked_user_is_refused() {
    let mut f = fixture();
    f.inbox.toggle_select(f.user_id("rucas"));
    f.inbox.block_selected().unwrap();
    f.inbox.open_conversation(f.user_id("rucas")).unwrap();

    assert!(matches!(f.inbox.send_text("hello"), Err(InboxError::Blocked)));
}

#[tokio::test]
async fn image_send_appends_with_placeholder_preview() {
    let mut f = fixture();
    f.inbox.open_conversation(f.user_id("rucas")).unwrap();

    let pending = f
        .inbox
        .send_image(ImageFile::new("lamp.png", PNG.to_vec()))
        .unwrap();
    let encoded = pending.wait().await;
    let id = f.inbox.finish_image(encoded).unwrap();

    let thread = f.inbox.store().get(id).unwrap();
    let last = thread.last_message().unwrap();
    assert!(last.text.is_empty());
    assert!(last
        .image_ref
        .as_deref()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert_eq!(thread.preview.text, IMAGE_PREVIEW_TEXT);
}

#[tokio::test]
async fn image_lands_in_captured_thread_after_switching() {
    let mut f = fixture();
    f.inbox.open_conversation(f.user_id("rucas")).unwrap();
    let pending = f
        .inbox
        .send_image(ImageFile::new("lamp.png", PNG.to_vec()))
        .unwrap();

    f.inbox.open_conversation(f.user_id("carol")).unwrap();
    let id = f.inbox.finish_image(pending.wait().await).unwrap();

    let rucas = f.inbox.store().find_in(Role::AsBuyer, &name("rucas")).unwrap();
    assert_eq!(rucas.id, id);
    assert_eq!(rucas.messages.len(), 2);
    assert_eq!(f.inbox.open_thread().unwrap().messages.len(), 2, "carol untouched");
}

#[tokio::test]
async fn image_for_deleted_thread_is_dropped() {
    let mut f = fixture();
    f.inbox.open_conversation(f.user_id("rucas")).unwrap();
    let pending = f
        .inbox
        .send_image(ImageFile::new("lamp.png", PNG.to_vec()))
        .unwrap();

    f.inbox.toggle_select(f.user_id("rucas"));
    f.inbox.bulk_delete().unwrap();
    let before = f.inbox.store().all().to_vec();

    assert!(matches!(
        f.inbox.finish_image(pending.wait().await),
        Err(InboxError::StaleTarget)
    ));
    assert_eq!(f.inbox.store().all(), before.as_slice());
}

#[tokio::test]
async fn unreadable_image_leaves_thread_unchanged() {
    let mut f = fixture();
    f.inbox.open_conversation(f.user_id("rucas")).unwrap();
    f.notices.drain();

    let pending = f
        .inbox
        .send_image(ImageFile::new("notes.txt", b"plain text".to_vec()))
        .unwrap();
    assert!(matches!(
        f.inbox.finish_image(pending.wait().await),
        Err(InboxError::ImageEncoding(_))
    ));
    assert_eq!(f.inbox.open_thread().unwrap().messages.len(), 1);
    assert_eq!(f.notices.drain()[0].kind, NoticeKind::Error);
}

#[tokio::test]
async fn oversized_image_is_rejected_up_front() {
    let config = InboxConfig {
        max_image_bytes: 8,
        ..InboxConfig::default()
    };
    let mut f = fixture_with(seed(), config);
    f.inbox.open_conversation(f.user_id("rucas")).unwrap();
    assert!(matches!(
        f.inbox.send_image(ImageFile::new("lamp.png", PNG.to_vec())),
        Err(InboxError::ImageTooLarge { size: 16, max: 8 })
    ));
}

#[test]
fn mark_as_sold_only_from_seller_view() {
    let mut f = fixture();
    f.inbox.open_conversation(f.user_id("rucas")).unwrap();
    assert!(!f.inbox.can_mark_as_sold());
    assert!(!f.inbox.mark_as_sold(None).unwrap());
    assert_eq!(
        f.inbox.open_thread().unwrap().product.as_ref().unwrap().status,
        ProductStatus::Available
    );
}

#[test]
fn mark_as_sold_is_idempotent() {
    let mut f = fixture();
    f.inbox.toggle_view();
    f.inbox.open_conversation(f.user_id("bob")).unwrap();
    f.notices.drain();
    assert!(f.inbox.can_mark_as_sold());

    assert!(f.inbox.mark_as_sold(None).unwrap());
    assert!(!f.inbox.can_mark_as_sold());
    assert!(!f.inbox.mark_as_sold(None).unwrap());

    let product = f.inbox.open_thread().unwrap().product.clone().unwrap();
    assert_eq!(product.status, ProductStatus::Sold);
    assert!(product.marked_as_sold_to.is_none());

    let notices = f.notices.drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Success);
}

#[test]
fn mark_as_sold_records_named_buyer() {
    let mut f = fixture();
    f.inbox.toggle_view();
    f.inbox.open_conversation(f.user_id("bob")).unwrap();
    f.inbox.mark_as_sold(Some(name("bob"))).unwrap();

    let product = f.inbox.open_thread().unwrap().product.clone().unwrap();
    assert_eq!(product.marked_as_sold_to, Some(name("bob")));
}

#[test]
fn review_requires_purchase_by_session_user() {
    let mut f = fixture();
    f.inbox.open_conversation(f.user_id("rucas")).unwrap();
    assert!(!f.inbox.can_review(), "lamp not sold");
    assert_eq!(f.inbox.submit_review(5, "great").unwrap(), None);

    f.inbox.open_conversation(f.user_id("carol")).unwrap();
    assert!(f.inbox.can_review());

    assert!(matches!(
        f.inbox.submit_review(0, "hmm"),
        Err(InboxError::InvalidRating(0))
    ));
    assert!(f.inbox.can_review(), "invalid rating does not consume the review");

    let draft = f.inbox.submit_review(5, " Smooth handover ").unwrap().unwrap();
    assert_eq!(draft.seller, name("carol"));
    assert_eq!(draft.reviewer, name("alice"));
    assert_eq!(draft.product_name, "Road bike");
    assert_eq!(draft.comment, "Smooth handover");

    assert!(f.inbox.has_reviewed());
    assert!(!f.inbox.can_review());
    assert_eq!(f.inbox.submit_review(4, "again").unwrap(), None);
}

#[test]
fn review_not_offered_in_seller_view() {
    let mut f = fixture();
    f.inbox.open_conversation(f.user_id("carol")).unwrap();
    f.inbox.toggle_view();
    assert!(!f.inbox.can_review());
}

#[test]
fn inbox_over_sqlite_persists_sends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inbox.db");
    let users = common::users();
    let bob_id = users.iter().find(|u| u.username == "bob").unwrap().id;

    {
        let mut db = Database::open_at(&path).unwrap();
        for conv in seed() {
            db.create(&conv).unwrap();
        }
        let mut inbox = Inbox::new(
            name("alice"),
            users.clone(),
            db,
            InboxConfig::default(),
            NoticeQueue::new(),
        )
        .unwrap();
        inbox.toggle_view();
        inbox.open_conversation(bob_id).unwrap();
        inbox.send_text("70 works for me").unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let stored = db.list().unwrap();
    let bob = stored
        .iter()
        .find(|c| c.role == Role::AsSeller && c.involves(&name("bob")))
        .unwrap();
    assert_eq!(bob.messages.len(), 2);
    assert_eq!(bob.messages[1].text, "70 works for me");
    assert!(!bob.unread, "opening the thread marked it read");
}

#[test]
fn folders_are_kept_for_the_session_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inbox.db");
    let users = common::users();
    let carol_id = users.iter().find(|u| u.username == "carol").unwrap().id;
    let open = |users: Vec<bazaar_store::User>| {
        Inbox::new(
            name("alice"),
            users,
            Database::open_at(&path).unwrap(),
            InboxConfig::default(),
            NoticeQueue::new(),
        )
        .unwrap()
    };

    {
        let mut db = Database::open_at(&path).unwrap();
        for conv in seed() {
            db.create(&conv).unwrap();
        }
    }
    {
        let mut inbox = open(users.clone());
        inbox.toggle_select(carol_id);
        inbox.block_selected().unwrap();
        assert_eq!(inbox.rows().len(), 1);
    }

    let inbox = open(users);
    let rows = inbox.rows();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| !r.blocked));
}
