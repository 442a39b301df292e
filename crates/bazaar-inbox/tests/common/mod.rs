//! Seed data shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bazaar_inbox::{Inbox, InboxConfig, NoticeQueue};
use bazaar_shared::{ProductStatus, Role, UserId, Username};
use bazaar_store::{
    Conversation, ConversationRepository, MemoryRepository, Message, ProductSnapshot, StoreError,
    User,
};
use chrono::Utc;

pub fn name(s: &str) -> Username {
    Username::parse(s).unwrap()
}

pub fn user(username: &str, first: &str, last: &str) -> User {
    User {
        id: UserId::new(),
        username: name(username),
        first_name: first.into(),
        last_name: last.into(),
        rating: 4.5,
        location: "Lisbon".into(),
        num_products: 3,
    }
}

pub fn message(sender: &str, text: &str) -> Message {
    Message {
        sender: name(sender),
        text: text.into(),
        image_ref: None,
        time: "10:00 AM".into(),
        sent_at: Utc::now(),
    }
}

pub fn thread(
    role: Role,
    sender: &str,
    recipient: &str,
    product: Option<ProductSnapshot>,
    messages: &[(&str, &str)],
    unread: bool,
) -> Conversation {
    let mut conv = Conversation::open(role, name(sender), name(recipient), product);
    for (from, text) in messages {
        conv.push_message(message(from, text), *text);
    }
    conv.unread = unread;
    conv
}

pub fn lamp() -> ProductSnapshot {
    ProductSnapshot::available("Brass desk lamp", 25.0)
}

pub fn bike() -> ProductSnapshot {
    ProductSnapshot {
        name: "Road bike".into(),
        price: 320.0,
        image_ref: Some("https://img.example/bike.jpg".into()),
        status: ProductStatus::Sold,
        marked_as_sold_to: Some(name("alice")),
    }
}

/// Memory-backed repository whose writes start failing once `failing` is
/// set.  Reads always succeed.
pub struct FlakyRepository {
    inner: MemoryRepository,
    failing: Arc<AtomicBool>,
}

impl FlakyRepository {
    pub fn new(conversations: Vec<Conversation>) -> (Self, Arc<AtomicBool>) {
        let failing = Arc::new(AtomicBool::new(false));
        let repo = Self {
            inner: MemoryRepository::seeded(conversations),
            failing: failing.clone(),
        };
        (repo, failing)
    }

    fn check(&self) -> bazaar_store::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        } else {
            Ok(())
        }
    }
}

impl ConversationRepository for FlakyRepository {
    fn list(&self) -> bazaar_store::Result<Vec<Conversation>> {
        self.inner.list()
    }

    fn create(&mut self, conversation: &Conversation) -> bazaar_store::Result<()> {
        self.check()?;
        self.inner.create(conversation)
    }

    fn update(&mut self, conversation: &Conversation) -> bazaar_store::Result<()> {
        self.check()?;
        self.inner.update(conversation)
    }

    fn update_all(&mut self, conversations: &[Conversation]) -> bazaar_store::Result<()> {
        self.check()?;
        self.inner.update_all(conversations)
    }
}

pub struct Fixture<R = MemoryRepository> {
    pub inbox: Inbox<R>,
    pub notices: NoticeQueue,
    pub users: Vec<User>,
}

impl<R> Fixture<R> {
    pub fn user_id(&self, username: &str) -> UserId {
        self.users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.id)
            .unwrap()
    }
}

pub fn users() -> Vec<User> {
    vec![
        user("alice", "Alice", "Moreau"),
        user("rucas", "Lucas", "Ribeiro"),
        user("bob", "Bob", "Stone"),
        user("carol", "Carol", "Diaz"),
    ]
}

/// alice's inbox: two buyer-side threads, two seller-side threads.
pub fn seed() -> Vec<Conversation> {
    vec![
        thread(
            Role::AsBuyer,
            "rucas",
            "alice",
            Some(lamp()),
            &[("rucas", "hi")],
            true,
        ),
        thread(
            Role::AsBuyer,
            "alice",
            "carol",
            Some(bike()),
            &[("alice", "Thanks, picked it up!"), ("carol", "Enjoy the ride")],
            false,
        ),
        thread(
            Role::AsSeller,
            "bob",
            "alice",
            Some(ProductSnapshot::available("Oak bookshelf", 80.0)),
            &[("bob", "Would you take 70?")],
            true,
        ),
        thread(
            Role::AsSeller,
            "rucas",
            "alice",
            Some(ProductSnapshot::available("Vinyl records", 15.0)),
            &[("rucas", "Still have the Bowie ones?"), ("alice", "Yes!")],
            true,
        ),
    ]
}

pub fn fixture_on<R: ConversationRepository>(repo: R, config: InboxConfig) -> Fixture<R> {
    let notices = NoticeQueue::new();
    let users = users();
    let inbox = Inbox::new(name("alice"), users.clone(), repo, config, notices.clone()).unwrap();
    Fixture {
        inbox,
        notices,
        users,
    }
}

pub fn fixture_with(conversations: Vec<Conversation>, config: InboxConfig) -> Fixture {
    fixture_on(MemoryRepository::seeded(conversations), config)
}

pub fn fixture() -> Fixture {
    fixture_with(seed(), InboxConfig::default())
}

/// The seeded inbox over a [`FlakyRepository`], with the switch that breaks
/// its writes.
pub fn flaky_fixture() -> (Fixture<FlakyRepository>, Arc<AtomicBool>) {
    let (repo, failing) = FlakyRepository::new(seed());
    (fixture_on(repo, InboxConfig::default()), failing)
}
