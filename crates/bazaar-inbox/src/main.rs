//! Prints a user's inbox as JSON.
//!
//! Usage: `bazaar-inbox <username> [buyer|seller]`

use anyhow::Context;
use bazaar_inbox::{Inbox, InboxConfig, TracingNotifier};
use bazaar_shared::{Role, Username};
use bazaar_store::Database;

fn main() -> anyhow::Result<()> {
    bazaar_inbox::init_tracing();

    let mut args = std::env::args().skip(1);
    let username = args
        .next()
        .context("usage: bazaar-inbox <username> [buyer|seller]")?;
    let me = Username::parse(&username)?;

    let mut config = InboxConfig::from_env();
    if let Some(view) = args.next() {
        config.start_view =
            Role::from_str_opt(&view).with_context(|| format!("unknown view {view:?}"))?;
    }

    let db = match &config.db_path {
        Some(path) => Database::open_at(path),
        None => Database::new(),
    }
    .context("failed to open conversation database")?;

    let inbox = Inbox::new(me, Vec::new(), db, config, TracingNotifier)?;
    tracing::info!(
        view = %inbox.view(),
        unread = inbox.unread_count(),
        "inbox loaded"
    );

    println!("{}", serde_json::to_string_pretty(&inbox.rows())?);
    Ok(())
}
