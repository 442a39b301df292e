//! The SQLite file that holds the inbox.
//!
//! Every constructor brings the schema up to date before handing out a
//! [`Database`], so repository code can assume the current tables exist.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;

/// Conversation storage backed by one SQLite connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// The inbox database for this machine, `bazaar.db` under the user's
    /// data directory (`~/.local/share/bazaar` on Linux).  Used when
    /// `BAZAAR_DB_PATH` is not set.
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "bazaar", "bazaar").ok_or(StoreError::NoDataDir)?;
        let path = dirs.data_dir().join("bazaar.db");
        tracing::info!(path = %path.display(), "opening inbox database");
        Self::open_at(&path)
    }

    /// Open `path`, creating the file and its parent directories on first
    /// use.  File-backed stores run in WAL mode.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Open a private in-memory database.  Nothing survives the handle.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Needed to open transactions.
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Backing file, `None` for in-memory stores.
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}
