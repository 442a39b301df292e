//! v001 -- Initial schema creation.
//!
//! Creates `conversations` and `messages`.

use rusqlite::Connection;

const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Conversations
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS conversations (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    seq           INTEGER NOT NULL,           -- insertion order
    role          TEXT NOT NULL,              -- 'seller' | 'buyer'
    sender        TEXT NOT NULL,              -- username
    recipient     TEXT NOT NULL,              -- username
    product_json  TEXT,                       -- embedded product snapshot
    unread        INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    deleted       INTEGER NOT NULL DEFAULT 0, -- boolean 0/1 (soft delete)
    preview_text  TEXT NOT NULL DEFAULT '',
    preview_time  TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_conversations_seq ON conversations(seq);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    conversation_id TEXT NOT NULL,            -- FK -> conversations(id)
    position        INTEGER NOT NULL,         -- append order within the conversation
    sender          TEXT NOT NULL,
    text            TEXT NOT NULL,
    image_ref       TEXT,
    time            TEXT NOT NULL,            -- display string
    sent_at         TEXT NOT NULL,            -- RFC-3339

    PRIMARY KEY (conversation_id, position),
    FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
