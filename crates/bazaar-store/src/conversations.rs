//! [`ConversationRepository`] for the SQLite [`Database`].

use bazaar_shared::{ConversationId, Role, Username};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::messages::{insert_messages, load_messages};
use crate::models::{Conversation, Preview, ProductSnapshot};
use crate::repository::ConversationRepository;

impl ConversationRepository for Database {
    fn list(&self) -> Result<Vec<Conversation>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, role, sender, recipient, product_json, unread, deleted,
                    preview_text, preview_time
             FROM conversations
             ORDER BY seq ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ConversationRow {
                id: row.get(0)?,
                role: row.get(1)?,
                sender: row.get(2)?,
                recipient: row.get(3)?,
                product_json: row.get(4)?,
                unread: row.get(5)?,
                deleted: row.get(6)?,
                preview_text: row.get(7)?,
                preview_time: row.get(8)?,
            })
        })?;

        let mut conversations = Vec::new();
        for row in rows {
            let row = row?;
            let id = ConversationId(Uuid::parse_str(&row.id)?);
            let messages = load_messages(self.conn(), id)?;
            conversations.push(row.into_conversation(id, messages)?);
        }
        Ok(conversations)
    }

    fn create(&mut self, conversation: &Conversation) -> Result<()> {
        let tx = self.conn_mut().transaction()?;

        if exists(&tx, conversation.id)? {
            return Err(StoreError::Duplicate(conversation.id));
        }

        let seq: i64 = tx.query_row(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM conversations",
            [],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO conversations
                (id, seq, role, sender, recipient, product_json, unread, deleted,
                 preview_text, preview_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                conversation.id.0.to_string(),
                seq,
                conversation.role.as_str(),
                conversation.sender.as_str(),
                conversation.recipient.as_str(),
                product_json(conversation.product.as_ref())?,
                conversation.unread,
                conversation.deleted,
                conversation.preview.text,
                conversation.preview.time,
            ],
        )?;
        insert_messages(&tx, conversation.id, &conversation.messages)?;

        tx.commit()?;
        tracing::debug!(id = %conversation.id, "conversation created");
        Ok(())
    }

    fn update(&mut self, conversation: &Conversation) -> Result<()> {
        let tx = self.conn_mut().transaction()?;
        rewrite(&tx, conversation)?;
        tx.commit()?;
        Ok(())
    }

    fn update_all(&mut self, conversations: &[Conversation]) -> Result<()> {
        let tx = self.conn_mut().transaction()?;
        for conversation in conversations {
            rewrite(&tx, conversation)?;
        }
        tx.commit()?;
        tracing::debug!(count = conversations.len(), "conversations updated");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct ConversationRow {
    id: String,
    role: String,
    sender: String,
    recipient: String,
    product_json: Option<String>,
    unread: bool,
    deleted: bool,
    preview_text: String,
    preview_time: String,
}

impl ConversationRow {
    fn into_conversation(
        self,
        id: ConversationId,
        messages: Vec<crate::models::Message>,
    ) -> Result<Conversation> {
        let role = Role::from_str_opt(&self.role).ok_or(StoreError::InvalidRole(self.role))?;
        let product = self
            .product_json
            .map(|json| serde_json::from_str::<ProductSnapshot>(&json))
            .transpose()?;

        Ok(Conversation {
            id,
            role,
            sender: stored_username(&self.sender)?,
            recipient: stored_username(&self.recipient)?,
            product,
            messages,
            unread: self.unread,
            deleted: self.deleted,
            preview: Preview {
                text: self.preview_text,
                time: self.preview_time,
            },
        })
    }
}

/// Overwrite the row and message rows of an existing conversation.  The
/// caller owns the transaction; dropping it uncommitted rolls back.
fn rewrite(conn: &Connection, conversation: &Conversation) -> Result<()> {
    let affected = conn.execute(
        "UPDATE conversations
         SET role = ?2, sender = ?3, recipient = ?4, product_json = ?5,
             unread = ?6, deleted = ?7, preview_text = ?8, preview_time = ?9
         WHERE id = ?1",
        params![
            conversation.id.0.to_string(),
            conversation.role.as_str(),
            conversation.sender.as_str(),
            conversation.recipient.as_str(),
            product_json(conversation.product.as_ref())?,
            conversation.unread,
            conversation.deleted,
            conversation.preview.text,
            conversation.preview.time,
        ],
    )?;
    if affected == 0 {
        return Err(StoreError::NotFound(conversation.id));
    }

    conn.execute(
        "DELETE FROM messages WHERE conversation_id = ?1",
        params![conversation.id.0.to_string()],
    )?;
    insert_messages(conn, conversation.id, &conversation.messages)
}

fn exists(conn: &Connection, id: ConversationId) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM conversations WHERE id = ?1",
            params![id.0.to_string()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn product_json(product: Option<&ProductSnapshot>) -> Result<Option<String>> {
    Ok(product.map(serde_json::to_string).transpose()?)
}

pub(crate) fn stored_username(s: &str) -> Result<Username> {
    Username::parse(s).map_err(|e| StoreError::Corrupt(format!("username column: {e}")))
}
