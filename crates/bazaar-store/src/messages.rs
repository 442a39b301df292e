use bazaar_shared::ConversationId;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::conversations::stored_username;
use crate::error::Result;
use crate::models::Message;

pub(crate) fn insert_messages(
    conn: &Connection,
    conversation_id: ConversationId,
    messages: &[Message],
) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO messages (conversation_id, position, sender, text, image_ref, time, sent_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    for (position, message) in messages.iter().enumerate() {
        stmt.execute(params![
            conversation_id.0.to_string(),
            position as i64,
            message.sender.as_str(),
            message.text,
            message.image_ref,
            message.time,
            message.sent_at.to_rfc3339(),
        ])?;
    }
    Ok(())
}

pub(crate) fn load_messages(
    conn: &Connection,
    conversation_id: ConversationId,
) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(
        "SELECT sender, text, image_ref, time, sent_at
         FROM messages
         WHERE conversation_id = ?1
         ORDER BY position ASC",
    )?;

    let rows = stmt.query_map(params![conversation_id.0.to_string()], |row| {
        let sender: String = row.get(0)?;
        let text: String = row.get(1)?;
        let image_ref: Option<String> = row.get(2)?;
        let time: String = row.get(3)?;
        let sent_at: String = row.get(4)?;
        Ok((sender, text, image_ref, time, sent_at))
    })?;

    let mut messages = Vec::new();
    for row in rows {
        let (sender, text, image_ref, time, sent_at) = row?;
        let sent_at: DateTime<Utc> =
            DateTime::parse_from_rfc3339(&sent_at)?.with_timezone(&Utc);
        messages.push(Message {
            sender: stored_username(&sender)?,
            text,
            image_ref,
            time,
            sent_at,
        });
    }
    Ok(messages)
}
