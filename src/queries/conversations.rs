use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::conversations::{ConversationMessage, NewConversationMessage},
};
use uuid::Uuid;

/// Appends one message to a lead's conversation log.
pub async fn log_message(
    conn: &mut DbConn,
    message: NewConversationMessage,
) -> Result<ConversationMessage> {
    let logged = sqlx::query_as::<_, ConversationMessage>(
        r#"
        INSERT INTO conversation_messages (lead_id, direction, content, external_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, lead_id, direction, content, external_id, sent_at
        "#,
    )
    .bind(message.lead_id)
    .bind(message.direction)
    .bind(&message.content)
    .bind(&message.external_id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(logged)
}

/// The most recent `limit` messages for a lead, oldest first.
pub async fn get_history(
    conn: &mut DbConn,
    lead_id: Uuid,
    limit: i64,
) -> Result<Vec<ConversationMessage>> {
    let history = sqlx::query_as::<_, ConversationMessage>(
        r#"
        SELECT id, lead_id, direction, content, external_id, sent_at
        FROM (
            SELECT id, lead_id, direction, content, external_id, sent_at
            FROM conversation_messages
            WHERE lead_id = $1
            ORDER BY sent_at DESC
            LIMIT $2
        ) recent
        ORDER BY sent_at ASC
        "#,
    )
    .bind(lead_id)
    .bind(limit)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(history)
}
