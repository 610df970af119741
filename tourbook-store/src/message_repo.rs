use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use tourbook_core::repository::MessageRepository;
use tourbook_core::{ContactMessage, CoreError, CoreResult, NewContactMessage};

use crate::database::db_err;

pub struct StoreMessageRepository {
    pool: PgPool,
}

impl StoreMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    name: String,
    email: String,
    subject: Option<String>,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for ContactMessage {
    fn from(row: MessageRow) -> Self {
        ContactMessage {
            id: row.id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

const RETURNING: &str = "RETURNING id, name, email, subject, message, is_read, created_at";

#[async_trait]
impl MessageRepository for StoreMessageRepository {
    async fn create_message(&self, message: NewContactMessage) -> CoreResult<ContactMessage> {
        message.validate()?;

        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "INSERT INTO contact_messages (id, name, email, subject, message) VALUES ($1, $2, $3, $4, $5) {}",
            RETURNING
        ))
        .bind(Uuid::new_v4())
        .bind(message.name.trim())
        .bind(message.email.trim())
        .bind(&message.subject)
        .bind(message.message.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.into())
    }

    async fn list_messages(&self, unread_only: bool) -> CoreResult<Vec<ContactMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, name, email, subject, message, is_read, created_at
            FROM contact_messages
            WHERE ($1 = FALSE OR is_read = FALSE)
            ORDER BY created_at DESC
            "#,
        )
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(ContactMessage::from).collect())
    }

    async fn set_read(&self, id: Uuid, is_read: bool) -> CoreResult<ContactMessage> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "UPDATE contact_messages SET is_read = $1 WHERE id = $2 {}",
            RETURNING
        ))
        .bind(is_read)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| CoreError::NotFound(format!("Message {} not found", id)))?;

        Ok(row.into())
    }

    async fn set_read_many(&self, ids: &[Uuid], is_read: bool) -> CoreResult<u64> {
        let result = sqlx::query("UPDATE contact_messages SET is_read = $1 WHERE id = ANY($2)")
            .bind(is_read)
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }

    async fn delete_message(&self, id: Uuid) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Message {} not found", id)));
        }
        Ok(())
    }
}
