/**
 * PostgreSQL Document Store
 *
 * Reads and updates rows of the `notes` table. The schema lives in
 * `migrations/` and is applied at startup by `server::config`.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::store::{DocumentStore, StoreError};
use crate::shared::{Document, DocumentId, SharingMetadata, UserId};

/// Row shape of the `notes` table
#[derive(Debug, Clone, sqlx::FromRow)]
struct NoteRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    body: Value,
    is_public: bool,
    share_code: Option<String>,
    shared_with: Vec<Uuid>,
    updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Document {
    fn from(row: NoteRow) -> Self {
        Document {
            id: DocumentId::new(row.id),
            owner_id: UserId::new(row.owner_id),
            title: row.title,
            body: row.body,
            is_public: row.is_public,
            share_token: row.share_code,
            shared_with: row.shared_with.into_iter().map(UserId::new).collect(),
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SharingRow {
    owner_id: Uuid,
    is_public: bool,
    share_code: Option<String>,
    shared_with: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, owner_id, title, body, is_public, share_code, shared_with, updated_at
            FROM notes
            WHERE id = $1
            "#
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Document::from))
    }

    async fn update_document(&self, id: &DocumentId, title: &str, body: &Value) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE notes
            SET title = $1, body = $2, updated_at = $3
            WHERE id = $4
            "#
        )
        .bind(title)
        .bind(body)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(*id));
        }
        Ok(())
    }

    async fn sharing_metadata(&self, id: &DocumentId) -> Result<Option<SharingMetadata>, StoreError> {
        let row = sqlx::query_as::<_, SharingRow>(
            r#"
            SELECT owner_id, is_public, share_code, shared_with
            FROM notes
            WHERE id = $1
            "#
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| SharingMetadata {
            owner_id: UserId::new(r.owner_id),
            is_public: r.is_public,
            share_token: r.share_code,
            shared_with: r.shared_with.into_iter().map(UserId::new).collect(),
        }))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
