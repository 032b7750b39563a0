//! PostgreSQL entry backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use citrus_core::error::{AppError, ErrorKind};
use citrus_core::result::AppResult;
use citrus_core::types::{EntryId, OwnerId};
use citrus_entity::entry::{ContentRef, Entry, EntryTable, TagSet};

use super::{EntryRepository, EntryTransaction};

const ENTRY_COLUMNS: &str = "id, owner_id, name, is_folder, parent_id, is_starred, tags, \
     blob_key, content_type, size_bytes, created_at, updated_at";

/// Raw `entries` row.
#[derive(Debug, FromRow)]
struct EntryRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    is_folder: bool,
    parent_id: Option<Uuid>,
    is_starred: bool,
    tags: Vec<String>,
    blob_key: Option<String>,
    content_type: Option<String>,
    size_bytes: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EntryRow> for Entry {
    type Error = AppError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let tags = TagSet::normalized(&row.tags).map_err(|e| {
            AppError::new(
                ErrorKind::Database,
                format!("Entry {} has malformed tags: {}", row.id, e.message),
            )
        })?;
        let content = row.blob_key.map(|blob_key| ContentRef {
            blob_key,
            content_type: row
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            size_bytes: row.size_bytes.map_or(0, |s| u64::try_from(s).unwrap_or(0)),
        });
        Ok(Entry {
            id: EntryId::from_uuid(row.id),
            owner_id: OwnerId::from_uuid(row.owner_id),
            name: row.name,
            is_folder: row.is_folder,
            parent_id: row.parent_id.map(EntryId::from_uuid),
            is_starred: row.is_starred,
            tags,
            content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_entries(rows: Vec<EntryRow>) -> AppResult<Vec<Entry>> {
    rows.into_iter().map(Entry::try_from).collect()
}

fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

fn ids_to_uuids(ids: &[EntryId]) -> Vec<Uuid> {
    ids.iter().map(|id| id.into_uuid()).collect()
}

/// Advisory lock key for an owner. Collisions only cost extra serialization.
fn owner_lock_key(owner_id: OwnerId) -> i64 {
    let (hi, lo) = owner_id.as_uuid().as_u64_pair();
    (hi ^ lo) as i64
}

/// Entry repository backed by the `entries` table.
#[derive(Debug, Clone)]
pub struct PgEntryRepository {
    pool: PgPool,
}

impl PgEntryRepository {
    /// Create a new repository over a pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryRepository for PgEntryRepository {
    fn backend(&self) -> &str {
        "postgres"
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(db_err("Health check failed"))
    }

    async fn find_by_id(&self, owner_id: OwnerId, id: EntryId) -> AppResult<Option<Entry>> {
        sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE owner_id = $1 AND id = $2"
        ))
        .bind(owner_id.into_uuid())
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find entry"))?
        .map(Entry::try_from)
        .transpose()
    }

    async fn list_children(
        &self,
        owner_id: OwnerId,
        parent_id: Option<EntryId>,
    ) -> AppResult<Vec<Entry>> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             ORDER BY name COLLATE \"C\" ASC, created_at ASC, id ASC"
        ))
        .bind(owner_id.into_uuid())
        .bind(parent_id.map(EntryId::into_uuid))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list children"))?;
        into_entries(rows)
    }

    async fn snapshot(&self, owner_id: OwnerId) -> AppResult<EntryTable> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE owner_id = $1"
        ))
        .bind(owner_id.into_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to load entries"))?;
        Ok(EntryTable::from_entries(into_entries(rows)?))
    }

    async fn begin(&self, owner_id: OwnerId) -> AppResult<Box<dyn EntryTransaction>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(owner_lock_key(owner_id))
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to acquire owner lock"))?;

        debug!(owner_id = %owner_id, "Entry transaction started");
        Ok(Box::new(PgEntryTransaction { owner_id, tx }))
    }
}

/// Transaction holding the owner's advisory lock until commit or drop.
struct PgEntryTransaction {
    owner_id: OwnerId,
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl EntryTransaction for PgEntryTransaction {
    fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    async fn get(&mut self, id: EntryId) -> AppResult<Option<Entry>> {
        sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE owner_id = $1 AND id = $2"
        ))
        .bind(self.owner_id.into_uuid())
        .bind(id.into_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err("Failed to load entry"))?
        .map(Entry::try_from)
        .transpose()
    }

    async fn ancestors(&mut self, id: EntryId) -> AppResult<Vec<EntryId>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "WITH RECURSIVE chain AS ( \
                SELECT id, parent_id, 0 AS depth FROM entries WHERE owner_id = $1 AND id = $2 \
                UNION ALL \
                SELECT e.id, e.parent_id, c.depth + 1 FROM entries e \
                INNER JOIN chain c ON e.id = c.parent_id \
                WHERE e.owner_id = $1 \
             ) SELECT id FROM chain WHERE depth > 0 ORDER BY depth ASC",
        )
        .bind(self.owner_id.into_uuid())
        .bind(id.into_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err("Failed to load ancestors"))?;
        Ok(ids.into_iter().map(EntryId::from_uuid).collect())
    }

    async fn subtree(&mut self, id: EntryId) -> AppResult<Vec<Entry>> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "WITH RECURSIVE tree AS ( \
                SELECT id, 0 AS depth FROM entries WHERE owner_id = $1 AND id = $2 \
                UNION ALL \
                SELECT e.id, t.depth + 1 FROM entries e \
                INNER JOIN tree t ON e.parent_id = t.id \
                WHERE e.owner_id = $1 \
             ) SELECT {ENTRY_COLUMNS} FROM entries INNER JOIN tree USING (id) \
             ORDER BY tree.depth DESC, id ASC"
        ))
        .bind(self.owner_id.into_uuid())
        .bind(id.into_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err("Failed to load subtree"))?;
        into_entries(rows)
    }

    async fn insert(&mut self, entry: &Entry) -> AppResult<()> {
        let content = entry.content.as_ref();
        sqlx::query(
            "INSERT INTO entries (id, owner_id, name, is_folder, parent_id, is_starred, tags, \
                blob_key, content_type, size_bytes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(entry.id.into_uuid())
        .bind(entry.owner_id.into_uuid())
        .bind(&entry.name)
        .bind(entry.is_folder)
        .bind(entry.parent_id.map(EntryId::into_uuid))
        .bind(entry.is_starred)
        .bind(entry.tags.to_vec())
        .bind(content.map(|c| c.blob_key.clone()))
        .bind(content.map(|c| c.content_type.clone()))
        .bind(content.map(|c| i64::try_from(c.size_bytes).unwrap_or(i64::MAX)))
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err("Failed to insert entry"))?;
        Ok(())
    }

    async fn update(&mut self, entry: &Entry) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE entries SET name = $3, parent_id = $4, is_starred = $5, tags = $6, \
                updated_at = $7 \
             WHERE owner_id = $1 AND id = $2",
        )
        .bind(self.owner_id.into_uuid())
        .bind(entry.id.into_uuid())
        .bind(&entry.name)
        .bind(entry.parent_id.map(EntryId::into_uuid))
        .bind(entry.is_starred)
        .bind(entry.tags.to_vec())
        .bind(entry.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err("Failed to update entry"))?;

        if result.rows_affected() == 0 {
            return Err(
                AppError::not_found(format!("Entry {} not found", entry.id)).for_entry(entry.id)
            );
        }
        Ok(())
    }

    async fn delete(&mut self, ids: &[EntryId]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM entries WHERE owner_id = $1 AND id = ANY($2)")
            .bind(self.owner_id.into_uuid())
            .bind(ids_to_uuids(ids))
            .execute(&mut *self.tx)
            .await
            .map_err(db_err("Failed to delete entries"))?;
        Ok(result.rows_affected())
    }

    async fn count_blob_refs(&mut self, blob_key: &str, excluding: &[EntryId]) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM entries \
             WHERE owner_id = $1 AND blob_key = $2 AND NOT (id = ANY($3))",
        )
        .bind(self.owner_id.into_uuid())
        .bind(blob_key)
        .bind(ids_to_uuids(excluding))
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err("Failed to count blob references"))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let Self { owner_id, tx } = *self;
        tx.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;
        debug!(owner_id = %owner_id, "Entry transaction committed");
        Ok(())
    }
}
