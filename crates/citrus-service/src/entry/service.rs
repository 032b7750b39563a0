//! Entry CRUD, move, star, tag and favorites operations.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use citrus_core::error::AppError;
use citrus_core::result::AppResult;
use citrus_core::traits::BlobStore;
use citrus_core::types::EntryId;
use citrus_database::repositories::entry::{EntryRepository, EntryTransaction};
use citrus_entity::entry::{ContentRef, Entry, EntryNode, NewEntry, TagSet};
use citrus_storage::guess_content_type;

use super::favorites::favorites_forest;
use crate::context::RequestContext;

/// Request to create a new entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    /// Display name.
    pub name: String,
    /// Whether to create a folder.
    pub is_folder: bool,
    /// Parent folder (None for root).
    pub parent_id: Option<EntryId>,
    /// Initial tags, any casing.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Initial star flag.
    #[serde(default)]
    pub is_starred: bool,
}

/// Request to upload a file with its payload.
#[derive(Debug, Clone)]
pub struct UploadFileRequest {
    /// File name.
    pub name: String,
    /// Parent folder (None for root).
    pub parent_id: Option<EntryId>,
    /// Initial tags.
    pub tags: Vec<String>,
    /// Declared MIME type; guessed from the name when absent.
    pub content_type: Option<String>,
    /// The payload.
    pub data: Bytes,
}

/// Manages one owner's tree of entries.
#[derive(Debug, Clone)]
pub struct EntryService {
    /// Entry persistence.
    repo: Arc<dyn EntryRepository>,
    /// File payload collaborator.
    blobs: Arc<dyn BlobStore>,
    /// Largest accepted upload.
    max_upload_size: u64,
}

impl EntryService {
    /// Creates a new entry service.
    pub fn new(
        repo: Arc<dyn EntryRepository>,
        blobs: Arc<dyn BlobStore>,
        max_upload_size: u64,
    ) -> Self {
        Self {
            repo,
            blobs,
            max_upload_size,
        }
    }

    /// Name of the entry backend in use.
    pub fn backend(&self) -> &str {
        self.repo.backend()
    }

    /// Name of the blob provider in use.
    pub fn blob_provider(&self) -> &str {
        self.blobs.provider_type()
    }

    /// Checks both the entry backend and the blob store.
    pub async fn health_check(&self) -> AppResult<(bool, bool)> {
        let store = self.repo.health_check().await?;
        let blobs = self.blobs.health_check().await?;
        Ok((store, blobs))
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Lists direct children of `parent_id` (None for the root level).
    ///
    /// When `required_tags` is non-empty, only entries carrying all of them
    /// are returned.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        parent_id: Option<EntryId>,
        required_tags: &TagSet,
    ) -> AppResult<Vec<Entry>> {
        let mut children = self.repo.list_children(ctx.owner_id, parent_id).await?;
        if !required_tags.is_empty() {
            children.retain(|e| e.tags.contains_all(required_tags));
        }
        debug!(
            owner_id = %ctx.owner_id,
            parent_id = ?parent_id,
            count = children.len(),
            "Listed children"
        );
        Ok(children)
    }

    /// Gets an entry by id.
    pub async fn get_entry(&self, ctx: &RequestContext, entry_id: EntryId) -> AppResult<Entry> {
        self.repo
            .find_by_id(ctx.owner_id, entry_id)
            .await?
            .ok_or_else(|| entry_not_found(entry_id))
    }

    /// Ancestor chain from the root level down to the entry itself.
    pub async fn breadcrumbs(
        &self,
        ctx: &RequestContext,
        entry_id: EntryId,
    ) -> AppResult<Vec<Entry>> {
        let table = self.repo.snapshot(ctx.owner_id).await?;
        let entry = table.get(entry_id).ok_or_else(|| entry_not_found(entry_id))?;

        let mut chain: Vec<Entry> = table
            .ancestors(entry_id)
            .into_iter()
            .filter_map(|id| table.get(id).cloned())
            .collect();
        chain.reverse();
        chain.push(entry.clone());
        Ok(chain)
    }

    /// The entry with all of its descendants.
    pub async fn subtree(&self, ctx: &RequestContext, entry_id: EntryId) -> AppResult<EntryNode> {
        let table = self.repo.snapshot(ctx.owner_id).await?;
        EntryNode::from_table(&table, entry_id).ok_or_else(|| entry_not_found(entry_id))
    }

    /// Starred entries plus everything beneath starred folders.
    pub async fn favorites(&self, ctx: &RequestContext) -> AppResult<Vec<EntryNode>> {
        let table = self.repo.snapshot(ctx.owner_id).await?;
        let forest = favorites_forest(&table);
        debug!(owner_id = %ctx.owner_id, roots = forest.len(), "Computed favorites view");
        Ok(forest)
    }

    /// Reads the payload of a file.
    pub async fn read_content(
        &self,
        ctx: &RequestContext,
        entry_id: EntryId,
    ) -> AppResult<(ContentRef, Bytes)> {
        let entry = self.get_entry(ctx, entry_id).await?;
        let content = entry.content.ok_or_else(|| {
            AppError::not_found(format!("Entry {entry_id} has no content")).for_entry(entry_id)
        })?;
        let data = self
            .blobs
            .get(&content.blob_key)
            .await
            .map_err(|e| e.for_entry(entry_id))?;
        Ok((content, data))
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Creates a file or folder without a payload.
    ///
    /// Payloads are attached only by [`EntryService::upload_file`], which
    /// stores the bytes under a fresh key first.
    pub async fn create_entry(
        &self,
        ctx: &RequestContext,
        req: CreateEntryRequest,
    ) -> AppResult<Entry> {
        self.insert_entry(ctx, req, None).await
    }

    async fn insert_entry(
        &self,
        ctx: &RequestContext,
        req: CreateEntryRequest,
        content: Option<ContentRef>,
    ) -> AppResult<Entry> {
        let name = validate_name(&req.name)?;
        let tags = TagSet::normalized(&req.tags)?;

        let mut tx = self.repo.begin(ctx.owner_id).await?;
        if let Some(parent_id) = req.parent_id {
            require_folder(tx.as_mut(), parent_id).await?;
        }

        let entry = Entry::create(NewEntry {
            owner_id: ctx.owner_id,
            name,
            is_folder: req.is_folder,
            parent_id: req.parent_id,
            tags,
            is_starred: req.is_starred,
            content,
        });
        tx.insert(&entry).await?;
        tx.commit().await?;

        info!(
            owner_id = %ctx.owner_id,
            entry_id = %entry.id,
            parent_id = ?entry.parent_id,
            is_folder = entry.is_folder,
            "Entry created"
        );
        Ok(entry)
    }

    /// Stores a payload and creates the file entry referencing it.
    ///
    /// The payload is removed again if the entry cannot be created.
    pub async fn upload_file(
        &self,
        ctx: &RequestContext,
        req: UploadFileRequest,
    ) -> AppResult<Entry> {
        let size = req.data.len() as u64;
        if size > self.max_upload_size {
            return Err(AppError::validation(format!(
                "Upload of {size} bytes exceeds the limit of {} bytes",
                self.max_upload_size
            )));
        }
        validate_name(&req.name)?;

        let blob_key = Uuid::new_v4().to_string();
        let content_type = req
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| guess_content_type(&req.name).to_string());
        let size_bytes = self.blobs.put(&blob_key, req.data).await?;

        let create = CreateEntryRequest {
            name: req.name,
            is_folder: false,
            parent_id: req.parent_id,
            tags: req.tags,
            is_starred: false,
        };
        let content = ContentRef {
            blob_key: blob_key.clone(),
            content_type,
            size_bytes,
        };

        match self.insert_entry(ctx, create, Some(content)).await {
            Ok(entry) => Ok(entry),
            Err(e) => {
                if let Err(cleanup) = self.blobs.delete(&blob_key).await {
                    warn!(blob_key = %blob_key, error = %cleanup, "Failed to remove orphaned upload");
                }
                Err(e)
            }
        }
    }

    /// Renames an entry. Only the name changes.
    pub async fn rename_entry(
        &self,
        ctx: &RequestContext,
        entry_id: EntryId,
        new_name: &str,
    ) -> AppResult<Entry> {
        let name = validate_name(new_name)?;
        let entry = self
            .mutate(ctx, entry_id, |entry| {
                entry.name = name;
                Ok(())
            })
            .await?;
        info!(owner_id = %ctx.owner_id, entry_id = %entry_id, "Entry renamed");
        Ok(entry)
    }

    /// Moves an entry under `new_parent_id` (None for the root level).
    ///
    /// Fails with `CyclicMove` when the target is the entry itself or any of
    /// its descendants, checked by walking the target's ancestors.
    pub async fn move_entry(
        &self,
        ctx: &RequestContext,
        entry_id: EntryId,
        new_parent_id: Option<EntryId>,
    ) -> AppResult<Entry> {
        let mut tx = self.repo.begin(ctx.owner_id).await?;
        let mut entry = tx
            .get(entry_id)
            .await?
            .ok_or_else(|| entry_not_found(entry_id))?;

        if let Some(target) = new_parent_id {
            if target == entry_id || tx.ancestors(target).await?.contains(&entry_id) {
                return Err(AppError::cyclic_move(format!(
                    "Cannot move entry {entry_id} into itself or one of its descendants"
                ))
                .for_entry(entry_id));
            }
            require_folder(tx.as_mut(), target).await?;
        }

        let previous = entry.parent_id;
        entry.parent_id = new_parent_id;
        entry.touch();
        tx.update(&entry).await?;
        tx.commit().await?;

        info!(
            owner_id = %ctx.owner_id,
            entry_id = %entry_id,
            from = ?previous,
            to = ?new_parent_id,
            "Entry moved"
        );
        Ok(entry)
    }

    /// Sets or clears the star flag. Descendants are not touched.
    pub async fn set_starred(
        &self,
        ctx: &RequestContext,
        entry_id: EntryId,
        starred: bool,
    ) -> AppResult<Entry> {
        let entry = self
            .mutate(ctx, entry_id, |entry| {
                entry.is_starred = starred;
                Ok(())
            })
            .await?;
        info!(owner_id = %ctx.owner_id, entry_id = %entry_id, starred, "Star toggled");
        Ok(entry)
    }

    /// Adds a tag, failing with `DuplicateTag` if it is present in any casing.
    pub async fn add_tag(
        &self,
        ctx: &RequestContext,
        entry_id: EntryId,
        tag: &str,
    ) -> AppResult<Entry> {
        let entry = self
            .mutate(ctx, entry_id, |entry| entry.tags.insert(tag))
            .await?;
        info!(owner_id = %ctx.owner_id, entry_id = %entry_id, tag, "Tag added");
        Ok(entry)
    }

    /// Removes a tag.
    ///
    /// Removing an absent tag is a no-op, unless the entry carries no tags
    /// at all, which fails with `TagNotFound`.
    pub async fn remove_tag(
        &self,
        ctx: &RequestContext,
        entry_id: EntryId,
        tag: &str,
    ) -> AppResult<Entry> {
        let entry = self
            .mutate(ctx, entry_id, |entry| {
                if entry.tags.is_empty() {
                    return Err(AppError::tag_not_found(format!(
                        "Entry {entry_id} has no tags"
                    ))
                    .for_entry(entry_id));
                }
                entry.tags.remove(tag);
                Ok(())
            })
            .await?;
        info!(owner_id = %ctx.owner_id, entry_id = %entry_id, tag, "Tag removed");
        Ok(entry)
    }

    /// Deletes an entry and, for folders, everything beneath it.
    ///
    /// Payloads of deleted files are retired before any row goes away. If a
    /// payload cannot be retired, every payload retired so far is restored,
    /// nothing is deleted, and the error names the entry that failed.
    /// Payloads are purged only after the deletion has committed.
    pub async fn delete_entry(&self, ctx: &RequestContext, entry_id: EntryId) -> AppResult<u64> {
        let mut tx = self.repo.begin(ctx.owner_id).await?;
        let doomed = tx.subtree(entry_id).await?;
        if doomed.is_empty() {
            return Err(entry_not_found(entry_id));
        }
        let ids: Vec<EntryId> = doomed.iter().map(|e| e.id).collect();

        let retired = self.retire_payloads(tx.as_mut(), &doomed, &ids).await?;

        let removed = match delete_and_commit(tx, &ids).await {
            Ok(removed) => removed,
            Err(e) => {
                self.restore_payloads(&retired).await;
                return Err(e.for_entry(entry_id));
            }
        };

        for key in &retired {
            if let Err(e) = self.blobs.purge(key).await {
                warn!(blob_key = %key, error = %e, "Failed to purge retired payload");
            }
        }

        info!(
            owner_id = %ctx.owner_id,
            entry_id = %entry_id,
            removed,
            payloads = retired.len(),
            "Entry deleted"
        );
        Ok(removed)
    }

    /// Retire the payload of every doomed file whose blob no surviving
    /// entry references. Restores everything on the first failure.
    async fn retire_payloads(
        &self,
        tx: &mut dyn EntryTransaction,
        doomed: &[Entry],
        ids: &[EntryId],
    ) -> AppResult<Vec<String>> {
        let mut retired: Vec<String> = Vec::new();
        for entry in doomed {
            let Some(content) = &entry.content else {
                continue;
            };
            if retired.contains(&content.blob_key) {
                continue;
            }

            let step = async {
                if tx.count_blob_refs(&content.blob_key, ids).await? > 0 {
                    return Ok(false);
                }
                self.blobs.retire(&content.blob_key).await?;
                Ok::<_, AppError>(true)
            }
            .await;

            match step {
                Ok(true) => retired.push(content.blob_key.clone()),
                Ok(false) => {}
                Err(e) => {
                    error!(
                        entry_id = %entry.id,
                        blob_key = %content.blob_key,
                        error = %e,
                        "Failed to retire payload; aborting delete"
                    );
                    self.restore_payloads(&retired).await;
                    return Err(e.for_entry(entry.id));
                }
            }
        }
        Ok(retired)
    }

    async fn restore_payloads(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.blobs.restore(key).await {
                error!(blob_key = %key, error = %e, "Failed to restore retired payload");
            }
        }
    }

    /// Load, change, and persist one entry inside a transaction.
    async fn mutate<F>(&self, ctx: &RequestContext, entry_id: EntryId, change: F) -> AppResult<Entry>
    where
        F: FnOnce(&mut Entry) -> AppResult<()> + Send,
    {
        let mut tx = self.repo.begin(ctx.owner_id).await?;
        let mut entry = tx
            .get(entry_id)
            .await?
            .ok_or_else(|| entry_not_found(entry_id))?;
        change(&mut entry)?;
        entry.touch();
        tx.update(&entry).await?;
        tx.commit().await?;
        Ok(entry)
    }
}

async fn delete_and_commit(mut tx: Box<dyn EntryTransaction>, ids: &[EntryId]) -> AppResult<u64> {
    let removed = tx.delete(ids).await?;
    tx.commit().await?;
    Ok(removed)
}

/// Ensure `parent_id` names a folder visible in this transaction.
async fn require_folder(tx: &mut dyn EntryTransaction, parent_id: EntryId) -> AppResult<()> {
    match tx.get(parent_id).await? {
        Some(parent) if parent.is_folder => Ok(()),
        Some(_) => Err(AppError::invalid_parent(format!(
            "Parent {parent_id} is not a folder"
        ))),
        None => Err(AppError::invalid_parent(format!(
            "Parent folder {parent_id} not found"
        ))),
    }
}

fn validate_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::invalid_name("Name cannot be empty"));
    }
    Ok(name.to_string())
}

fn entry_not_found(entry_id: EntryId) -> AppError {
    AppError::not_found(format!("Entry {entry_id} not found")).for_entry(entry_id)
}
