//! The content reconciler: merges compiled defaults, local draft snapshots,
//! and authoritative remote records into one ordered list per section, and
//! writes mutations through to the record/blob stores.
//!
//! Written once and instantiated per section from the static registry. All
//! mutation entry points are gated by the shared `AuthorizationContext`.

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::authz::{owner_id, AuthorizationContext};
use crate::errors::AppError;
use crate::store::{
    asset_key, extension_of, AssetRef, BlobStore, Bucket, ContentItem, ContentRow, DraftStore,
    ItemId, RecordStore, StoreError,
};

use super::sections::{InsertOrder, SectionConfig, StorageMode};

/// Which of the three sources produced the displayed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Remote,
    Draft,
    Defaults,
}

#[derive(Debug, Serialize)]
pub struct ReconciledSection {
    pub items: Vec<ContentItem>,
    pub source: ContentSource,
}

/// Result of the two-phase delete. The blob is removed first, best-effort;
/// a blob failure leaves an orphan but never blocks the row removal. A row
/// removal failure aborts with the error instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeleteOutcome {
    Complete,
    AssetOrphaned { key: String, detail: String },
}

pub struct Reconciler<'a> {
    section: &'static SectionConfig,
    records: &'a dyn RecordStore,
    blobs: &'a dyn BlobStore,
    drafts: &'a dyn DraftStore,
    authz: &'a AuthorizationContext,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        section: &'static SectionConfig,
        records: &'a dyn RecordStore,
        blobs: &'a dyn BlobStore,
        drafts: &'a dyn DraftStore,
        authz: &'a AuthorizationContext,
    ) -> Self {
        Self {
            section,
            records,
            blobs,
            drafts,
            authz,
        }
    }

    /// Produces the authoritative ordered list: remote records first, then
    /// the local draft snapshot, then compiled defaults. A failed remote
    /// call degrades to the next source without retry, so the displayed
    /// list is never empty while a compiled default exists.
    pub async fn load(&self) -> Result<ReconciledSection, AppError> {
        match self.load_remote().await {
            Ok(Some(items)) => return Ok(self.remote_loaded(items).await),
            Ok(None) => {
                // First authenticated owner visit to a rows-backed section:
                // migrate the compiled defaults into permanent storage.
                if matches!(self.section.storage, StorageMode::Rows { .. })
                    && self.authz.can_edit()
                    && self.authz.has_remote_session()
                {
                    match self.seed_defaults().await {
                        Ok(()) => match self.load_remote().await {
                            Ok(Some(items)) => return Ok(self.remote_loaded(items).await),
                            Ok(None) => {}
                            Err(e) => warn!(
                                "Remote read failed after seeding '{}': {e}",
                                self.section.key
                            ),
                        },
                        Err(e) => {
                            warn!("Failed to seed defaults for '{}': {e}", self.section.key)
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Remote read failed for '{}': {e}", self.section.key);
            }
        }

        match self.drafts.load(self.section.key).await {
            Ok(Some(mut items)) => {
                self.resolve_items(&mut items);
                return Ok(ReconciledSection {
                    items,
                    source: ContentSource::Draft,
                });
            }
            Ok(None) => {}
            Err(e) => warn!("Draft read failed for '{}': {e}", self.section.key),
        }

        Ok(ReconciledSection {
            items: self.default_items(),
            source: ContentSource::Defaults,
        })
    }

    /// Validates and inserts a new item, honoring the section's insertion
    /// convention, then reloads from the authoritative source.
    pub async fn add(&self, data: Value) -> Result<ReconciledSection, AppError> {
        self.ensure_can_edit()?;
        self.validate(&data)?;

        if !self.authz.has_remote_session() {
            let mut items = self.load().await?.items;
            let item = ContentItem {
                id: ItemId::Remote(Uuid::new_v4()),
                data,
                asset: None,
                created_at: None,
            };
            self.insert_positioned(&mut items, item);
            return self.persist_local(items).await;
        }

        match self.section.storage {
            StorageMode::Rows { table } => {
                self.records
                    .insert_row(table, owner_id(), &data, None)
                    .await?;
            }
            StorageMode::Keyed { content_key } => {
                // Read-modify-write of the serialized array. The first owner
                // mutation migrates the whole displayed list to the store.
                let mut items = self.load().await?.items;
                let item = ContentItem {
                    id: ItemId::Remote(Uuid::new_v4()),
                    data,
                    asset: None,
                    created_at: Some(Utc::now()),
                };
                self.insert_positioned(&mut items, item);
                self.put_keyed(content_key, &items).await?;
            }
        }

        // Read-after-write: trust the store, not the in-memory list.
        self.load().await
    }

    /// Replaces one item's display fields in place.
    pub async fn edit(&self, id: &ItemId, data: Value) -> Result<ReconciledSection, AppError> {
        self.ensure_can_edit()?;
        self.validate(&data)?;

        let current = self.load().await?;
        let index = position_of(&current.items, id).ok_or_else(|| self.missing(id))?;

        if self.authz.has_remote_session() {
            match (self.section.storage, id.as_remote()) {
                (StorageMode::Rows { table }, Some(row_id))
                    if current.source == ContentSource::Remote =>
                {
                    let asset_url = current.items[index].asset.as_ref().map(|a| a.url.clone());
                    self.records
                        .update_row(table, owner_id(), row_id, &data, asset_url.as_deref())
                        .await?;
                    return self.load().await;
                }
                (StorageMode::Keyed { content_key }, _) => {
                    let mut items = current.items;
                    items[index].data = data;
                    self.put_keyed(content_key, &items).await?;
                    return self.load().await;
                }
                _ => {}
            }
        }

        let mut items = current.items;
        items[index].data = data;
        self.persist_local(items).await
    }

    /// Two-phase delete: blob first (best-effort), then the row or array
    /// entry. Returns the surviving list and the tagged outcome.
    pub async fn delete(
        &self,
        id: &ItemId,
    ) -> Result<(ReconciledSection, DeleteOutcome), AppError> {
        self.ensure_can_edit()?;

        let current = self.load().await?;
        let index = position_of(&current.items, id).ok_or_else(|| self.missing(id))?;

        let mut outcome = DeleteOutcome::Complete;
        if let Some(key) = current.items[index].asset.as_ref().and_then(|a| a.key.clone()) {
            if let Some(bucket) = self.bucket_for_stored_key(&key) {
                if let Err(e) = self.blobs.delete(bucket, &key).await {
                    warn!("Blob delete failed for '{key}': {e}");
                    outcome = DeleteOutcome::AssetOrphaned {
                        key,
                        detail: e.to_string(),
                    };
                }
            }
        }

        if self.authz.has_remote_session() {
            match (self.section.storage, id.as_remote()) {
                (StorageMode::Rows { table }, Some(row_id))
                    if current.source == ContentSource::Remote =>
                {
                    self.records.delete_row(table, owner_id(), row_id).await?;
                    let list = self.load().await?;
                    return Ok((list, outcome));
                }
                (StorageMode::Keyed { content_key }, _) => {
                    let mut items = current.items;
                    items.remove(index);
                    self.put_keyed(content_key, &items).await?;
                    let list = self.load().await?;
                    return Ok((list, outcome));
                }
                // Default-only item in a rows-backed section: nothing remote
                // to delete, trim the local snapshot instead.
                _ => {}
            }
        }

        let mut items = current.items;
        items.remove(index);
        let list = self.persist_local(items).await?;
        Ok((list, outcome))
    }

    /// Uploads a file and attaches it to one item. The extension must be
    /// allow-listed by the section's asset policy; the storage key embeds
    /// the item id and a timestamp so prior versions stay listable.
    pub async fn attach_asset(
        &self,
        id: &ItemId,
        filename: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<ReconciledSection, AppError> {
        self.ensure_can_edit()?;
        let policy = self.section.asset.as_ref().ok_or_else(|| {
            AppError::Validation(format!(
                "Section '{}' does not accept attachments",
                self.section.key
            ))
        })?;
        let ext = extension_of(filename)
            .ok_or_else(|| AppError::Validation("Uploaded file has no extension".to_string()))?;
        let bucket = policy.bucket_for(&ext).ok_or_else(|| {
            AppError::Validation(format!(
                "File type '.{ext}' is not allowed for '{}'",
                self.section.key
            ))
        })?;

        let current = self.load().await?;
        let index = position_of(&current.items, id).ok_or_else(|| self.missing(id))?;

        let key = asset_key(self.section.key, id, Utc::now().timestamp_millis(), &ext);
        let url = self.blobs.put(bucket, &key, bytes, content_type).await?;
        info!("Uploaded attachment for '{}/{id}' to {url}", self.section.key);

        self.persist_asset(current, index, id, Some(AssetRef { key: Some(key), url }))
            .await
    }

    /// Deletes the attached blob (best-effort) and clears the asset field.
    pub async fn detach_asset(&self, id: &ItemId) -> Result<ReconciledSection, AppError> {
        self.ensure_can_edit()?;

        let current = self.load().await?;
        let index = position_of(&current.items, id).ok_or_else(|| self.missing(id))?;
        let asset = current.items[index]
            .asset
            .clone()
            .ok_or_else(|| AppError::NotFound(format!("Item {id} has no attachment")))?;

        if let Some(key) = &asset.key {
            if let Some(bucket) = self.bucket_for_stored_key(key) {
                // The reference is cleared even if the blob lingers.
                if let Err(e) = self.blobs.delete(bucket, key).await {
                    warn!("Blob delete failed for '{key}': {e}");
                }
            }
        }

        self.persist_asset(current, index, id, None).await
    }

    async fn remote_loaded(&self, items: Vec<ContentItem>) -> ReconciledSection {
        // Remote is authoritative from here on; the local snapshot is a
        // stale cache and gets discarded.
        if let Err(e) = self.drafts.discard(self.section.key).await {
            warn!(
                "Failed to discard stale draft for '{}': {e}",
                self.section.key
            );
        }
        ReconciledSection {
            items,
            source: ContentSource::Remote,
        }
    }

    /// Remote read. `None` means no content exists yet (zero rows, or no
    /// keyed entry); a present-but-empty keyed array is authoritative.
    async fn load_remote(&self) -> Result<Option<Vec<ContentItem>>, StoreError> {
        match self.section.storage {
            StorageMode::Rows { table } => {
                let rows = self.records.list_rows(table, owner_id()).await?;
                if rows.is_empty() {
                    return Ok(None);
                }
                Ok(Some(
                    rows.into_iter().map(|row| self.item_from_row(row)).collect(),
                ))
            }
            StorageMode::Keyed { content_key } => {
                match self.records.get_content(owner_id(), content_key).await? {
                    None => Ok(None),
                    Some(value) => {
                        let mut items: Vec<ContentItem> = serde_json::from_value(value)?;
                        self.resolve_items(&mut items);
                        Ok(Some(items))
                    }
                }
            }
        }
    }

    async fn seed_defaults(&self) -> Result<(), StoreError> {
        let StorageMode::Rows { table } = self.section.storage else {
            return Ok(());
        };
        let defaults = (self.section.defaults)();
        for data in &defaults {
            self.records
                .insert_row(table, owner_id(), data, None)
                .await?;
        }
        info!(
            "Seeded {} compiled defaults into '{table}'",
            defaults.len()
        );
        Ok(())
    }

    async fn put_keyed(&self, content_key: &str, items: &[ContentItem]) -> Result<(), StoreError> {
        let value = serde_json::to_value(items)?;
        self.records
            .put_content(owner_id(), content_key, &value)
            .await
    }

    async fn persist_local(&self, items: Vec<ContentItem>) -> Result<ReconciledSection, AppError> {
        self.drafts.save(self.section.key, &items).await?;
        Ok(ReconciledSection {
            items,
            source: ContentSource::Draft,
        })
    }

    async fn persist_asset(
        &self,
        current: ReconciledSection,
        index: usize,
        id: &ItemId,
        asset: Option<AssetRef>,
    ) -> Result<ReconciledSection, AppError> {
        if self.authz.has_remote_session() {
            match (self.section.storage, id.as_remote()) {
                (StorageMode::Rows { table }, Some(row_id))
                    if current.source == ContentSource::Remote =>
                {
                    let data = current.items[index].data.clone();
                    let asset_url = asset.as_ref().map(|a| a.url.clone());
                    self.records
                        .update_row(table, owner_id(), row_id, &data, asset_url.as_deref())
                        .await?;
                    return self.load().await;
                }
                (StorageMode::Keyed { content_key }, _) => {
                    let mut items = current.items;
                    items[index].asset = asset;
                    self.put_keyed(content_key, &items).await?;
                    return self.load().await;
                }
                _ => {}
            }
        }

        let mut items = current.items;
        items[index].asset = asset;
        self.persist_local(items).await
    }

    fn item_from_row(&self, row: ContentRow) -> ContentItem {
        ContentItem {
            id: ItemId::Remote(row.id),
            asset: row.asset_url.as_deref().map(|raw| self.resolve_asset_raw(raw)),
            data: row.data,
            created_at: Some(row.created_at),
        }
    }

    /// Stored asset values may be a bare storage key or a full public URL;
    /// both resolve to a key + URL pair.
    fn resolve_asset_raw(&self, raw: &str) -> AssetRef {
        let Some(policy) = &self.section.asset else {
            return AssetRef {
                key: None,
                url: raw.to_string(),
            };
        };
        if raw.starts_with("http://") || raw.starts_with("https://") {
            let key = policy.buckets().find_map(|b| self.blobs.key_of(b, raw));
            AssetRef {
                key,
                url: raw.to_string(),
            }
        } else {
            let bucket = policy
                .bucket_for_key(raw)
                .unwrap_or_else(|| policy.primary_bucket());
            AssetRef {
                key: Some(raw.to_string()),
                url: self.blobs.public_url(bucket, raw),
            }
        }
    }

    fn resolve_items(&self, items: &mut [ContentItem]) {
        for item in items.iter_mut() {
            item.asset = match item.asset.take() {
                Some(asset) if !asset.url.starts_with("http") => {
                    let raw = if asset.url.is_empty() {
                        asset.key.unwrap_or_default()
                    } else {
                        asset.url
                    };
                    if raw.is_empty() {
                        None
                    } else {
                        Some(self.resolve_asset_raw(&raw))
                    }
                }
                other => other,
            };
        }
    }

    fn default_items(&self) -> Vec<ContentItem> {
        (self.section.defaults)()
            .into_iter()
            .enumerate()
            .map(|(index, data)| ContentItem {
                id: ItemId::synthetic(self.section.key, index),
                data,
                asset: None,
                created_at: None,
            })
            .collect()
    }

    fn insert_positioned(&self, items: &mut Vec<ContentItem>, item: ContentItem) {
        match self.section.insert {
            InsertOrder::Append => items.push(item),
            InsertOrder::Prepend => items.insert(0, item),
        }
    }

    fn bucket_for_stored_key(&self, key: &str) -> Option<Bucket> {
        self.section
            .asset
            .as_ref()
            .map(|p| p.bucket_for_key(key).unwrap_or_else(|| p.primary_bucket()))
    }

    fn validate(&self, data: &Value) -> Result<(), AppError> {
        for field in self.section.required {
            let present = data
                .get(*field)
                .and_then(Value::as_str)
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false);
            if !present {
                return Err(AppError::Validation(format!("'{field}' is required")));
            }
        }
        Ok(())
    }

    fn ensure_can_edit(&self) -> Result<(), AppError> {
        if !self.authz.can_edit() {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    fn missing(&self, id: &ItemId) -> AppError {
        AppError::NotFound(format!("Item {id} not found in '{}'", self.section.key))
    }
}

fn position_of(items: &[ContentItem], id: &ItemId) -> Option<usize> {
    items.iter().position(|item| &item.id == id)
}
