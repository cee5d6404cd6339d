//! Capability seams for the hosted services: the relational record store,
//! the object blob store, and the local draft snapshots that stand in for
//! them when no remote content exists.

pub mod drafts;
pub mod memory;
pub mod postgres;
pub mod s3;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Object storage error: {0}")]
    Storage(String),

    #[error("Draft store error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Bucket-per-asset-class layout of the blob store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    ProfileImages,
    ContactImages,
    Documents,
    CertificationDocuments,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::ProfileImages => "profile-images",
            Bucket::ContactImages => "contact-images",
            Bucket::Documents => "documents",
            Bucket::CertificationDocuments => "certification-documents",
        }
    }
}

/// Identity of a content item: remote-assigned once persisted, or a
/// synthesized placeholder for compiled defaults that were never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemId {
    Remote(Uuid),
    Default(String),
}

impl ItemId {
    /// Placeholder id for a compiled default: `default-<section>-<index>`.
    pub fn synthetic(section: &str, index: usize) -> Self {
        ItemId::Default(format!("default-{section}-{index}"))
    }

    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(id) => ItemId::Remote(id),
            Err(_) => ItemId::Default(raw.to_string()),
        }
    }

    pub fn as_remote(&self) -> Option<Uuid> {
        match self {
            ItemId::Remote(id) => Some(*id),
            ItemId::Default(_) => None,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Remote(id) => write!(f, "{id}"),
            ItemId::Default(s) => f.write_str(s),
        }
    }
}

impl FromStr for ItemId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ItemId::parse(s))
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ItemId::parse(&raw))
    }
}

/// A storage key plus its resolved public URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Storage key, when it could be recovered from the stored value.
    pub key: Option<String>,
    pub url: String,
}

/// One ordered entry of an editable section. `data` holds the section's
/// display fields; remote rows additionally carry a creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ItemId,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A persisted row of a dedicated-table section.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub data: Value,
    pub asset_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The hosted relational store. Two shapes: dedicated tables with
/// one row per item, and `portfolio_content` rows holding one serialized
/// array per section key.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_rows(&self, table: &str, owner: Uuid) -> Result<Vec<ContentRow>, StoreError>;

    async fn insert_row(
        &self,
        table: &str,
        owner: Uuid,
        data: &Value,
        asset_url: Option<&str>,
    ) -> Result<Uuid, StoreError>;

    async fn update_row(
        &self,
        table: &str,
        owner: Uuid,
        id: Uuid,
        data: &Value,
        asset_url: Option<&str>,
    ) -> Result<(), StoreError>;

    async fn delete_row(&self, table: &str, owner: Uuid, id: Uuid) -> Result<(), StoreError>;

    async fn get_content(&self, owner: Uuid, content_key: &str)
        -> Result<Option<Value>, StoreError>;

    async fn put_content(
        &self,
        owner: Uuid,
        content_key: &str,
        value: &Value,
    ) -> Result<(), StoreError>;
}

/// The hosted object store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Uploads a blob and returns its public URL.
    async fn put(
        &self,
        bucket: Bucket,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StoreError>;

    async fn delete(&self, bucket: Bucket, key: &str) -> Result<(), StoreError>;

    async fn list(&self, bucket: Bucket, prefix: &str) -> Result<Vec<String>, StoreError>;

    fn public_url(&self, bucket: Bucket, key: &str) -> String;

    /// Recovers the storage key from a public URL by stripping the known
    /// prefix. Returns None for URLs outside this store.
    fn key_of(&self, bucket: Bucket, url: &str) -> Option<String>;
}

/// Per-section full-list snapshots, the local analogue of the browser's
/// persisted key-value store. Used as a read fallback until remote rows
/// exist and as the write target for owner edits without a remote session.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn load(&self, section: &str) -> Result<Option<Vec<ContentItem>>, StoreError>;

    async fn save(&self, section: &str, items: &[ContentItem]) -> Result<(), StoreError>;

    async fn discard(&self, section: &str) -> Result<(), StoreError>;
}

/// Builds the blob key for an attached asset:
/// `<section>/<item-id>-<timestamp>.<ext>`. The timestamp keeps uploads
/// collision-free and prior versions recoverable by listing.
pub fn asset_key(section: &str, item_id: &ItemId, timestamp_ms: i64, ext: &str) -> String {
    format!("{section}/{item_id}-{timestamp_ms}.{ext}")
}

/// Lowercased file extension of an uploaded filename, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_roundtrip_remote() {
        let id = Uuid::new_v4();
        let parsed = ItemId::parse(&id.to_string());
        assert_eq!(parsed, ItemId::Remote(id));
        assert_eq!(parsed.as_remote(), Some(id));
    }

    #[test]
    fn test_item_id_synthetic_format() {
        let id = ItemId::synthetic("certifications", 3);
        assert_eq!(id.to_string(), "default-certifications-3");
        assert_eq!(id.as_remote(), None);
        assert_eq!(ItemId::parse("default-certifications-3"), id);
    }

    #[test]
    fn test_item_id_serde_as_string() {
        let id = ItemId::synthetic("skills", 0);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"default-skills-0\"");
        let back: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_asset_key_format() {
        let id = ItemId::parse("8d5e9b8e-2f6f-4f20-a6b3-3a1f0c9b1d2e");
        let key = asset_key("certifications", &id, 1700000000000, "pdf");
        assert_eq!(
            key,
            "certifications/8d5e9b8e-2f6f-4f20-a6b3-3a1f0c9b1d2e-1700000000000.pdf"
        );
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("cv.PDF"), Some("pdf".to_string()));
        assert_eq!(extension_of("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of(".hidden"), None);
        assert_eq!(extension_of("trailing."), None);
    }
}
