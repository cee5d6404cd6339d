#![allow(dead_code)]

//! In-memory capability implementations. Deterministic, lock-based, with
//! call counters and failure injection so tests can observe the reconciler's
//! contract (exactly one blob delete, no remote call on refusal, ...).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::s3::{join_public_url, strip_public_prefix};
use super::{BlobStore, Bucket, ContentItem, ContentRow, DraftStore, RecordStore, StoreError};

const TIMESTAMP_BASE: i64 = 1_700_000_000;

#[derive(Default)]
pub struct MemoryRecordStore {
    rows: Mutex<HashMap<String, Vec<ContentRow>>>,
    keyed: Mutex<HashMap<String, Value>>,
    seq: AtomicI64,
    pub read_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_created_at(&self) -> DateTime<Utc> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        DateTime::from_timestamp(TIMESTAMP_BASE + seq, 0).unwrap_or_else(Utc::now)
    }

    fn check_read(&self) -> Result<(), StoreError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Storage("injected read failure".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Storage("injected write failure".into()));
        }
        Ok(())
    }

    pub fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list_rows(&self, table: &str, owner: Uuid) -> Result<Vec<ContentRow>, StoreError> {
        self.check_read()?;
        let rows = self.rows.lock().expect("rows lock");
        let mut out: Vec<ContentRow> = rows
            .get(table)
            .map(|v| v.iter().filter(|r| r.owner_id == owner).cloned().collect())
            .unwrap_or_default();
        out.sort_by_key(|r| r.created_at);
        Ok(out)
    }

    async fn insert_row(
        &self,
        table: &str,
        owner: Uuid,
        data: &Value,
        asset_url: Option<&str>,
    ) -> Result<Uuid, StoreError> {
        self.check_write()?;
        let row = ContentRow {
            id: Uuid::new_v4(),
            owner_id: owner,
            data: data.clone(),
            asset_url: asset_url.map(String::from),
            created_at: self.next_created_at(),
        };
        let id = row.id;
        self.rows
            .lock()
            .expect("rows lock")
            .entry(table.to_string())
            .or_default()
            .push(row);
        Ok(id)
    }

    async fn update_row(
        &self,
        table: &str,
        owner: Uuid,
        id: Uuid,
        data: &Value,
        asset_url: Option<&str>,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        let mut rows = self.rows.lock().expect("rows lock");
        let row = rows
            .get_mut(table)
            .and_then(|v| v.iter_mut().find(|r| r.id == id && r.owner_id == owner))
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        row.data = data.clone();
        row.asset_url = asset_url.map(String::from);
        Ok(())
    }

    async fn delete_row(&self, table: &str, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        self.check_write()?;
        let mut rows = self.rows.lock().expect("rows lock");
        let list = rows
            .get_mut(table)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        let before = list.len();
        list.retain(|r| !(r.id == id && r.owner_id == owner));
        if list.len() == before {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    async fn get_content(
        &self,
        owner: Uuid,
        content_key: &str,
    ) -> Result<Option<Value>, StoreError> {
        self.check_read()?;
        let keyed = self.keyed.lock().expect("keyed lock");
        Ok(keyed.get(&keyed_slot(owner, content_key)).cloned())
    }

    async fn put_content(
        &self,
        owner: Uuid,
        content_key: &str,
        value: &Value,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.keyed
            .lock()
            .expect("keyed lock")
            .insert(keyed_slot(owner, content_key), value.clone());
        Ok(())
    }
}

fn keyed_slot(owner: Uuid, content_key: &str) -> String {
    format!("{owner}/{content_key}")
}

pub const MEMORY_BLOB_ENDPOINT: &str = "https://blobs.test";

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Bytes>>,
    pub put_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, bucket: Bucket, key: &str) -> bool {
        self.objects
            .lock()
            .expect("objects lock")
            .contains_key(&object_slot(bucket, key))
    }

    pub fn deletes(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

fn object_slot(bucket: Bucket, key: &str) -> String {
    format!("{}/{}", bucket.as_str(), key)
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        bucket: Bucket,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<String, StoreError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .expect("objects lock")
            .insert(object_slot(bucket, key), bytes);
        Ok(self.public_url(bucket, key))
    }

    async fn delete(&self, bucket: Bucket, key: &str) -> Result<(), StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Storage("injected blob delete failure".into()));
        }
        self.objects
            .lock()
            .expect("objects lock")
            .remove(&object_slot(bucket, key));
        Ok(())
    }

    async fn list(&self, bucket: Bucket, prefix: &str) -> Result<Vec<String>, StoreError> {
        let full_prefix = object_slot(bucket, prefix);
        Ok(self
            .objects
            .lock()
            .expect("objects lock")
            .keys()
            .filter(|k| k.starts_with(&full_prefix))
            .filter_map(|k| k.strip_prefix(&format!("{}/", bucket.as_str())))
            .map(String::from)
            .collect())
    }

    fn public_url(&self, bucket: Bucket, key: &str) -> String {
        join_public_url(MEMORY_BLOB_ENDPOINT, bucket, key)
    }

    fn key_of(&self, bucket: Bucket, url: &str) -> Option<String> {
        strip_public_prefix(MEMORY_BLOB_ENDPOINT, bucket, url)
    }
}

#[derive(Default)]
pub struct MemoryDraftStore {
    snapshots: Mutex<HashMap<String, Vec<ContentItem>>>,
    pub save_calls: AtomicUsize,
    pub discard_calls: AtomicUsize,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self, section: &str) -> Option<Vec<ContentItem>> {
        self.snapshots
            .lock()
            .expect("snapshots lock")
            .get(section)
            .cloned()
    }

    pub fn seed(&self, section: &str, items: Vec<ContentItem>) {
        self.snapshots
            .lock()
            .expect("snapshots lock")
            .insert(section.to_string(), items);
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn load(&self, section: &str) -> Result<Option<Vec<ContentItem>>, StoreError> {
        Ok(self.snapshot(section))
    }

    async fn save(&self, section: &str, items: &[ContentItem]) -> Result<(), StoreError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.seed(section, items.to_vec());
        Ok(())
    }

    async fn discard(&self, section: &str) -> Result<(), StoreError> {
        self.discard_calls.fetch_add(1, Ordering::SeqCst);
        self.snapshots
            .lock()
            .expect("snapshots lock")
            .remove(section);
        Ok(())
    }
}
