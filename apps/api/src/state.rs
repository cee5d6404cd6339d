use std::sync::Arc;

use crate::authz::IdentityProvider;
use crate::chat::ChatClient;
use crate::store::{BlobStore, DraftStore, RecordStore};

/// Shared application state injected into all route handlers via Axum extractors.
/// The stores are capability seams: Postgres / S3 / file-backed in production,
/// in-memory in tests.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub drafts: Arc<dyn DraftStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub chat: ChatClient,
}
