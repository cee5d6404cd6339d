use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::debug;

use super::{BlobStore, Bucket, StoreError};

/// S3 / MinIO blob store with path-style public URLs
/// (`<endpoint>/<bucket>/<key>`).
pub struct S3BlobStore {
    client: S3Client,
    endpoint: String,
}

impl S3BlobStore {
    pub fn new(client: S3Client, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { client, endpoint }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        bucket: Bucket,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StoreError> {
        self.client
            .put_object()
            .bucket(bucket.as_str())
            .key(key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::Storage(format!("S3 upload failed: {e}")))?;
        debug!("Uploaded blob to s3://{}/{}", bucket.as_str(), key);
        Ok(self.public_url(bucket, key))
    }

    async fn delete(&self, bucket: Bucket, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(bucket.as_str())
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::Storage(format!("S3 delete failed: {e}")))?;
        debug!("Deleted blob s3://{}/{}", bucket.as_str(), key);
        Ok(())
    }

    async fn list(&self, bucket: Bucket, prefix: &str) -> Result<Vec<String>, StoreError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket.as_str())
            .prefix(prefix)
            .send()
            .await
            .map_err(|e| StoreError::Storage(format!("S3 list failed: {e}")))?;
        Ok(output
            .contents()
            .iter()
            .filter_map(|o| o.key().map(String::from))
            .collect())
    }

    fn public_url(&self, bucket: Bucket, key: &str) -> String {
        join_public_url(&self.endpoint, bucket, key)
    }

    fn key_of(&self, bucket: Bucket, url: &str) -> Option<String> {
        strip_public_prefix(&self.endpoint, bucket, url)
    }
}

pub(crate) fn join_public_url(endpoint: &str, bucket: Bucket, key: &str) -> String {
    format!("{}/{}/{}", endpoint, bucket.as_str(), key)
}

/// Strips the known public prefix (and any query string) to recover the
/// storage key.
pub(crate) fn strip_public_prefix(endpoint: &str, bucket: Bucket, url: &str) -> Option<String> {
    let rest = url.strip_prefix(&format!("{}/{}/", endpoint, bucket.as_str()))?;
    let key = match rest.split_once('?') {
        Some((key, _)) => key,
        None => rest,
    };
    if key.is_empty() {
        return None;
    }
    Some(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://storage.example.com";

    #[test]
    fn test_join_public_url() {
        assert_eq!(
            join_public_url(ENDPOINT, Bucket::Documents, "education/x-1.pdf"),
            "https://storage.example.com/documents/education/x-1.pdf"
        );
    }

    #[test]
    fn test_strip_public_prefix_roundtrip() {
        let url = join_public_url(ENDPOINT, Bucket::CertificationDocuments, "certifications/a-2.pdf");
        assert_eq!(
            strip_public_prefix(ENDPOINT, Bucket::CertificationDocuments, &url),
            Some("certifications/a-2.pdf".to_string())
        );
    }

    #[test]
    fn test_strip_public_prefix_drops_query() {
        let url = "https://storage.example.com/documents/cv-3.pdf?token=abc";
        assert_eq!(
            strip_public_prefix(ENDPOINT, Bucket::Documents, url),
            Some("cv-3.pdf".to_string())
        );
    }

    #[test]
    fn test_strip_public_prefix_rejects_foreign_urls() {
        assert_eq!(
            strip_public_prefix(ENDPOINT, Bucket::Documents, "https://elsewhere.com/documents/x"),
            None
        );
        assert_eq!(
            strip_public_prefix(ENDPOINT, Bucket::ContactImages, "https://storage.example.com/documents/x"),
            None
        );
    }
}
