use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;

/// Presign lifetime handed to a driver right after an upload.
const UPLOAD_URL_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);
/// Presign lifetime for re-derived read URLs (admin review screens).
const READ_URL_EXPIRY: Duration = Duration::from_secs(60 * 60);

#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: Option<String>)
        -> Result<()>;

    async fn presign_get_object(&self, key: &str, expires_in: Duration) -> Result<String>;
}

pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes));

        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .with_context(|| format!("failed to upload object {key} to S3"))?;

        Ok(())
    }

    async fn presign_get_object(&self, key: &str, expires_in: Duration) -> Result<String> {
        let presign_config = PresigningConfig::builder()
            .expires_in(expires_in)
            .build()
            .context("failed to build S3 presigning config")?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .context("failed to generate presigned download URL")?;

        Ok(presigned.uri().to_string())
    }
}

/// How read URLs are derived from stored keys.
#[derive(Clone, Debug)]
pub enum UrlMode {
    /// Bucket is publicly readable; URLs are stable joins onto this base.
    PublicBase(String),
    /// Bucket is private; every URL is a time-limited presign.
    Presigned,
}

pub struct StoredDocument {
    pub key: String,
    pub url: String,
}

/// Gateway over raw object storage. The key is the durable identifier;
/// any URL handed out is a derived capability and may expire.
#[derive(Clone)]
pub struct DocumentStorage {
    inner: Arc<dyn ObjectStorage>,
    mode: UrlMode,
}

impl DocumentStorage {
    pub fn new(inner: Arc<dyn ObjectStorage>, mode: UrlMode) -> Self {
        Self { inner, mode }
    }

    pub async fn store(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredDocument> {
        self.inner
            .put_object(key, bytes, Some(content_type.to_string()))
            .await?;
        let url = self.derive_url(key, UPLOAD_URL_EXPIRY).await?;
        Ok(StoredDocument {
            key: key.to_string(),
            url,
        })
    }

    /// Re-derives an access URL for a stored key. Persisted URLs must be
    /// treated as stale; this is the only supported way to read one back.
    pub async fn read_url(&self, key: &str) -> Result<String> {
        self.derive_url(key, READ_URL_EXPIRY).await
    }

    async fn derive_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        match &self.mode {
            UrlMode::PublicBase(base) => {
                Ok(format!("{}/{}", base.trim_end_matches('/'), key))
            }
            UrlMode::Presigned => self.inner.presign_get_object(key, expires_in).await,
        }
    }
}

/// Builds a namespaced storage key for a driver document upload, e.g.
/// `drivers/{application_id}/insurance-1a2b3c4d.pdf`.
pub fn document_key(application_id: Uuid, doc_type: &str, content_type: &str) -> String {
    let mut suffix_bytes = [0u8; 4];
    OsRng.fill_bytes(&mut suffix_bytes);
    let suffix = hex::encode(suffix_bytes);
    let ext = extension_for_mime(content_type).unwrap_or("bin");
    format!(
        "drivers/{}/{}-{}.{}",
        application_id,
        doc_type.to_lowercase(),
        suffix,
        ext
    )
}

pub fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    match content_type {
        // jpeg would otherwise map to "jfif" variants first
        "image/jpeg" => Some("jpg"),
        "application/pdf" => Some("pdf"),
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first())
            .copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_accepted_mime_types_to_extensions() {
        assert_eq!(extension_for_mime("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_mime("image/png"), Some("png"));
        assert_eq!(extension_for_mime("application/pdf"), Some("pdf"));
    }

    #[test]
    fn document_keys_are_namespaced_and_unique() {
        let application_id = Uuid::new_v4();
        let first = document_key(application_id, "INSURANCE", "application/pdf");
        let second = document_key(application_id, "INSURANCE", "application/pdf");

        assert!(first.starts_with(&format!("drivers/{application_id}/insurance-")));
        assert!(first.ends_with(".pdf"));
        assert_ne!(first, second);
    }
}
