//! Object storage for call recordings.
//!
//! A [`StorageProvider`] trait with two backends: S3 (production, with
//! presigned GET URLs) and the local filesystem (development and tests).
//! Object keys follow the deterministic convention from
//! `callshield_core::storage`, so re-processing a recording overwrites the
//! same object instead of accumulating copies.

use std::path::{Path, PathBuf};
use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;

/// Errors from the object storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required environment variable is missing or malformed.
    #[error("Missing or invalid storage configuration: {0}")]
    MissingConfig(&'static str),

    /// An S3 operation failed.
    #[error("S3 operation failed: {0}")]
    S3(String),

    /// A local filesystem operation failed.
    #[error("Filesystem operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// The requested object key escapes the storage root.
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
}

/// Durable storage for recording bytes plus time-limited read access.
#[async_trait::async_trait]
pub trait StorageProvider: Send + Sync {
    /// Write recording bytes at the given object key, overwriting any
    /// existing object (idempotent re-upload).
    async fn put_recording(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError>;

    /// Generate a time-limited GET URL for a stored recording.
    async fn signed_get_url(&self, key: &str, expires_secs: u64) -> Result<String, StorageError>;
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which backend to use, selected at startup.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// S3-compatible object storage.
    S3 {
        /// Bucket holding recording objects.
        bucket: String,
    },
    /// Local filesystem, for development and tests.
    Local {
        /// Directory under which object keys are materialized as paths.
        root: PathBuf,
    },
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var           | Default              |
    /// |-------------------|----------------------|
    /// | `STORAGE_BACKEND` | `local`              |
    /// | `STORAGE_BUCKET`  | required for `s3`    |
    /// | `STORAGE_ROOT`    | `./data/recordings`  |
    pub fn from_env() -> Result<Self, StorageError> {
        let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".into());
        match backend.as_str() {
            "s3" => {
                let bucket = std::env::var("STORAGE_BUCKET")
                    .map_err(|_| StorageError::MissingConfig("STORAGE_BUCKET"))?;
                Ok(Self::S3 { bucket })
            }
            "local" => {
                let root = std::env::var("STORAGE_ROOT")
                    .unwrap_or_else(|_| "./data/recordings".into());
                Ok(Self::Local {
                    root: PathBuf::from(root),
                })
            }
            _ => Err(StorageError::MissingConfig("STORAGE_BACKEND")),
        }
    }

    /// Build the provider this configuration describes.
    pub async fn build(self) -> Result<Box<dyn StorageProvider>, StorageError> {
        match self {
            Self::S3 { bucket } => {
                let aws_config = aws_config::load_from_env().await;
                let client = aws_sdk_s3::Client::new(&aws_config);
                tracing::info!(%bucket, "Using S3 recording storage");
                Ok(Box::new(S3Storage::new(client, bucket)))
            }
            Self::Local { root } => {
                tracing::info!(root = %root.display(), "Using local recording storage");
                Ok(Box::new(LocalStorage::new(root)))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// S3 backend
// ---------------------------------------------------------------------------

/// S3-backed recording storage with presigned read URLs.
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait::async_trait]
impl StorageProvider for S3Storage {
    async fn put_recording(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("audio/wav")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;
        Ok(())
    }

    async fn signed_get_url(&self, key: &str, expires_secs: u64) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(Duration::from_secs(expires_secs))
            .map_err(|e| StorageError::S3(e.to_string()))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;
        Ok(presigned.uri().to_string())
    }
}

// ---------------------------------------------------------------------------
// Local backend
// ---------------------------------------------------------------------------

/// Filesystem-backed recording storage.
///
/// "Signed" URLs are plain `file://` URLs; there is nothing to sign locally
/// and nothing outside this host can reach them anyway.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve an object key to a path under the root, rejecting traversal.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty()
            || Path::new(key)
                .components()
                .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait::async_trait]
impl StorageProvider for LocalStorage {
    async fn put_recording(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn signed_get_url(&self, key: &str, _expires_secs: u64) -> Result<String, StorageError> {
        let path = self.resolve(key)?;
        if !path.is_file() {
            return Err(StorageError::InvalidKey(format!("no object at key {key}")));
        }
        Ok(format!("file://{}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
