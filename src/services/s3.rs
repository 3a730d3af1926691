use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use crate::config::Config;
use crate::services::keys::ObjectKey;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open {path}: {message}")]
    Source { path: String, message: String },

    #[error("{0}")]
    Backend(String),
}

/// The object store as seen by the ingestion pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Streams the file at `path` into the store under `key`.
    async fn put_file(&self, key: &ObjectKey, path: &Path, content_type: &str) -> Result<(), StoreError>;

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError>;

    /// Public address of a stored object.
    fn public_url(&self, key: &ObjectKey) -> String;
}

#[derive(Clone)]
pub struct S3Service {
    client: Client,
    pub bucket_name: String,
    base_url: String,
}

impl S3Service {
    pub async fn new(config: &Config) -> Self {
        let region = aws_sdk_s3::config::Region::new(config.s3_region.clone());

        let mut s3_config_builder = match (&config.aws_access_key_id, &config.aws_secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                let credentials = aws_sdk_s3::config::Credentials::new(
                    access_key_id.clone(),
                    secret_access_key.clone(),
                    None,
                    None,
                    "manual_config",
                );
                aws_sdk_s3::config::Builder::new()
                    .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(credentials)
            }
            _ => {
                tracing::info!("No static S3 credentials configured, using the default provider chain");
                let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                aws_sdk_s3::config::Builder::from(&shared)
            }
        };

        if let Some(endpoint) = &config.s3_endpoint {
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        let client = Client::from_conf(s3_config_builder.build());

        Self {
            client,
            bucket_name: config.s3_bucket.clone(),
            base_url: config.store_base_url(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Service {
    async fn put_file(&self, key: &ObjectKey, path: &Path, content_type: &str) -> Result<(), StoreError> {
        let start = Instant::now();

        // Reads the file in chunks as the request body is sent.
        let body = ByteStream::from_path(path).await.map_err(|e| StoreError::Source {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let size = body.size_hint().1;

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key.as_str())
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    bucket = %self.bucket_name,
                    key = %key,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "S3 upload failed"
                );
                StoreError::Backend(format!("Failed to upload {} to S3: {}", key, e))
            })?;

        tracing::info!(
            bucket = %self.bucket_name,
            key = %key,
            size_bytes = ?size,
            duration_ms = start.elapsed().as_millis() as u64,
            "S3 upload successful"
        );
        Ok(())
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key.as_str())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %key, "S3 delete failed");
                StoreError::Backend(format!("Failed to delete {} from S3: {}", key, e))
            })?;

        Ok(())
    }

    fn public_url(&self, key: &ObjectKey) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
