//! Spaces client implementation.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::object_store::ObjectStore;

/// Configuration for the Spaces client.
#[derive(Debug, Clone)]
pub struct SpacesConfig {
    /// Spaces endpoint URL (S3 API endpoint)
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region (e.g. "fra1")
    pub region: String,
}

impl SpacesConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("SPACES_ENDPOINT_URL")
                .unwrap_or_else(|_| "https://fra1.digitaloceanspaces.com".to_string()),
            access_key_id: std::env::var("SPACES_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("SPACES_ACCESS_KEY not set"))?,
            secret_access_key: std::env::var("SPACES_SECRET_KEY")
                .map_err(|_| StorageError::config_error("SPACES_SECRET_KEY not set"))?,
            bucket_name: std::env::var("SPACES_BUCKET")
                .map_err(|_| StorageError::config_error("SPACES_BUCKET not set"))?,
            region: std::env::var("SPACES_REGION").unwrap_or_else(|_| "fra1".to_string()),
        })
    }
}

/// DigitalOcean Spaces storage client.
#[derive(Clone)]
pub struct SpacesClient {
    client: Client,
    bucket: String,
}

impl SpacesClient {
    /// Create a new Spaces client from configuration.
    pub fn new(config: SpacesConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "spaces",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self::new(SpacesConfig::from_env()?))
    }
}

#[async_trait]
impl ObjectStore for SpacesClient {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(StorageError::AwsSdk(e.to_string()))
                }
            }
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        debug!("Deleting {}", key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(e.to_string()))?;

        info!("Deleted {}", key);
        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// Head the bucket; any failure means not ready.
    async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("Spaces connectivity check failed: {}", e)))?;
        Ok(())
    }
}
