//! Application state shared across routes.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use fview_ai_client::{AiServiceClient, AiServiceConfig, Dispatch};
use fview_storage::{ObjectStore, SpacesClient, SpacesConfig};
use fview_store::{MemoryVideoStore, VideoStore};

use crate::config::ApiConfig;
use crate::services::{DispatchOptions, ProcessingService, QueryService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub storage: Arc<dyn ObjectStore>,
    pub processing: ProcessingService,
    pub query: QueryService,
}

impl AppState {
    /// Build state from the environment.
    pub async fn new(config: ApiConfig) -> Result<Self> {
        let spaces_config = SpacesConfig::from_env()?;
        let storage: Arc<dyn ObjectStore> = Arc::new(SpacesClient::new(spaces_config));
        info!("Storage client initialized");

        let ai_config = AiServiceConfig::from_env();
        let callback_url = ai_config.callback_url();
        let dispatcher: Arc<dyn Dispatch> = Arc::new(AiServiceClient::new(ai_config)?);
        info!("AI service client initialized");

        // Single-node record store; a durable backend slots in behind the trait
        let store: Arc<dyn VideoStore> = Arc::new(MemoryVideoStore::new());

        Ok(Self::with_collaborators(config, store, storage, dispatcher, callback_url))
    }

    /// Build state from explicit collaborators.
    pub fn with_collaborators(
        config: ApiConfig,
        store: Arc<dyn VideoStore>,
        storage: Arc<dyn ObjectStore>,
        dispatcher: Arc<dyn Dispatch>,
        callback_url: String,
    ) -> Self {
        let options = DispatchOptions {
            callback_url,
            stub_mode: config.stub_mode,
            preserve_audio: config.preserve_audio,
        };

        let processing = ProcessingService::new(Arc::clone(&store), dispatcher, options);
        let query = QueryService::new(store, Arc::clone(&storage), config.download_url_ttl);

        Self {
            config: Arc::new(config),
            storage,
            processing,
            query,
        }
    }
}
