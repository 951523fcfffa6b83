//! Application state.

use std::sync::Arc;

use hotscore_gradio::{GradioClient, GradioClientConfig, GradioResult};

use crate::config::ApiConfig;
use crate::relay::PredictionRelay;

/// Shared application state. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub relay: Arc<PredictionRelay>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig, gradio: GradioClientConfig) -> GradioResult<Self> {
        let client = GradioClient::new(gradio)?;
        Ok(Self::with_client(config, client))
    }

    /// Create state around an already built client.
    pub fn with_client(config: ApiConfig, client: GradioClient) -> Self {
        Self {
            config,
            relay: Arc::new(PredictionRelay::new(client)),
        }
    }
}
