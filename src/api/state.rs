use std::sync::Arc;

use crate::ai::Extractor;
use crate::core::AppConfig;
use crate::google::CredentialManager;
use crate::meeting::EventMaterializer;

pub struct AppState {
    pub extractor: Extractor,
    pub materializer: EventMaterializer,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        // One manager for the whole process so credential acquisition
        // is serialized across requests
        let credentials = Arc::new(CredentialManager::new(&config));
        Self {
            extractor: Extractor::new(&config.ollama_base_url, &config.ollama_model),
            materializer: EventMaterializer::new(&config, credentials),
        }
    }
}
