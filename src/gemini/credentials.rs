use crate::{config::GeminiConfig, error::Result, traits::CredentialProvider};
use async_trait::async_trait;
use std::env;
use tokio::sync::RwLock;

/// Key taken from configuration first, then the environment. Selecting a
/// credential re-reads `.env` and the process environment.
pub struct EnvCredentials {
    key: RwLock<Option<String>>,
}

impl EnvCredentials {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            key: RwLock::new(config.api_key.clone().or_else(Self::read_env)),
        }
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: RwLock::new(Some(key.into())),
        }
    }

    fn read_env() -> Option<String> {
        env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentials {
    async fn api_key(&self) -> Option<String> {
        self.key.read().await.clone()
    }

    async fn has_credential(&self) -> bool {
        self.key.read().await.is_some()
    }

    async fn request_credential_selection(&self) -> Result<()> {
        log::warn!("🔑 Select an API key: set GEMINI_API_KEY in the environment or .env");
        dotenv::dotenv().ok();

        let refreshed = Self::read_env();
        let mut key = self.key.write().await;
        if refreshed.is_some() && refreshed != *key {
            log::info!("🔑 Picked up a new API key from the environment");
            *key = refreshed;
        }
        Ok(())
    }
}
