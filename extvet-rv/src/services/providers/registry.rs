//! Active-provider registry
//!
//! Owns the currently selected provider plus the default credential used for
//! lazy initialization. There is no module-level global: the registry lives
//! in application state and is handed to the decision engine explicitly, so
//! tests can run isolated registries side by side.

use std::sync::Arc;
use tokio::sync::RwLock;

use extvet_common::config::is_valid_key;

use super::{factory, AiProvider, ProviderError};

pub struct ProviderRegistry {
    active: RwLock<Option<Arc<dyn AiProvider>>>,
    default_credential: Option<String>,
}

impl ProviderRegistry {
    /// Registry with no active provider. `default_credential` (from startup
    /// configuration) feeds lazy Gemini initialization on first use.
    pub fn new(default_credential: Option<String>) -> Self {
        Self {
            active: RwLock::new(None),
            default_credential,
        }
    }

    /// Names configurable through the settings surface
    pub fn available(&self) -> Vec<&'static str> {
        factory::list_available()
    }

    /// Name of the active provider, if one is configured
    pub async fn active_name(&self) -> Option<&'static str> {
        self.active.read().await.as_ref().map(|p| p.name())
    }

    /// Swap in a provider built from an explicit name and credential
    pub async fn configure(
        &self,
        name: &str,
        credential: &str,
    ) -> Result<&'static str, ProviderError> {
        if credential.trim().is_empty() {
            return Err(ProviderError::MissingCredential {
                provider: name.to_string(),
            });
        }

        let provider = factory::create(name, credential)?;
        let provider_name = provider.name();
        *self.active.write().await = Some(provider);

        tracing::info!(provider = provider_name, "AI provider configured");
        Ok(provider_name)
    }

    /// Install an already built provider. Tests inject scripted providers
    /// through this.
    pub async fn install(&self, provider: Arc<dyn AiProvider>) {
        let name = provider.name();
        *self.active.write().await = Some(provider);
        tracing::info!(provider = name, "AI provider installed");
    }

    /// The active provider, lazily initializing Gemini from the default
    /// credential the first time one is needed
    pub async fn ensure_initialized(&self) -> Result<Arc<dyn AiProvider>, ProviderError> {
        {
            let active = self.active.read().await;
            if let Some(provider) = active.as_ref() {
                return Ok(Arc::clone(provider));
            }
        }

        let credential = self
            .default_credential
            .as_deref()
            .filter(|c| is_valid_key(c))
            .ok_or(ProviderError::NotConfigured)?;

        let mut active = self.active.write().await;
        // Another task may have initialized while we waited for the lock
        if let Some(provider) = active.as_ref() {
            return Ok(Arc::clone(provider));
        }

        let provider = factory::create("gemini", credential)?;
        tracing::info!("AI provider lazily initialized from default credential");
        *active = Some(Arc::clone(&provider));
        Ok(provider)
    }
}
