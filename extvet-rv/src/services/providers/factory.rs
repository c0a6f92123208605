//! Provider construction by name

use std::sync::Arc;

use super::gemini::GeminiProvider;
use super::openai::OpenAiProvider;
use super::{AiProvider, ProviderError};

/// Names the factory accepts, in presentation order
pub const PROVIDER_NAMES: [&str; 2] = ["gemini", "openai"];

/// Build a provider by (case-insensitive) name
pub fn create(name: &str, credential: &str) -> Result<Arc<dyn AiProvider>, ProviderError> {
    let normalized = name.trim().to_lowercase();

    if !PROVIDER_NAMES.contains(&normalized.as_str()) {
        return Err(ProviderError::UnknownProvider {
            name: name.to_string(),
        });
    }

    if credential.trim().is_empty() {
        return Err(ProviderError::MissingCredential {
            provider: normalized,
        });
    }

    match normalized.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(credential)?)),
        _ => Ok(Arc::new(OpenAiProvider)),
    }
}

/// Provider names for the settings surface
pub fn list_available() -> Vec<&'static str> {
    PROVIDER_NAMES.to_vec()
}
