//! AI provider capability
//!
//! A provider performs three operations, always invoked in strict sequence by
//! the decision engine: analyze the requested extension, find comparable
//! extensions, and produce an approve/deny verdict. Two implementations
//! exist: [`gemini::GeminiProvider`] (remote generative model) and
//! [`openai::OpenAiProvider`] (placeholder that always fails, proving the
//! trait is backend-agnostic).

pub mod factory;
pub mod fallback;
pub mod gemini;
pub mod openai;
pub mod parse;
pub mod prompts;
pub mod registry;

pub use registry::ProviderRegistry;

use extvet_common::models::{AnalysisSource, Extension, Verdict};
use thiserror::Error;

/// Provider-level failures that reach the decision engine.
///
/// Operational upstream trouble (rate limits, empty or malformed responses)
/// never surfaces here: the Gemini implementation converts those into
/// fallback results internally.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No active provider and no default credential available
    #[error(
        "AI provider not configured. Set {env} or configure one via POST /api/settings/provider",
        env = extvet_common::config::GEMINI_API_KEY_ENV
    )]
    NotConfigured,

    /// Provider name outside the registered set
    #[error("AI Provider '{name}' not found. Available providers: gemini, openai")]
    UnknownProvider { name: String },

    /// Blank credential passed to configuration
    #[error("API key is required for {provider} provider")]
    MissingCredential { provider: String },

    /// Placeholder provider invoked
    #[error("{provider} provider not implemented yet. Use the gemini provider.")]
    NotImplemented { provider: &'static str },

    /// Provider construction failed (HTTP client setup)
    #[error("Failed to initialize {provider} provider: {message}")]
    Init {
        provider: &'static str,
        message: String,
    },
}

/// Profile produced by `analyze`, with provenance.
///
/// `source` distinguishes a model-produced profile from the local fallback;
/// `defaulted_fields` names numeric fields the model did deliver a response
/// for but whose values could not be coerced and were substituted with
/// bounded defaults. Degraded data stays inspectable instead of passing as
/// genuine model output.
#[derive(Debug, Clone)]
pub struct AnalyzedItem {
    pub extension: Extension,
    pub source: AnalysisSource,
    pub defaulted_fields: Vec<&'static str>,
}

impl AnalyzedItem {
    pub fn from_model(extension: Extension, defaulted_fields: Vec<&'static str>) -> Self {
        Self {
            extension,
            source: AnalysisSource::Model,
            defaulted_fields,
        }
    }

    pub fn from_fallback(extension: Extension) -> Self {
        Self {
            extension,
            source: AnalysisSource::Fallback,
            defaulted_fields: Vec::new(),
        }
    }
}

/// A pluggable AI analysis backend.
///
/// Implementations must be safe to share across concurrent requests: the
/// operations hold no per-call state beyond their arguments.
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    /// Short provider name ("gemini", "openai")
    fn name(&self) -> &'static str;

    /// Produce a structured profile for an extension known only by id and name.
    ///
    /// # Arguments
    /// * `extension_id` - Store-style identifier from the request
    /// * `extension_name` - Display name from the request
    ///
    /// # Returns
    /// The enriched profile with provenance. The Gemini implementation never
    /// fails here (it falls back locally); the placeholder provider does.
    async fn analyze(
        &self,
        extension_id: &str,
        extension_name: &str,
    ) -> Result<AnalyzedItem, ProviderError>;

    /// Find 3-5 extensions plausibly similar in category and function.
    async fn find_comparable(&self, extension: &Extension)
        -> Result<Vec<Extension>, ProviderError>;

    /// Decide approve/deny for the requested extension, given the approved
    /// partition as context.
    async fn recommend(
        &self,
        extension: &Extension,
        approved: &[Extension],
    ) -> Result<Verdict, ProviderError>;
}

impl std::fmt::Debug for dyn AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiProvider")
            .field("name", &self.name())
            .finish()
    }
}

/// Approved items that overlap the requested extension: same category, or
/// functionality text containing the requested name (case-insensitive).
/// These are surfaced as suggested alternatives and lean the verdict toward
/// deny.
pub fn overlapping_approved(requested: &Extension, approved: &[Extension]) -> Vec<Extension> {
    let needle = requested.name.to_lowercase();
    approved
        .iter()
        .filter(|ext| {
            ext.category == requested.category
                || ext.functionality.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use extvet_common::models::Category;

    fn ext(name: &str, category: Category, functionality: &str) -> Extension {
        Extension {
            id: name.to_lowercase().replace(' ', ""),
            name: name.to_string(),
            category,
            rating: 4.5,
            description: String::new(),
            functionality: functionality.to_string(),
            use_case: String::new(),
            users: 1_000_000,
            last_updated: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn overlap_matches_by_category_or_functionality_text() {
        let requested = ext("AdShield", Category::PrivacySecurity, "Blocks ads");
        let approved = vec![
            ext("uBlock Origin", Category::PrivacySecurity, "Blocks ads and trackers"),
            ext("Honey", Category::Shopping, "Finds coupons"),
            ext(
                "Bundle Tools",
                Category::Productivity,
                "Task helper bundled with adshield integration",
            ),
        ];

        let overlap = overlapping_approved(&requested, &approved);
        let names: Vec<&str> = overlap.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["uBlock Origin", "Bundle Tools"]);
    }

    #[test]
    fn no_overlap_for_distinct_category_and_name() {
        let requested = ext("Grammarly", Category::Productivity, "Grammar checking");
        let approved = vec![ext("uBlock Origin", Category::PrivacySecurity, "Blocks ads")];
        assert!(overlapping_approved(&requested, &approved).is_empty());
    }
}
