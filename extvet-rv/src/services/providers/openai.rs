//! OpenAI provider placeholder
//!
//! Listed by the factory so the settings surface is honest about planned
//! backends, but every operation fails. The decision engine treats those
//! failures like any other provider failure and resolves fail-closed.

use async_trait::async_trait;

use extvet_common::models::{Extension, Verdict};

use super::{AiProvider, AnalyzedItem, ProviderError};

const DISPLAY_NAME: &str = "OpenAI";

pub struct OpenAiProvider;

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn analyze(
        &self,
        _extension_id: &str,
        _extension_name: &str,
    ) -> Result<AnalyzedItem, ProviderError> {
        Err(ProviderError::NotImplemented {
            provider: DISPLAY_NAME,
        })
    }

    async fn find_comparable(
        &self,
        _extension: &Extension,
    ) -> Result<Vec<Extension>, ProviderError> {
        Err(ProviderError::NotImplemented {
            provider: DISPLAY_NAME,
        })
    }

    async fn recommend(
        &self,
        _extension: &Extension,
        _approved: &[Extension],
    ) -> Result<Verdict, ProviderError> {
        Err(ProviderError::NotImplemented {
            provider: DISPLAY_NAME,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extvet_common::models::Category;

    #[tokio::test]
    async fn test_every_operation_reports_not_implemented() {
        let provider = OpenAiProvider;
        assert_eq!(provider.name(), "openai");

        let analysis = provider.analyze("id", "Some Extension").await;
        let message = analysis.unwrap_err().to_string();
        assert_eq!(
            message,
            "OpenAI provider not implemented yet. Use the gemini provider."
        );

        let extension = Extension {
            id: "id".to_string(),
            name: "Some Extension".to_string(),
            category: Category::Other,
            rating: 4.0,
            description: String::new(),
            functionality: String::new(),
            use_case: String::new(),
            users: 1,
            last_updated: "2024-01-01".to_string(),
        };
        assert!(provider.find_comparable(&extension).await.is_err());
        assert!(provider.recommend(&extension, &[]).await.is_err());
    }
}
