//! Decision engine
//!
//! Runs one pipeline execution per submitted request:
//!
//! - Received → StoreChecked → Resolved (identifier listed in the catalog)
//! - Received → StoreChecked → AiPending → Resolved (unlisted, AI path)
//!
//! The catalog check always wins: a listed identifier resolves without any
//! provider involvement. The AI path is fail-closed: any provider failure
//! resolves the request as rejected with a generic message rather than
//! leaving it undecided or surfacing internals to the requester.

use std::sync::Arc;
use tokio::sync::RwLock;

use extvet_common::models::{Extension, ExtensionRequest, Recommendation, RequestStatus};
use extvet_common::{Error, Result};

use crate::models::decision::{Decision, DecisionRecord, DecisionStage};
use crate::services::catalog::{Catalog, CatalogStatus};
use crate::services::decision_log::DecisionLog;
use crate::services::providers::{ProviderError, ProviderRegistry};

const BLOCKED_FALLBACK_DESCRIPTION: &str =
    "This extension has been flagged as potentially harmful.";
const REJECTED_FALLBACK_DESCRIPTION: &str =
    "This extension does not meet our policy requirements.";
const AI_ANALYSIS_MESSAGE: &str =
    "AI analysis completed. Please review the recommendation below.";
const PROCESSING_ERROR_MESSAGE: &str =
    "An error occurred while processing your request. Please try again later.";

/// Stage tracker for one pipeline execution
struct Pipeline {
    stage: DecisionStage,
}

impl Pipeline {
    fn start() -> Self {
        Self {
            stage: DecisionStage::Received,
        }
    }

    fn advance(&mut self, next: DecisionStage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "illegal stage transition {} -> {}",
            self.stage,
            next
        );
        tracing::debug!(from = %self.stage, to = %next, "Decision stage advanced");
        self.stage = next;
    }
}

/// Orchestrates catalog lookup, the provider pipeline, and record keeping.
/// Cloning shares the underlying catalog, registry, and log.
#[derive(Clone)]
pub struct DecisionEngine {
    catalog: Arc<Catalog>,
    registry: Arc<ProviderRegistry>,
    log: DecisionLog,
    last_error: Arc<RwLock<Option<String>>>,
}

impl DecisionEngine {
    pub fn new(
        catalog: Arc<Catalog>,
        registry: Arc<ProviderRegistry>,
        log: DecisionLog,
        last_error: Arc<RwLock<Option<String>>>,
    ) -> Self {
        Self {
            catalog,
            registry,
            log,
            last_error,
        }
    }

    /// Decide one request and record the outcome.
    ///
    /// Returns an error only for invalid input; every accepted request ends
    /// in a recorded terminal decision.
    pub async fn submit(&self, request: ExtensionRequest) -> Result<DecisionRecord> {
        validate(&request)?;

        let mut pipeline = Pipeline::start();
        tracing::info!(
            extension = %request.extension_name,
            extension_id = %request.extension_id,
            "Extension request received"
        );

        pipeline.advance(DecisionStage::StoreChecked);
        let decision = match self.catalog.status_of(&request.extension_id) {
            CatalogStatus::Approved => Decision::plain(
                RequestStatus::Approved,
                approved_message(&request.extension_name),
            ),
            CatalogStatus::Blocked => Decision::plain(
                RequestStatus::Blocked,
                blocked_message(
                    &request.extension_name,
                    self.catalog.find(&request.extension_id),
                ),
            ),
            CatalogStatus::Rejected => Decision::plain(
                RequestStatus::Rejected,
                rejected_message(
                    &request.extension_name,
                    self.catalog.find(&request.extension_id),
                ),
            ),
            CatalogStatus::Unlisted => {
                pipeline.advance(DecisionStage::AiPending);
                self.run_ai_path(&request).await
            }
        };

        pipeline.advance(DecisionStage::Resolved);
        tracing::info!(
            extension = %request.extension_name,
            status = %decision.status,
            "Request resolved"
        );

        let record = DecisionRecord::new(request, decision);
        self.log.append(record.clone()).await;
        Ok(record)
    }

    async fn run_ai_path(&self, request: &ExtensionRequest) -> Decision {
        match self.analyze_request(request).await {
            Ok(recommendation) => Decision {
                status: RequestStatus::AiAnalysis,
                message: AI_ANALYSIS_MESSAGE.to_string(),
                recommendation: Some(recommendation),
            },
            Err(err) => {
                tracing::error!(
                    extension = %request.extension_name,
                    error = %err,
                    "AI pipeline failed, resolving fail-closed"
                );
                *self.last_error.write().await = Some(err.to_string());
                Decision::plain(RequestStatus::Rejected, PROCESSING_ERROR_MESSAGE)
            }
        }
    }

    /// The three provider operations, strictly in order: analyze, then find
    /// comparable extensions, then recommend.
    async fn analyze_request(
        &self,
        request: &ExtensionRequest,
    ) -> std::result::Result<Recommendation, ProviderError> {
        let provider = self.registry.ensure_initialized().await?;

        let analyzed = provider
            .analyze(&request.extension_id, &request.extension_name)
            .await?;
        let similar = provider.find_comparable(&analyzed.extension).await?;
        let verdict = provider
            .recommend(&analyzed.extension, self.catalog.approved())
            .await?;

        Ok(Recommendation {
            current_extension: analyzed.extension,
            similar_extensions: similar,
            verdict,
            analysis_source: analyzed.source,
        })
    }
}

fn validate(request: &ExtensionRequest) -> Result<()> {
    let required = [
        ("user_name", &request.user_name),
        ("email", &request.email),
        ("extension_name", &request.extension_name),
        ("extension_id", &request.extension_id),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(Error::InvalidInput(format!("{} must not be blank", field)));
        }
    }
    if !request.email.contains('@') {
        return Err(Error::InvalidInput(
            "email must be a valid address".to_string(),
        ));
    }
    Ok(())
}

fn approved_message(name: &str) -> String {
    format!(
        "Extension \"{}\" is already approved and available for use.",
        name
    )
}

fn blocked_message(name: &str, stored: Option<&Extension>) -> String {
    let description = stored
        .map(|e| e.description.trim())
        .filter(|d| !d.is_empty())
        .unwrap_or(BLOCKED_FALLBACK_DESCRIPTION);
    format!(
        "Extension \"{}\" is blocked due to security concerns. {}",
        name, description
    )
}

fn rejected_message(name: &str, stored: Option<&Extension>) -> String {
    let description = stored
        .map(|e| e.description.trim())
        .filter(|d| !d.is_empty())
        .unwrap_or(REJECTED_FALLBACK_DESCRIPTION);
    format!(
        "Extension \"{}\" has been previously rejected. {}",
        name, description
    )
}
