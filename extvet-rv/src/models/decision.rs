//! Decision pipeline state machine and bookkeeping records
//!
//! One pipeline execution per request progresses through:
//! Received → StoreChecked → {Resolved | AiPending} → Resolved

use chrono::{DateTime, Utc};
use extvet_common::models::{ExtensionRequest, Recommendation, RequestStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stage of one decision-pipeline execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionStage {
    /// Request accepted, nothing evaluated yet
    Received,
    /// Classification store consulted
    StoreChecked,
    /// Store returned unlisted; provider pipeline running
    AiPending,
    /// Terminal outcome produced
    Resolved,
}

impl DecisionStage {
    /// Whether `next` is a legal transition from this stage
    pub fn can_transition_to(&self, next: DecisionStage) -> bool {
        use DecisionStage::*;
        matches!(
            (*self, next),
            (Received, StoreChecked)
                | (StoreChecked, AiPending)
                | (StoreChecked, Resolved)
                | (AiPending, Resolved)
        )
    }

    /// Check if the stage is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, DecisionStage::Resolved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStage::Received => "RECEIVED",
            DecisionStage::StoreChecked => "STORE_CHECKED",
            DecisionStage::AiPending => "AI_PENDING",
            DecisionStage::Resolved => "RESOLVED",
        }
    }
}

impl fmt::Display for DecisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of the pipeline for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Outcome kind
    pub status: RequestStatus,
    /// Human-readable decision message
    pub message: String,
    /// Present only for the ai-analysis outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

impl Decision {
    /// Decision with no attached recommendation
    pub fn plain(status: RequestStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            recommendation: None,
        }
    }
}

/// Outcome a reviewer may override a record to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    Approved,
    Rejected,
}

impl ReviewOutcome {
    pub fn as_status(&self) -> RequestStatus {
        match self {
            ReviewOutcome::Approved => RequestStatus::Approved,
            ReviewOutcome::Rejected => RequestStatus::Rejected,
        }
    }
}

/// Bookkeeping record of a past decision (in-memory)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Unique record identifier
    pub id: Uuid,
    /// The originating request
    pub request: ExtensionRequest,
    /// Terminal status (may be overridden by review)
    pub status: RequestStatus,
    /// Decision message shown to the requester
    pub message: String,
    /// AI recommendation, for ai-analysis outcomes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    /// Submission time
    pub submitted_at: DateTime<Utc>,
    /// Review override time, if reviewed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer notes, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

impl DecisionRecord {
    /// Create a record for a freshly resolved request
    pub fn new(request: ExtensionRequest, decision: Decision) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            status: decision.status,
            message: decision.message,
            recommendation: decision.recommendation,
            submitted_at: Utc::now(),
            reviewed_at: None,
            admin_notes: None,
        }
    }

    /// Apply a review override
    pub fn apply_review(&mut self, outcome: ReviewOutcome, admin_notes: Option<String>) {
        self.status = outcome.as_status();
        self.reviewed_at = Some(Utc::now());
        self.admin_notes = admin_notes;
    }
}
