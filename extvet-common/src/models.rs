//! Shared domain model for extvet services
//!
//! Catalog items, submitted requests, and the recommendation types produced
//! by the decision pipeline. All wire types serialize as snake_case JSON
//! except `Category`, which uses its human-readable labels.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Extension category, drawn from a fixed label set.
///
/// Serialized with the display labels (e.g. "Privacy & Security"). Unknown
/// labels deserialize to `Other` so model-produced category text never
/// poisons an otherwise valid profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    PrivacySecurity,
    DeveloperTools,
    Productivity,
    Shopping,
    Accessibility,
    Entertainment,
    Other,
}

impl Category {
    /// All categories, in the order presented to the model.
    pub const ALL: [Category; 7] = [
        Category::PrivacySecurity,
        Category::DeveloperTools,
        Category::Productivity,
        Category::Shopping,
        Category::Accessibility,
        Category::Entertainment,
        Category::Other,
    ];

    /// Display label for this category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::PrivacySecurity => "Privacy & Security",
            Category::DeveloperTools => "Developer Tools",
            Category::Productivity => "Productivity",
            Category::Shopping => "Shopping",
            Category::Accessibility => "Accessibility",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }

    /// Parse a label, case-insensitively; anything unrecognized is `Other`
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Category::from_label(&label))
    }
}

/// A catalog item: either static reference data in one of the classification
/// partitions, or an ephemeral profile produced by the AI provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    /// Unique identifier (store-style id string)
    pub id: String,
    /// Display name
    pub name: String,
    /// Category from the fixed label set
    pub category: Category,
    /// Rating in [1.0, 5.0]
    pub rating: f64,
    /// Concise description
    pub description: String,
    /// Core features and capabilities
    pub functionality: String,
    /// Primary use cases and target audience
    pub use_case: String,
    /// Estimated user count
    pub users: u64,
    /// Last-updated date (YYYY-MM-DD; free-form when model-produced)
    pub last_updated: String,
}

/// A user-submitted request to use an extension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionRequest {
    /// Requester display name
    pub user_name: String,
    /// Requester contact address
    pub email: String,
    /// Target extension name
    pub extension_name: String,
    /// Target extension identifier
    pub extension_id: String,
    /// Requester-supplied category
    pub extension_category: Category,
    /// Optional free-text justification
    pub reason: Option<String>,
}

/// Terminal outcome kind for a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    /// Already approved and available
    Approved,
    /// On the blocked partition
    Blocked,
    /// Previously rejected, or resolved fail-closed
    Rejected,
    /// Resolved by the AI pipeline; see the attached recommendation
    AiAnalysis,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Approved => "approved",
            RequestStatus::Blocked => "blocked",
            RequestStatus::Rejected => "rejected",
            RequestStatus::AiAnalysis => "ai-analysis",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an analyzed profile came from the model or from the local
/// fallback computation. Kept on the wire so reviewers can see degraded
/// results for what they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Model,
    Fallback,
}

/// Approve/deny decision produced by the recommendation step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Approve (true) or deny (false)
    pub approved: bool,
    /// Human-readable justification
    pub reason: String,
    /// Model-reported security concerns, when any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_concerns: Option<String>,
    /// Already-approved alternatives to suggest when denying
    pub alternatives: Vec<Extension>,
}

/// Full output of the AI-analysis path for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Enriched profile of the requested extension
    pub current_extension: Extension,
    /// Comparable extensions discovered by the provider
    pub similar_extensions: Vec<Extension>,
    /// The approve/deny verdict
    pub verdict: Verdict,
    /// Provenance of the analyzed profile
    pub analysis_source: AnalysisSource,
}
