//! In-memory decision history
//!
//! Every terminal pipeline outcome is recorded here, including fail-closed
//! rejections, so the review surface sees exactly what requesters saw.
//! Cloning the handle shares the underlying store.

use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::decision::{DecisionRecord, ReviewOutcome};

#[derive(Clone, Default)]
pub struct DecisionLog {
    records: Arc<RwLock<Vec<DecisionRecord>>>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, record: DecisionRecord) {
        self.records.write().await.push(record);
    }

    /// All records, newest first
    pub async fn list(&self) -> Vec<DecisionRecord> {
        let records = self.records.read().await;
        records.iter().rev().cloned().collect()
    }

    pub async fn get(&self, id: Uuid) -> Option<DecisionRecord> {
        self.records.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Apply a review override; returns the updated record, or `None` when
    /// the id is unknown
    pub async fn review(
        &self,
        id: Uuid,
        outcome: ReviewOutcome,
        admin_notes: Option<String>,
    ) -> Option<DecisionRecord> {
        let mut records = self.records.write().await;
        let record = records.iter_mut().find(|r| r.id == id)?;
        record.apply_review(outcome, admin_notes);
        Some(record.clone())
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::decision::Decision;
    use extvet_common::models::{Category, ExtensionRequest, RequestStatus};

    fn record(name: &str) -> DecisionRecord {
        DecisionRecord::new(
            ExtensionRequest {
                user_name: "Dana".to_string(),
                email: "dana@example.com".to_string(),
                extension_name: name.to_string(),
                extension_id: name.to_lowercase().replace(' ', ""),
                extension_category: Category::Productivity,
                reason: None,
            },
            Decision::plain(RequestStatus::Approved, "already approved"),
        )
    }

    #[tokio::test]
    async fn test_list_returns_newest_first() {
        let log = DecisionLog::new();
        log.append(record("First")).await;
        log.append(record("Second")).await;

        let listed = log.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].request.extension_name, "Second");
        assert_eq!(listed[1].request.extension_name, "First");
    }

    #[tokio::test]
    async fn test_review_updates_the_stored_record() {
        let log = DecisionLog::new();
        let stored = record("Helper");
        let id = stored.id;
        log.append(stored).await;

        let updated = log
            .review(id, ReviewOutcome::Rejected, Some("policy".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.status, RequestStatus::Rejected);

        let fetched = log.get(id).await.unwrap();
        assert_eq!(fetched.status, RequestStatus::Rejected);
        assert_eq!(fetched.admin_notes.as_deref(), Some("policy"));
    }

    #[tokio::test]
    async fn test_review_of_unknown_id_is_none() {
        let log = DecisionLog::new();
        assert!(log.review(Uuid::new_v4(), ReviewOutcome::Approved, None).await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_the_store() {
        let log = DecisionLog::new();
        let other = log.clone();
        log.append(record("Shared")).await;
        assert_eq!(other.len().await, 1);
    }
}
