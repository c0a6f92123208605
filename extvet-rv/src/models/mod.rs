//! Data models for extvet-rv (Request Vetting microservice)

pub mod decision;

pub use decision::{Decision, DecisionRecord, DecisionStage, ReviewOutcome};
