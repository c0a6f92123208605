//! Business logic for request vetting

pub mod catalog;
pub mod decision_engine;
pub mod decision_log;
pub mod providers;

pub use catalog::{Catalog, CatalogStatus};
pub use decision_engine::DecisionEngine;
pub use decision_log::DecisionLog;
