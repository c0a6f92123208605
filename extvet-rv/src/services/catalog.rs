//! Classification catalog: the approved / blocked / rejected partitions
//!
//! Static reference data loaded once at startup, never mutated. Seeded from
//! an embedded JSON snapshot; a deployment may point `catalog_path` at a file
//! with the same shape instead.

use extvet_common::models::Extension;
use extvet_common::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Embedded seed partitions
const SEED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Classification result for an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStatus {
    Approved,
    Blocked,
    Rejected,
    /// Not present in any partition; the AI pipeline decides
    Unlisted,
}

impl CatalogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogStatus::Approved => "approved",
            CatalogStatus::Blocked => "blocked",
            CatalogStatus::Rejected => "rejected",
            CatalogStatus::Unlisted => "unlisted",
        }
    }
}

impl fmt::Display for CatalogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk / embedded catalog shape
#[derive(Debug, Deserialize)]
struct CatalogFile {
    approved: Vec<Extension>,
    blocked: Vec<Extension>,
    rejected: Vec<Extension>,
}

/// Read-only classification store
#[derive(Debug)]
pub struct Catalog {
    approved: Vec<Extension>,
    blocked: Vec<Extension>,
    rejected: Vec<Extension>,
}

impl Catalog {
    /// Catalog from the embedded seed data
    pub fn builtin() -> Result<Catalog> {
        let file: CatalogFile = serde_json::from_str(SEED_CATALOG)
            .map_err(|e| Error::Internal(format!("Embedded catalog is invalid: {}", e)))?;
        Ok(Catalog::from_partitions(file.approved, file.blocked, file.rejected))
    }

    /// Catalog from a JSON file with the same shape as the embedded seed
    pub fn from_file(path: &Path) -> Result<Catalog> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        let file: CatalogFile = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse catalog {}: {}", path.display(), e))
        })?;
        Ok(Catalog::from_partitions(file.approved, file.blocked, file.rejected))
    }

    /// Catalog from explicit partitions
    pub fn from_partitions(
        approved: Vec<Extension>,
        blocked: Vec<Extension>,
        rejected: Vec<Extension>,
    ) -> Catalog {
        let catalog = Catalog {
            approved,
            blocked,
            rejected,
        };
        catalog.warn_on_duplicate_ids();
        info!(
            approved = catalog.approved.len(),
            blocked = catalog.blocked.len(),
            rejected = catalog.rejected.len(),
            "Classification catalog loaded"
        );
        catalog
    }

    /// Classify an identifier. Pure, total, deterministic.
    pub fn status_of(&self, extension_id: &str) -> CatalogStatus {
        if self.approved.iter().any(|e| e.id == extension_id) {
            return CatalogStatus::Approved;
        }
        if self.blocked.iter().any(|e| e.id == extension_id) {
            return CatalogStatus::Blocked;
        }
        if self.rejected.iter().any(|e| e.id == extension_id) {
            return CatalogStatus::Rejected;
        }
        CatalogStatus::Unlisted
    }

    /// Find an item across all partitions (approved → blocked → rejected)
    pub fn find(&self, extension_id: &str) -> Option<&Extension> {
        self.iter_all().find(|e| e.id == extension_id)
    }

    /// The approved partition, as context for recommendations
    pub fn approved(&self) -> &[Extension] {
        &self.approved
    }

    // Partitions are disjoint by construction of the seed data; this is not
    // enforced at runtime. Lookup order approved → blocked → rejected means a
    // duplicate id resolves to the first partition carrying it.
    fn warn_on_duplicate_ids(&self) {
        let mut seen: HashSet<&str> = HashSet::new();
        for ext in self.iter_all() {
            if !seen.insert(ext.id.as_str()) {
                warn!(
                    extension_id = %ext.id,
                    "Extension id appears in more than one catalog partition"
                );
            }
        }
    }

    fn iter_all(&self) -> impl Iterator<Item = &Extension> {
        self.approved
            .iter()
            .chain(self.blocked.iter())
            .chain(self.rejected.iter())
    }
}
