// Reconciliation run entities

use serde::{Deserialize, Serialize};

use crate::value_objects::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReindexMode {
    /// Clear every eligible index and upload the full listing.
    Full,
    /// Add listings whose name has no exact match in the index.
    Incremental,
}

impl ReindexMode {
    pub fn from_init(init: bool) -> Self {
        if init {
            ReindexMode::Full
        } else {
            ReindexMode::Incremental
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReindexMode::Full => "full",
            ReindexMode::Incremental => "incremental",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReindexStatus {
    Completed,
    Aborted { language: Language, cause: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexReport {
    pub mode: ReindexMode,
    /// Documents added or replaced before the run ended.
    pub added: usize,
    pub status: ReindexStatus,
}

impl ReindexReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, ReindexStatus::Completed)
    }
}
