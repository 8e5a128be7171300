//! Per-call deduction audit entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::TransactionRef;

/// Outcome record written once per deduction call, success or failure.
///
/// Keyed by transaction reference so reconciliation tooling can pair sales
/// against their inventory effect and spot calls that never completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionAudit {
    pub transaction_ref: TransactionRef,
    pub status: SyncStatus,
    /// Ingredients processed before the call finished or failed.
    pub items_processed: i32,
    pub error_detail: Option<String>,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

/// Terminal status of one deduction call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Success,
    Failed,
}

impl SyncStatus {
    /// Database/text representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}
