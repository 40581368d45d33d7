use serde::{Deserialize, Serialize};

use crate::record::RecordBatch;

/// Coarse label for what a batch contains, taken from the first record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Transactions,
    UserActivity,
    Generic,
}

impl DataKind {
    pub fn infer(batch: &RecordBatch) -> Self {
        match batch.first() {
            Some(r) if r.has_field("transaction") => DataKind::Transactions,
            Some(r) if r.has_field("user") => DataKind::UserActivity,
            _ => DataKind::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Transactions => "transactions",
            DataKind::UserActivity => "user_activity",
            DataKind::Generic => "generic",
        }
    }
}
