use thiserror::Error;

use crate::store::StoreError;
use crate::table::TableError;

/// Failure classes of the aggregation pipeline.
///
/// `SummaryRead` is recovered inside the rollup and never escapes it; every other
/// variant is fatal for the invocation that raised it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed trigger payload: {0}")]
    MalformedTrigger(String),

    #[error("failed to read source object {bucket}/{key}: {reason}")]
    SourceRead { bucket: String, key: String, reason: String },

    #[error("failed to read summary {key}: {reason}")]
    SummaryRead { key: String, reason: String },

    #[error("failed to list {bucket}/{prefix}: {source}")]
    Listing {
        bucket: String,
        prefix: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to write {bucket}/{key}: {reason}")]
    Write { bucket: String, key: String, reason: String },

    #[error("failed to write table row for {key}: {source}")]
    TableWrite {
        key: String,
        #[source]
        source: TableError,
    },
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::MalformedTrigger(_) => "malformed_trigger",
            PipelineError::SourceRead { .. } => "source_read",
            PipelineError::SummaryRead { .. } => "summary_read",
            PipelineError::Listing { .. } => "listing",
            PipelineError::Write { .. } => "write",
            PipelineError::TableWrite { .. } => "table_write",
        }
    }
}
