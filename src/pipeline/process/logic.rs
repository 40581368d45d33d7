use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use crate::error::PipelineError;
use crate::pipeline::keys::summary_key;
use crate::record::RecordBatch;
use crate::store::BlobStore;
use crate::summary::{summarize, DataKind, Summary};
use crate::table::{SummaryRow, SummaryTable};
use crate::telemetry::{self};
use crate::telemetry::ops::process::Phase as ProcessPhase;

/// Summary of one source object and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub summary_bucket: String,
    pub summary_key: String,
    pub summary: Summary,
    pub data_type: DataKind,
}

/// Fetches one object, summarizes it and persists the summary.
///
/// Sources are read from whichever bucket the caller names; summaries always land in
/// `summary_bucket`, the bucket the rollup reads.
pub struct ObjectProcessor {
    store: Arc<dyn BlobStore>,
    table: Option<Arc<dyn SummaryTable>>,
    summary_bucket: String,
    summary_prefix: String,
}

impl ObjectProcessor {
    pub fn new(store: Arc<dyn BlobStore>, summary_bucket: impl Into<String>, summary_prefix: impl Into<String>) -> Self {
        Self { store, table: None, summary_bucket: summary_bucket.into(), summary_prefix: summary_prefix.into() }
    }

    pub fn with_table(mut self, table: Arc<dyn SummaryTable>) -> Self {
        self.table = Some(table);
        self
    }

    /// Read, decode and summarize without writing anything.
    pub async fn evaluate(&self, bucket: &str, key: &str) -> Result<ProcessOutcome, PipelineError> {
        let log = telemetry::process();
        let source_err = |reason: String| PipelineError::SourceRead { bucket: bucket.to_string(), key: key.to_string(), reason };

        let body = {
            let _s = log.span_kv(&ProcessPhase::Fetch, [("bucket", bucket.to_string()), ("key", key.to_string())]).entered();
            self.store.get(bucket, key).await.map_err(|e| source_err(e.to_string()))?
        };
        let payload: Value = {
            let _s = log.span(&ProcessPhase::Decode).entered();
            serde_json::from_slice(&body).map_err(|e| source_err(format!("invalid JSON: {}", e)))?
        };

        let _s = log.span(&ProcessPhase::Summarize).entered();
        let batch = RecordBatch::from_json(payload);
        let data_type = DataKind::infer(&batch);
        let summary = summarize(&batch);
        Ok(ProcessOutcome {
            summary_bucket: self.summary_bucket.clone(),
            summary_key: summary_key(&self.summary_prefix, key),
            summary,
            data_type,
        })
    }

    /// Summarize `bucket/key` and write the summary under the summary prefix of the
    /// summary bucket. The blob write comes first; a failing table row is still fatal,
    /// and the retry rewrites both idempotently.
    pub async fn process(&self, bucket: &str, key: &str) -> Result<ProcessOutcome, PipelineError> {
        let log = telemetry::process();
        let outcome = self.evaluate(bucket, key).await?;

        let write_err = |reason: String| PipelineError::Write { bucket: outcome.summary_bucket.clone(), key: outcome.summary_key.clone(), reason };
        let body = serde_json::to_vec(&outcome.summary).map_err(|e| write_err(e.to_string()))?;
        {
            let _s = log.span_kv(&ProcessPhase::WriteSummary, [("summary_key", outcome.summary_key.clone())]).entered();
            self.store
                .put(&outcome.summary_bucket, &outcome.summary_key, Bytes::from(body))
                .await
                .map_err(|e| write_err(e.to_string()))?;
        }
        log.summary_written(&outcome.summary_key, outcome.summary.count, outcome.summary.sums.len());

        if let Some(table) = &self.table {
            let _s = log.span_kv(&ProcessPhase::WriteTable, [("table", table.name().to_string())]).entered();
            let row = SummaryRow::new(bucket, key, &outcome.summary_key, &outcome.summary, outcome.data_type);
            table
                .put_summary(&row)
                .await
                .map_err(|source| PipelineError::TableWrite { key: key.to_string(), source })?;
        }
        Ok(outcome)
    }
}
