use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::PipelineError;
use crate::pipeline::keys::report_key;
use crate::pipeline::types::SkippedSummary;
use crate::store::{list_all, BlobStore};
use crate::summary::{Aggregate, AggregateBuilder, Summary};
use crate::telemetry::{self};
use crate::telemetry::ops::rollup::Phase as RollupPhase;

/// Result of reading one listed key.
#[derive(Debug)]
pub enum SummaryOutcome {
    Folded { key: String, summary: Summary },
    Skipped { key: String, error: PipelineError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollupOutcome {
    pub report_key: String,
    pub aggregate: Aggregate,
    pub listed: usize,
    pub skipped: Vec<SkippedSummary>,
}

/// Fold successes into one aggregate; failures are returned alongside, never raised.
pub fn fold<I>(outcomes: I, generated_at: DateTime<Utc>) -> (Aggregate, Vec<SkippedSummary>)
where
    I: IntoIterator<Item = SummaryOutcome>,
{
    let mut builder = AggregateBuilder::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            SummaryOutcome::Folded { key, summary } => builder.fold(key, &summary),
            SummaryOutcome::Skipped { key, error } => skipped.push(SkippedSummary { key, reason: error.to_string() }),
        }
    }
    (builder.finish(generated_at), skipped)
}

/// Merges every stored summary under a prefix into a dated report.
pub struct RollupAggregator {
    store: Arc<dyn BlobStore>,
    report_prefix: String,
    page_size: usize,
}

impl RollupAggregator {
    pub fn new(store: Arc<dyn BlobStore>, report_prefix: impl Into<String>, page_size: usize) -> Self {
        Self { store, report_prefix: report_prefix.into(), page_size }
    }

    pub fn report_key_for(&self, now: DateTime<Utc>) -> String {
        report_key(&self.report_prefix, now.date_naive())
    }

    async fn read_summary(&self, bucket: &str, key: String) -> SummaryOutcome {
        let fail = |reason: String| SummaryOutcome::Skipped {
            key: key.clone(),
            error: PipelineError::SummaryRead { key: key.clone(), reason },
        };
        let body = match self.store.get(bucket, &key).await {
            Ok(body) => body,
            Err(e) => return fail(e.to_string()),
        };
        match serde_json::from_slice::<Summary>(&body) {
            Ok(summary) => SummaryOutcome::Folded { key, summary },
            Err(e) => fail(format!("not a summary: {}", e)),
        }
    }

    /// List and fold without writing. Listing failure is fatal.
    pub async fn collect(&self, bucket: &str, prefix: &str, now: DateTime<Utc>) -> Result<RollupOutcome, PipelineError> {
        let log = telemetry::rollup();
        let keys = {
            let _s = log.span_kv(&RollupPhase::List, [("bucket", bucket.to_string()), ("prefix", prefix.to_string())]).entered();
            list_all(self.store.as_ref(), bucket, prefix, self.page_size)
                .await
                .map_err(|source| PipelineError::Listing { bucket: bucket.to_string(), prefix: prefix.to_string(), source })?
        };
        let listed = keys.len();

        let mut outcomes = Vec::with_capacity(listed);
        for key in keys {
            let _s = log.span_kv(&RollupPhase::ReadSummary, [("key", key.clone())]).entered();
            let outcome = self.read_summary(bucket, key).await;
            if let SummaryOutcome::Skipped { error, .. } = &outcome {
                log.skipped(error);
            }
            outcomes.push(outcome);
        }

        let (aggregate, skipped) = {
            let _s = log.span(&RollupPhase::Fold).entered();
            fold(outcomes, now)
        };
        log.totals(listed, aggregate.sources.len(), skipped.len(), aggregate.count);
        Ok(RollupOutcome { report_key: self.report_key_for(now), aggregate, listed, skipped })
    }

    pub async fn rollup(&self, bucket: &str, prefix: &str) -> Result<RollupOutcome, PipelineError> {
        self.rollup_at(bucket, prefix, Utc::now()).await
    }

    /// Collect, then write the aggregate to the report for `now`'s UTC date.
    pub async fn rollup_at(&self, bucket: &str, prefix: &str, now: DateTime<Utc>) -> Result<RollupOutcome, PipelineError> {
        let log = telemetry::rollup();
        let outcome = self.collect(bucket, prefix, now).await?;

        let write_err = |reason: String| PipelineError::Write { bucket: bucket.to_string(), key: outcome.report_key.clone(), reason };
        let body = serde_json::to_vec(&outcome.aggregate).map_err(|e| write_err(e.to_string()))?;
        {
            let _s = log.span_kv(&RollupPhase::WriteReport, [("report_key", outcome.report_key.clone())]).entered();
            self.store
                .put(bucket, &outcome.report_key, Bytes::from(body))
                .await
                .map_err(|e| write_err(e.to_string()))?;
        }
        log.info_kv("📄 report written", [("report_key", outcome.report_key.clone())]);
        Ok(outcome)
    }
}
