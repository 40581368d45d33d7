use serde_json::Value;

use super::trigger::{classify, object_ref, ObjectRef, Trigger};
use crate::config::Settings;
use crate::error::PipelineError;
use crate::pipeline::keys::is_derived;
use crate::pipeline::process::ObjectProcessor;
use crate::pipeline::rollup::RollupAggregator;
use crate::pipeline::types::InvocationResult;
use crate::telemetry::{self};
use crate::telemetry::ops::dispatch::Phase as DispatchPhase;

const REASON_NO_RECORDS: &str = "no-records";
const REASON_UNRECOGNIZED: &str = "unrecognized-record";
const REASON_DERIVED: &str = "derived-object";

/// Routes one trigger payload to the processor or the aggregator.
pub struct Dispatcher {
    processor: ObjectProcessor,
    aggregator: RollupAggregator,
    settings: Settings,
}

impl Dispatcher {
    pub fn new(processor: ObjectProcessor, aggregator: RollupAggregator, settings: Settings) -> Self {
        Self { processor, aggregator, settings }
    }

    pub async fn dispatch(&self, event: &Value) -> Result<InvocationResult, PipelineError> {
        let log = telemetry::dispatch();
        let trigger = {
            let _s = log.span(&DispatchPhase::Classify).entered();
            classify(event)
        };

        let _s = log.span(&DispatchPhase::Route).entered();
        match trigger {
            Trigger::Scheduled => {
                log.info_kv("⏰ scheduled trigger", [("bucket", self.settings.bucket.clone())]);
                self.rollup(None).await
            }
            Trigger::Empty => {
                log.info("no notification records; falling back to rollup");
                self.rollup(Some(REASON_NO_RECORDS)).await
            }
            Trigger::Records(records) if self.settings.process_all_records => self.process_all(records).await,
            Trigger::Records(records) => {
                let dropped = records.len() - 1;
                if dropped > 0 {
                    log.warn_kv("only the first record is processed", [("dropped", dropped.to_string())]);
                }
                match object_ref(&records[0])? {
                    None => Ok(InvocationResult::ignored(REASON_UNRECOGNIZED)),
                    Some(obj) if self.is_derived(&obj) => {
                        log.info_kv("skipping derived object", [("key", obj.key.clone())]);
                        Ok(InvocationResult::ignored(REASON_DERIVED))
                    }
                    Some(obj) => {
                        let out = self.processor.process(&obj.bucket, &obj.key).await?;
                        Ok(InvocationResult::processed(out.summary_key))
                    }
                }
            }
        }
    }

    async fn rollup(&self, reason: Option<&str>) -> Result<InvocationResult, PipelineError> {
        let out = self.aggregator.rollup(&self.settings.bucket, &self.settings.summary_prefix).await?;
        Ok(InvocationResult::rolled_up(out.report_key, reason))
    }

    async fn process_all(&self, records: &[Value]) -> Result<InvocationResult, PipelineError> {
        let log = telemetry::dispatch();
        let mut written = Vec::new();
        let mut skip_reason = REASON_UNRECOGNIZED;
        for (i, record) in records.iter().enumerate() {
            let obj = match object_ref(record)? {
                Some(obj) if self.is_derived(&obj) => { skip_reason = REASON_DERIVED; None }
                Some(obj) => Some(obj),
                None => { skip_reason = REASON_UNRECOGNIZED; None }
            };
            let Some(obj) = obj else {
                log.debug(format!("record {} skipped ({})", i, skip_reason));
                continue;
            };
            let out = self.processor.process(&obj.bucket, &obj.key).await?;
            written.push(out.summary_key);
        }
        if written.is_empty() {
            return Ok(InvocationResult::ignored(skip_reason));
        }
        Ok(InvocationResult::processed_many(written))
    }

    fn is_derived(&self, obj: &ObjectRef) -> bool {
        self.settings.skip_derived_keys
            && is_derived(&obj.key, &self.settings.summary_prefix, &self.settings.report_prefix)
    }
}
