use serde::{Deserialize, Serialize};

use crate::summary::Sums;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Ignored,
}

/// What one dispatch reports back to its trigger source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Every summary written, in all-records mode only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub summary_keys: Vec<String>,
}

impl InvocationResult {
    pub fn processed(summary_key: String) -> Self {
        InvocationResult { status: Status::Ok, summary_key: Some(summary_key), report_key: None, reason: None, summary_keys: Vec::new() }
    }

    pub fn processed_many(summary_keys: Vec<String>) -> Self {
        InvocationResult { summary_key: summary_keys.first().cloned(), summary_keys, ..Self::processed(String::new()) }
    }

    pub fn rolled_up(report_key: String, reason: Option<&str>) -> Self {
        InvocationResult { status: Status::Ok, summary_key: None, report_key: Some(report_key), reason: reason.map(str::to_string), summary_keys: Vec::new() }
    }

    pub fn ignored(reason: &str) -> Self {
        InvocationResult { status: Status::Ignored, summary_key: None, report_key: None, reason: Some(reason.to_string()), summary_keys: Vec::new() }
    }
}

// Plan/apply envelopes for the CLI

#[derive(Serialize)]
pub struct ProcessView<'a> {
    pub bucket: &'a str,
    pub key: &'a str,
    pub summary_bucket: &'a str,
    pub summary_key: &'a str,
    pub data_type: &'a str,
    pub count: u64,
    pub sums: &'a Sums,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSummary {
    pub key: String,
    pub reason: String,
}

#[derive(Serialize)]
pub struct RollupView<'a> {
    pub bucket: &'a str,
    pub prefix: &'a str,
    pub report_key: &'a str,
    pub count: u64,
    pub sums: &'a Sums,
    pub sources: usize,
    pub skipped: &'a [SkippedSummary],
}
