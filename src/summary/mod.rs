use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{Numeric, RecordBatch};

pub mod aggregate;
pub mod kind;

pub use aggregate::{Aggregate, AggregateBuilder};
pub use kind::DataKind;

pub type Sums = BTreeMap<String, Numeric>;

/// Per-object result: record count and numeric sums per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: u64,
    pub sums: Sums,
    pub timestamp: DateTime<Utc>,
}

impl Summary {
    /// Sum of the `amount` field, 0 when no record carried a numeric amount.
    pub fn total_amount(&self) -> f64 {
        self.sums.get("amount").map(|n| n.as_f64()).unwrap_or(0.0)
    }
}

pub(crate) fn accumulate(sums: &mut Sums, field: &str, value: Numeric) {
    let slot = sums.entry(field.to_string()).or_default();
    *slot = *slot + value;
}

/// Reduce a batch to its summary. Every element counts; only numeric fields of
/// mapping records feed the sums.
pub fn summarize(batch: &RecordBatch) -> Summary {
    let mut count = 0u64;
    let mut sums = Sums::new();
    for record in batch {
        count += 1;
        for (field, value) in record.numeric_fields() {
            accumulate(&mut sums, field, value);
        }
    }
    Summary { count, sums, timestamp: Utc::now() }
}
