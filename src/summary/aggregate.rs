use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{accumulate, Summary, Sums};

/// Cumulative rollup of many summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub count: u64,
    pub sums: Sums,
    pub sources: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Fold state for an [`Aggregate`]; only summaries passed to `fold` contribute.
#[derive(Debug, Default)]
pub struct AggregateBuilder {
    count: u64,
    sums: Sums,
    sources: Vec<String>,
}

impl AggregateBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn fold(&mut self, key: impl Into<String>, summary: &Summary) {
        self.count += summary.count;
        for (field, value) in &summary.sums {
            accumulate(&mut self.sums, field, *value);
        }
        self.sources.push(key.into());
    }

    pub fn finish(self, generated_at: DateTime<Utc>) -> Aggregate {
        Aggregate { count: self.count, sums: self.sums, sources: self.sources, generated_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Numeric;

    fn summary(count: u64, sums: &[(&str, Numeric)]) -> Summary {
        Summary {
            count,
            sums: sums.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn merges_counts_and_sums() {
        let mut b = AggregateBuilder::new();
        b.fold("processed/one.json.summary.json", &summary(2, &[("a", Numeric::Int(4))]));
        b.fold("processed/two.json.summary.json", &summary(3, &[("a", Numeric::Int(1)), ("b", Numeric::Int(5))]));
        let agg = b.finish(Utc::now());

        assert_eq!(agg.count, 5);
        assert_eq!(agg.sums["a"], Numeric::Int(5));
        assert_eq!(agg.sums["b"], Numeric::Int(5));
        assert_eq!(agg.sources, vec!["processed/one.json.summary.json", "processed/two.json.summary.json"]);
    }

    #[test]
    fn empty_fold() {
        let agg = AggregateBuilder::new().finish(Utc::now());
        assert_eq!(agg.count, 0);
        assert!(agg.sums.is_empty());
        assert!(agg.sources.is_empty());
    }
}
