use chrono::NaiveDate;

/// Destination of the summary for `source_key`.
pub fn summary_key(prefix: &str, source_key: &str) -> String {
    format!("{}{}.summary.json", prefix, source_key)
}

/// One report per UTC calendar day.
pub fn report_key(prefix: &str, date: NaiveDate) -> String {
    format!("{}daily-summary-{}.json", prefix, date.format("%Y-%m-%d"))
}

/// Keys the pipeline writes itself; an empty prefix matches nothing.
pub fn is_derived(key: &str, summary_prefix: &str, report_prefix: &str) -> bool {
    [summary_prefix, report_prefix].iter().any(|p| !p.is_empty() && key.starts_with(p))
}
