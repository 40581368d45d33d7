use std::env;
use std::path::PathBuf;

pub const DEFAULT_BUCKET: &str = "raw-events";
pub const DEFAULT_SUMMARY_PREFIX: &str = "processed/";
pub const DEFAULT_REPORT_PREFIX: &str = "reports/";
pub const DEFAULT_SUMMARY_TABLE: &str = "daily_summaries";
pub const DEFAULT_STORE_ROOT: &str = "./data";
pub const DEFAULT_LIST_PAGE_SIZE: usize = 1000;

/// Runtime settings, read from the environment (after `.env` is loaded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Bucket summaries are written to, and the one the scheduled rollup reads and reports into.
    pub bucket: String,
    pub summary_prefix: String,
    pub report_prefix: String,
    pub summary_table: String,
    /// Enables the table write-through when set.
    pub database_url: Option<String>,
    pub store_root: PathBuf,
    pub list_page_size: usize,
    pub process_all_records: bool,
    pub skip_derived_keys: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        Settings {
            bucket: non_empty("RAW_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            summary_prefix: non_empty("SUMMARY_PREFIX").unwrap_or_else(|| DEFAULT_SUMMARY_PREFIX.to_string()),
            report_prefix: non_empty("REPORT_PREFIX").unwrap_or_else(|| DEFAULT_REPORT_PREFIX.to_string()),
            summary_table: non_empty("SUMMARY_TABLE").unwrap_or_else(|| DEFAULT_SUMMARY_TABLE.to_string()),
            database_url: non_empty("DATABASE_URL"),
            store_root: non_empty("ROLLUP_STORE_ROOT").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_ROOT)),
            list_page_size: non_empty("ROLLUP_LIST_PAGE_SIZE")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_LIST_PAGE_SIZE),
            process_all_records: non_empty("ROLLUP_PROCESS_ALL_RECORDS").map(|v| parse_flag(&v)).unwrap_or(false),
            skip_derived_keys: non_empty("ROLLUP_SKIP_DERIVED_KEYS").map(|v| parse_flag(&v)).unwrap_or(true),
        }
    }
}

impl Default for Settings {
    fn default() -> Self { Self::from_lookup(|_| None) }
}

pub fn parse_flag(v: &str) -> bool {
    let v = v.trim();
    v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.bucket, "raw-events");
        assert_eq!(s.summary_prefix, "processed/");
        assert_eq!(s.report_prefix, "reports/");
        assert_eq!(s.summary_table, "daily_summaries");
        assert_eq!(s.database_url, None);
        assert_eq!(s.list_page_size, 1000);
        assert!(!s.process_all_records);
        assert!(s.skip_derived_keys);
    }

    #[test]
    fn reads_overrides() {
        let s = Settings::from_lookup(lookup(&[
            ("RAW_BUCKET", "events"),
            ("SUMMARY_PREFIX", "out/"),
            ("DATABASE_URL", "postgres://localhost/db"),
            ("ROLLUP_LIST_PAGE_SIZE", "25"),
            ("ROLLUP_PROCESS_ALL_RECORDS", "Yes"),
            ("ROLLUP_SKIP_DERIVED_KEYS", "false"),
        ]));
        assert_eq!(s.bucket, "events");
        assert_eq!(s.summary_prefix, "out/");
        assert_eq!(s.database_url.as_deref(), Some("postgres://localhost/db"));
        assert_eq!(s.list_page_size, 25);
        assert!(s.process_all_records);
        assert!(!s.skip_derived_keys);
    }

    #[test]
    fn bad_values_fall_back() {
        let s = Settings::from_lookup(lookup(&[("ROLLUP_LIST_PAGE_SIZE", "0"), ("DATABASE_URL", "  ")]));
        assert_eq!(s.list_page_size, 1000);
        assert_eq!(s.database_url, None);
    }
}
