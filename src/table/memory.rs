use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{SummaryRow, SummaryTable, TableError};

/// Keyed by (source bucket, source key), like the Postgres upsert.
#[derive(Default)]
pub struct MemoryTable {
    rows: Mutex<BTreeMap<(String, String), SummaryRow>>,
    fail: AtomicBool,
}

impl MemoryTable {
    pub fn new() -> Self { Self::default() }

    pub fn rows(&self) -> Vec<SummaryRow> { self.rows.lock().unwrap().values().cloned().collect() }

    pub fn fail_writes(&self) { self.fail.store(true, Ordering::SeqCst); }
}

#[async_trait]
impl SummaryTable for MemoryTable {
    fn name(&self) -> &str { "memory" }

    async fn put_summary(&self, row: &SummaryRow) -> Result<(), TableError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TableError::Backend("injected table failure".to_string()));
        }
        self.rows.lock().unwrap().insert((row.source_bucket.clone(), row.source_key.clone()), row.clone());
        Ok(())
    }
}
