use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::pipeline::dispatch::Dispatcher;
use crate::pipeline::process::ObjectProcessor;
use crate::pipeline::rollup::RollupAggregator;
use crate::store::{BlobStore, FsStore};
use crate::table::{PgSummaryTable, SummaryTable};

/// Collaborators shared by every command.
pub struct App {
    pub settings: Settings,
    store: Arc<dyn BlobStore>,
    table: Option<Arc<dyn SummaryTable>>,
}

impl App {
    pub fn new(settings: Settings, store: Arc<dyn BlobStore>, table: Option<Arc<dyn SummaryTable>>) -> Self {
        Self { settings, store, table }
    }

    /// Filesystem store under `store_root`; the table sink only when a DSN is configured.
    pub async fn from_settings(settings: Settings) -> Result<Self> {
        let store: Arc<dyn BlobStore> = Arc::new(FsStore::new(&settings.store_root));
        let table: Option<Arc<dyn SummaryTable>> = match settings.database_url.as_deref() {
            Some(dsn) => {
                let t = PgSummaryTable::connect(dsn, &settings.summary_table)
                    .await
                    .with_context(|| format!("connect summary table {}", settings.summary_table))?;
                Some(Arc::new(t))
            }
            None => None,
        };
        Ok(Self::new(settings, store, table))
    }

    pub fn processor(&self) -> ObjectProcessor {
        let p = ObjectProcessor::new(self.store.clone(), self.settings.bucket.clone(), self.settings.summary_prefix.clone());
        match &self.table {
            Some(t) => p.with_table(t.clone()),
            None => p,
        }
    }

    pub fn aggregator(&self) -> RollupAggregator {
        RollupAggregator::new(self.store.clone(), self.settings.report_prefix.clone(), self.settings.list_page_size)
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.processor(), self.aggregator(), self.settings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::table::memory::MemoryTable;
    use serde_json::json;

    #[tokio::test]
    async fn wires_table_into_dispatch() {
        let store = Arc::new(MemoryStore::new());
        let table = Arc::new(MemoryTable::new());
        store.insert("raw", "a.json", r#"[{"amount": 2}]"#);
        let settings = Settings { bucket: "raw".into(), ..Settings::default() };
        let app = App::new(settings, store.clone(), Some(table.clone()));

        let event = json!({"Records": [{"s3": {"bucket": {"name": "raw"}, "object": {"key": "a.json"}}}]});
        app.dispatcher().dispatch(&event).await.unwrap();
        assert_eq!(table.rows().len(), 1);
        assert!(store.object("raw", "processed/a.json.summary.json").is_some());
    }

    #[tokio::test]
    async fn from_settings_without_dsn_uses_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings { store_root: dir.path().to_path_buf(), ..Settings::default() };
        let app = App::from_settings(settings).await.unwrap();
        assert!(app.table.is_none());

        let out = app.aggregator().rollup("raw-events", "processed/").await.unwrap();
        assert!(dir.path().join("raw-events").join(&out.report_key).exists());
    }
}
