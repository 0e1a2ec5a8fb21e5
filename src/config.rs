//! Engine configuration: journal backend selection and database resolution.

use std::sync::Arc;

use crate::journal::{InMemoryJournal, Journal};

/// Which journal backend the runner checkpoints into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JournalKind {
    /// Volatile journal; replay safety lasts only as long as the process.
    InMemory,
    /// Durable SQLite journal (requires the `sqlite` feature).
    #[cfg(feature = "sqlite")]
    Sqlite,
}

/// Runtime configuration for constructing a [`Runner`](crate::runner::Runner).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub journal: JournalKind,
    /// SQLite database file name, resolved from the environment when unset.
    pub sqlite_db_name: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            journal: JournalKind::InMemory,
            sqlite_db_name: Self::resolve_sqlite_db_name(None),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new(journal: JournalKind, sqlite_db_name: Option<String>) -> Self {
        Self {
            journal,
            sqlite_db_name: Self::resolve_sqlite_db_name(sqlite_db_name),
        }
    }

    fn resolve_sqlite_db_name(provided: Option<String>) -> Option<String> {
        if let Some(name) = provided {
            return Some(name);
        }
        dotenvy::dotenv().ok();
        Some(std::env::var("SQLITE_DB_NAME").unwrap_or_else(|_| "relayflow.db".to_string()))
    }

    /// Construct the configured journal backend.
    ///
    /// Falls back to the in-memory journal when the durable backend cannot
    /// be initialized, logging the failure; the run still executes, it just
    /// loses crash-replay safety.
    pub async fn build_journal(&self) -> Arc<dyn Journal> {
        match self.journal {
            JournalKind::InMemory => Arc::new(InMemoryJournal::new()),
            #[cfg(feature = "sqlite")]
            JournalKind::Sqlite => {
                let db_url = std::env::var("RELAYFLOW_SQLITE_URL")
                    .ok()
                    .or_else(|| {
                        self.sqlite_db_name
                            .as_ref()
                            .map(|name| format!("sqlite://{name}"))
                    })
                    .unwrap_or_else(|| "sqlite://relayflow.db".to_string());
                // Ensure the underlying sqlite file exists before connecting.
                if let Some(path) = db_url.strip_prefix("sqlite://") {
                    let path = path.trim();
                    if !path.is_empty() {
                        let p = std::path::Path::new(path);
                        if let Some(parent) = p.parent() {
                            let _ = std::fs::create_dir_all(parent);
                        }
                        if !p.exists() {
                            let _ = std::fs::File::create_new(p);
                        }
                    }
                }
                match crate::journal_sqlite::SqliteJournal::connect(&db_url).await {
                    Ok(journal) => Arc::new(journal),
                    Err(e) => {
                        tracing::error!(
                            url = %db_url,
                            error = %e,
                            "SqliteJournal initialization failed; using in-memory journal"
                        );
                        Arc::new(InMemoryJournal::new())
                    }
                }
            }
        }
    }
}
