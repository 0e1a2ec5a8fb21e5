/*!
SQLite-backed step journal.

Implements the [`Journal`] trait over a SQLite database so completed step
results survive process crashes: when the hosting retry envelope replays a
run, checkpoints recorded by the previous attempt are found here and their
handlers are not re-invoked.

## Schema

One table, one row per completed step:

- `steps.job_id`: run instance identifier
- `steps.step_name`: checkpoint name, unique per node within a run
- `steps.result_json`: serialized step result (the accumulated context)
- `steps.created_at`: RFC3339 completion time

The schema is created on connect if absent; the statement is idempotent so
multiple processes may share one database file.

## Maintenance

Rows accumulate per run. Completed runs can be pruned by `job_id` or by age:

```bash
sqlite3 relayflow.db "DELETE FROM steps WHERE created_at < datetime('now', '-30 days')"
```
*/

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use crate::journal::{Journal, JournalError};

/// Durable journal persisting step results to SQLite.
pub struct SqliteJournal {
    pool: Arc<SqlitePool>,
}

impl std::fmt::Debug for SqliteJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteJournal").finish()
    }
}

impl SqliteJournal {
    /// Connect (or create) a SQLite database at `database_url` and ensure
    /// the journal schema exists. Example URL: `sqlite://relayflow.db`.
    #[must_use = "journal must be used to persist step results"]
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<Self, JournalError> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| JournalError::Backend {
                message: format!("connect error: {e}"),
            })?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS steps (
                job_id      TEXT NOT NULL,
                step_name   TEXT NOT NULL,
                result_json TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                PRIMARY KEY (job_id, step_name)
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| JournalError::Backend {
            message: format!("schema init: {e}"),
        })?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait::async_trait]
impl Journal for SqliteJournal {
    #[instrument(skip(self), err)]
    async fn lookup(&self, job_id: &str, step_name: &str) -> Result<Option<Value>, JournalError> {
        let row = sqlx::query(
            r#"
            SELECT result_json FROM steps
            WHERE job_id = ?1 AND step_name = ?2
            "#,
        )
        .bind(job_id)
        .bind(step_name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| JournalError::Backend {
            message: format!("select step: {e}"),
        })?;

        match row {
            Some(row) => {
                let payload: String = row.get("result_json");
                Ok(Some(serde_json::from_str(&payload)?))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, result), err)]
    async fn record(
        &self,
        job_id: &str,
        step_name: &str,
        result: Value,
    ) -> Result<(), JournalError> {
        let payload = serde_json::to_string(&result)?;

        // INSERT OR REPLACE keeps re-saves of the same step idempotent.
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO steps (job_id, step_name, result_json, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(job_id)
        .bind(step_name)
        .bind(&payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(|e| JournalError::Backend {
            message: format!("insert step: {e}"),
        })?;

        Ok(())
    }
}
