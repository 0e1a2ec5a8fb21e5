//! Durable step journal: the replay-safe checkpoint capability.
//!
//! The runner wraps each node execution in a named checkpoint keyed by
//! `(job id, step name)`. Before invoking a handler it consults the journal;
//! a recorded entry means the step already completed in a previous attempt of
//! the same run, so the stored result is reused and the handler's side
//! effects are not repeated. This gives at-most-once execution per run
//! instance when the hosting retry envelope replays a failed run.
//!
//! The journal persists nothing about events; only step results are stored,
//! and only for the lifetime the backend chooses to keep them.

use async_trait::async_trait;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Mutex;
use thiserror::Error;

/// Journal backend failures.
#[derive(Debug, Error, Diagnostic)]
pub enum JournalError {
    /// The storage backend rejected the operation.
    #[error("journal backend error: {message}")]
    #[diagnostic(
        code(relayflow::journal::backend),
        help("Check the journal database URL and that the backing store is reachable.")
    )]
    Backend { message: String },

    /// A stored step result could not be (de)serialized.
    #[error("journal serialization error: {0}")]
    #[diagnostic(code(relayflow::journal::serde))]
    Serde(#[from] serde_json::Error),
}

/// Write-ahead journal of completed step results, keyed by run and step name.
#[async_trait]
pub trait Journal: Send + Sync {
    /// Fetch the recorded result of `step_name` within `job_id`, if the step
    /// already completed.
    async fn lookup(&self, job_id: &str, step_name: &str) -> Result<Option<Value>, JournalError>;

    /// Record the result of a completed step. Recording the same step twice
    /// within one run is idempotent (last write is kept).
    async fn record(
        &self,
        job_id: &str,
        step_name: &str,
        result: Value,
    ) -> Result<(), JournalError>;
}

/// Volatile journal for tests and single-process development runs.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    entries: Mutex<FxHashMap<(String, String), Value>>,
}

impl InMemoryJournal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded steps across all runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("journal poisoned").len()
    }

    /// Whether the journal holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("journal poisoned").is_empty()
    }
}

#[async_trait]
impl Journal for InMemoryJournal {
    async fn lookup(&self, job_id: &str, step_name: &str) -> Result<Option<Value>, JournalError> {
        let entries = self.entries.lock().expect("journal poisoned");
        Ok(entries
            .get(&(job_id.to_string(), step_name.to_string()))
            .cloned())
    }

    async fn record(
        &self,
        job_id: &str,
        step_name: &str,
        result: Value,
    ) -> Result<(), JournalError> {
        let mut entries = self.entries.lock().expect("journal poisoned");
        entries.insert((job_id.to_string(), step_name.to_string()), result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn lookup_misses_before_record() {
        let journal = InMemoryJournal::new();
        assert!(journal.lookup("job-1", "step-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn recorded_result_is_returned_for_the_same_run_only() {
        let journal = InMemoryJournal::new();
        journal
            .record("job-1", "step-a", json!({"k": 1}))
            .await
            .unwrap();

        assert_eq!(
            journal.lookup("job-1", "step-a").await.unwrap(),
            Some(json!({"k": 1}))
        );
        // A different run must not observe this run's checkpoints.
        assert!(journal.lookup("job-2", "step-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn re_recording_a_step_keeps_the_last_write() {
        let journal = InMemoryJournal::new();
        journal.record("job-1", "step-a", json!(1)).await.unwrap();
        journal.record("job-1", "step-a", json!(2)).await.unwrap();
        assert_eq!(
            journal.lookup("job-1", "step-a").await.unwrap(),
            Some(json!(2))
        );
        assert_eq!(journal.len(), 1);
    }
}
