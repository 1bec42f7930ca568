//! Batch execution over a benchmark.
//!
//! Work items are processed in batches with one worker per item. The
//! deliberation inside each item is strictly sequential; the only shared
//! mutable state between workers is the result store. Before dispatch the
//! already-persisted identifier set is subtracted from the input, so
//! re-running over the same output file skips completed items; a failed
//! item is simply redone from scratch on the next run.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use deliberation::{
    CompletionProvider, DeliberationConfig, Message, Panel, Responder, SelfRefine,
};

use crate::datasets::Benchmark;
use crate::store::ResultStore;

/// One benchmark question plus its stable identifier.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub index: u64,
    pub payload: Value,
}

impl WorkItem {
    /// Lift an input record into a work item; `None` when the identifier
    /// field is absent or not an integer.
    pub fn from_record(record: Value, id_field: &str) -> Option<Self> {
        let index = record[id_field].as_u64()?;
        Some(Self {
            index,
            payload: record,
        })
    }
}

/// Converts one work item into a persisted result record.
#[async_trait]
pub trait ItemProcessor: Send + Sync {
    async fn process(&self, item: &WorkItem) -> Result<Value>;
}

/// Deliberation strategy selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// One direct exchange, no refinement.
    Direct,
    /// Single-agent self-refinement loop.
    Refine,
    /// Persona-panel deliberation.
    Panel,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Refine => write!(f, "refine"),
            Self::Panel => write!(f, "panel"),
        }
    }
}

/// Runs one benchmark item through the configured strategy.
pub struct DeliberationProcessor {
    provider: Arc<dyn CompletionProvider>,
    config: DeliberationConfig,
    benchmark: Arc<dyn Benchmark>,
    mode: Mode,
}

impl DeliberationProcessor {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        config: DeliberationConfig,
        benchmark: Arc<dyn Benchmark>,
        mode: Mode,
    ) -> Self {
        Self {
            provider,
            config,
            benchmark,
            mode,
        }
    }
}

#[async_trait]
impl ItemProcessor for DeliberationProcessor {
    async fn process(&self, item: &WorkItem) -> Result<Value> {
        let query = self
            .benchmark
            .instance_query(&item.payload)
            .with_context(|| format!("item {} is missing required fields", item.index))?;

        let (final_answer, transcript) = match self.mode {
            Mode::Direct => {
                let responder = Responder::new(self.provider.as_ref(), &self.config);
                let messages = vec![
                    Message::system(self.benchmark.task_description()),
                    Message::user(query),
                ];
                let output = responder.send(&messages, None).await?;
                (output.clone(), vec![output])
            }
            Mode::Refine => {
                let refine = SelfRefine::new(self.provider.as_ref(), &self.config);
                let result = refine
                    .run(self.benchmark.task_description(), &query)
                    .await?;
                (result.final_answer, result.transcript)
            }
            Mode::Panel => {
                let panel = Panel::new(self.provider.as_ref(), &self.config);
                let outcome = panel
                    .run(self.benchmark.task_description(), &query)
                    .await?;
                (outcome.final_answer, outcome.transcript)
            }
        };

        Ok(self
            .benchmark
            .record(item.index, &item.payload, &final_answer, &transcript))
    }
}

/// Counts from one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Items processed and persisted this run.
    pub completed: usize,
    /// Items skipped because a prior run already persisted them.
    pub skipped: usize,
    /// Items that failed and were left for a resumed run.
    pub failed: usize,
}

/// Batch executor: fixed worker count equal to the batch size.
pub struct BatchRunner {
    store: Arc<ResultStore>,
    batch_size: usize,
}

impl BatchRunner {
    pub fn new(store: Arc<ResultStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Process every pending item, batch by batch.
    ///
    /// Results within a batch are sorted by item index before being
    /// persisted, so output order is deterministic regardless of worker
    /// completion order. A single item's failure never aborts the run.
    pub async fn run(
        &self,
        items: Vec<WorkItem>,
        processor: Arc<dyn ItemProcessor>,
    ) -> Result<RunSummary> {
        let processed = self.store.processed_ids()?;
        let (pending, skipped): (Vec<WorkItem>, Vec<WorkItem>) = items
            .into_iter()
            .partition(|item| !processed.contains(&item.index));
        if !skipped.is_empty() {
            let ids: Vec<u64> = skipped.iter().map(|item| item.index).collect();
            info!(count = ids.len(), "skipping already-processed items");
            debug!(?ids, "skipped identifiers");
        }

        let mut summary = RunSummary {
            skipped: skipped.len(),
            ..RunSummary::default()
        };

        for (batch_number, batch) in pending.chunks(self.batch_size).enumerate() {
            let mut workers: JoinSet<(u64, Result<Value>)> = JoinSet::new();
            for item in batch {
                let processor = Arc::clone(&processor);
                let item = item.clone();
                workers.spawn(async move {
                    let result = processor.process(&item).await;
                    (item.index, result)
                });
            }

            let mut results: Vec<(u64, Value)> = Vec::with_capacity(batch.len());
            while let Some(joined) = workers.join_next().await {
                match joined {
                    Ok((index, Ok(record))) => results.push((index, record)),
                    Ok((index, Err(e))) => {
                        warn!(index, error = %e, "item failed; left for a resumed run");
                        summary.failed += 1;
                    }
                    Err(e) => {
                        warn!(error = %e, "worker task failed");
                        summary.failed += 1;
                    }
                }
            }

            results.sort_by_key(|(index, _)| *index);
            if !results.is_empty() {
                let records: Vec<Value> = results.into_iter().map(|(_, record)| record).collect();
                let written = self.store.append_batch(&records)?;
                summary.completed += written;
                info!(batch = batch_number + 1, written, "saved batch");
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    struct StubProcessor {
        calls: AtomicUsize,
        fail_index: Option<u64>,
    }

    impl StubProcessor {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_index: None,
            }
        }

        fn failing_on(index: u64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_index: Some(index),
            }
        }
    }

    #[async_trait]
    impl ItemProcessor for StubProcessor {
        async fn process(&self, item: &WorkItem) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_index == Some(item.index) {
                anyhow::bail!("synthetic failure");
            }
            // Later indices finish first, to exercise result ordering.
            let delay = 50u64.saturating_sub(item.index * 10);
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            Ok(json!({"index": item.index, "answer": format!("answer-{}", item.index)}))
        }
    }

    fn items(indices: &[u64]) -> Vec<WorkItem> {
        indices
            .iter()
            .map(|&index| WorkItem {
                index,
                payload: json!({"index": index}),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_results_are_persisted_in_index_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ResultStore::new(dir.path().join("out.jsonl")));
        let runner = BatchRunner::new(Arc::clone(&store), 5);

        let summary = runner
            .run(items(&[3, 1, 4, 2, 0]), Arc::new(StubProcessor::new()))
            .await
            .unwrap();
        assert_eq!(summary.completed, 5);
        assert_eq!(summary.failed, 0);

        let indices: Vec<u64> = store
            .load_records()
            .unwrap()
            .iter()
            .map(|r| r["index"].as_u64().unwrap())
            .collect();
        assert_eq!(indices, [0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_failed_items_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ResultStore::new(dir.path().join("out.jsonl")));
        let runner = BatchRunner::new(Arc::clone(&store), 2);

        let summary = runner
            .run(items(&[1, 2, 3]), Arc::new(StubProcessor::failing_on(2)))
            .await
            .unwrap();
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.failed, 1);

        let ids = store.processed_ids().unwrap();
        assert!(ids.contains(&1) && ids.contains(&3) && !ids.contains(&2));
    }

    #[tokio::test]
    async fn test_resumption_skips_persisted_items() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ResultStore::new(dir.path().join("out.jsonl")));

        let first = StubProcessor::failing_on(2);
        let runner = BatchRunner::new(Arc::clone(&store), 10);
        runner.run(items(&[1, 2, 3]), Arc::new(first)).await.unwrap();

        // Second run only redoes the failed item.
        let second = Arc::new(StubProcessor::new());
        let summary = runner
            .run(items(&[1, 2, 3]), Arc::clone(&second) as Arc<dyn ItemProcessor>)
            .await
            .unwrap();
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);

        let records = store.load_records().unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_work_item_requires_integer_identifier() {
        assert!(WorkItem::from_record(json!({"index": 5}), "index").is_some());
        assert!(WorkItem::from_record(json!({"index": "five"}), "index").is_none());
        assert!(WorkItem::from_record(json!({"claim": "x"}), "index").is_none());
    }
}
