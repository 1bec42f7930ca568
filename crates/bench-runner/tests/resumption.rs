//! End-to-end resumption behavior: running the batch driver twice over the
//! same input and output file produces no duplicate identifiers and leaves
//! previously-saved records unchanged.

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use bench_runner::datasets;
use bench_runner::runner::{BatchRunner, DeliberationProcessor, Mode, WorkItem};
use bench_runner::store::ResultStore;
use deliberation::{CompletionProvider, DeliberationConfig, Message, ProviderError};

/// Provider that answers every call with the same completion.
struct FixedProvider(String);

#[async_trait]
impl CompletionProvider for FixedProvider {
    async fn complete(
        &self,
        _messages: &[Message],
        _temperature: f32,
        _model: &str,
    ) -> Result<String, ProviderError> {
        Ok(self.0.clone())
    }
}

fn config() -> DeliberationConfig {
    DeliberationConfig {
        model: "test-model".to_string(),
        temperature: 0.0,
        reflection_turns: 0,
        verbose: false,
    }
}

fn feverous_items() -> Vec<WorkItem> {
    (1..=3)
        .map(|index| {
            WorkItem::from_record(
                json!({
                    "index": index,
                    "claim": format!("claim {index}"),
                    "evidence": format!("evidence {index}"),
                }),
                "index",
            )
            .unwrap()
        })
        .collect()
}

#[tokio::test]
async fn second_run_skips_everything_and_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ResultStore::new(dir.path().join("out.jsonl")));
    let benchmark = datasets::by_name("feverous").unwrap();

    let first = DeliberationProcessor::new(
        Arc::new(FixedProvider("Final Answer:\nSUPPORTS".to_string())),
        config(),
        Arc::clone(&benchmark),
        Mode::Direct,
    );
    let summary = BatchRunner::new(Arc::clone(&store), 2)
        .run(feverous_items(), Arc::new(first))
        .await
        .unwrap();
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.skipped, 0);

    let before = fs::read_to_string(store.path()).unwrap();

    // A second run would answer differently, but every item is already
    // persisted, so nothing is recomputed or rewritten.
    let second = DeliberationProcessor::new(
        Arc::new(FixedProvider("Final Answer:\nREFUTES".to_string())),
        config(),
        Arc::clone(&benchmark),
        Mode::Direct,
    );
    let summary = BatchRunner::new(Arc::clone(&store), 2)
        .run(feverous_items(), Arc::new(second))
        .await
        .unwrap();
    assert_eq!(summary.completed, 0);
    assert_eq!(summary.skipped, 3);

    let after = fs::read_to_string(store.path()).unwrap();
    assert_eq!(before, after);

    let records = store.load_records().unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r["prediction"] == "SUPPORTS"));
}

#[tokio::test]
async fn panel_mode_runs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ResultStore::new(dir.path().join("out.jsonl")));
    let benchmark = datasets::by_name("feverous").unwrap();

    // Unanimous personas: the panel reaches consensus in its first
    // discussion round and the driver canonicalizes the verdict.
    let processor = DeliberationProcessor::new(
        Arc::new(FixedProvider("Final Answer:\nsupports".to_string())),
        config(),
        Arc::clone(&benchmark),
        Mode::Panel,
    );
    let summary = BatchRunner::new(Arc::clone(&store), 1)
        .run(feverous_items(), Arc::new(processor))
        .await
        .unwrap();
    assert_eq!(summary.completed, 3);

    let records = store.load_records().unwrap();
    assert!(records.iter().all(|r| r["prediction"] == "SUPPORTS"));
}
