//! Newline-delimited JSON result store.
//!
//! Records are keyed by a stable identifier field. Appends are
//! lock-protected and merge with whatever prior partial runs already
//! persisted: an identifier is written at most once, so resumed runs never
//! duplicate or clobber existing records.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::Value;
use tracing::warn;

/// Append-only JSONL store.
pub struct ResultStore {
    path: PathBuf,
    id_field: &'static str,
    lock: Mutex<()>,
}

impl ResultStore {
    /// Store keyed by the default `index` field.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_id_field(path, "index")
    }

    pub fn with_id_field(path: impl Into<PathBuf>, id_field: &'static str) -> Self {
        Self {
            path: path.into(),
            id_field,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records currently persisted. A missing file is an empty store.
    pub fn load_records(&self) -> Result<Vec<Value>> {
        read_jsonl(&self.path)
    }

    /// Identifiers of already-persisted records.
    pub fn processed_ids(&self) -> Result<HashSet<u64>> {
        Ok(self
            .load_records()?
            .iter()
            .filter_map(|record| record[self.id_field].as_u64())
            .collect())
    }

    /// Append a batch, skipping records whose identifier is already
    /// persisted. Returns how many records were written.
    pub fn append_batch(&self, records: &[Value]) -> Result<usize> {
        let _guard = self.lock.lock().unwrap();
        let mut seen = self.processed_ids()?;

        let fresh: Vec<&Value> = records
            .iter()
            .filter(|record| match record[self.id_field].as_u64() {
                Some(id) => seen.insert(id),
                None => {
                    warn!(field = self.id_field, "dropping record without identifier");
                    false
                }
            })
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        for record in &fresh {
            writeln!(file, "{record}")
                .with_context(|| format!("appending to {}", self.path.display()))?;
        }
        Ok(fresh.len())
    }
}

/// Read newline-delimited JSON, skipping blank and malformed lines.
pub fn read_jsonl(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut records = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(value) => records.push(value),
            Err(e) => {
                warn!(path = %path.display(), line = number + 1, error = %e, "skipping malformed record")
            }
        }
    }
    Ok(records)
}

/// Parse a result file whose records were written back-to-back with no
/// separators (`}{`), a damage mode of interrupted concurrent appends.
///
/// Inserts the missing separators, wraps the whole text as a JSON array,
/// and parses that. Well-formed JSONL and plain arrays pass through
/// unchanged in meaning.
pub fn repair_concatenated(content: &str) -> Result<Vec<Value>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("parsing JSON array");
    }
    let separator = Regex::new(r"\}\s*\{").expect("valid separator regex");
    let fixed = separator.replace_all(trimmed, "},{");
    serde_json::from_str(&format!("[{fixed}]")).context("parsing repaired JSON")
}

/// Deduplicate records by identifier, first occurrence winning, preserving
/// order. Records without the identifier field are dropped.
pub fn merge_by_id(records: Vec<Value>, id_field: &str) -> Vec<Value> {
    let mut seen: HashSet<u64> = HashSet::new();
    records
        .into_iter()
        .filter(|record| match record[id_field].as_u64() {
            Some(id) => seen.insert(id),
            None => {
                warn!(field = id_field, "dropping record without identifier");
                false
            }
        })
        .collect()
}
