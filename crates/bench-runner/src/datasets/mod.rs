//! Dataset drivers.
//!
//! Each driver supplies the engine with `(task_description, instance_query)`
//! pairs and owns ID resolution plus answer-format post-processing. The
//! deliberation core never sees dataset specifics.

pub mod feverous;
pub mod semtab;
pub mod tatqa;
pub mod wikisql;

use std::sync::Arc;

use serde_json::Value;

/// A benchmark dataset driver.
pub trait Benchmark: Send + Sync {
    /// Identifier used on the command line.
    fn name(&self) -> &'static str;

    /// Field holding each record's stable identifier.
    fn id_field(&self) -> &'static str {
        "index"
    }

    /// Task description shared by every instance.
    fn task_description(&self) -> &str;

    /// Render one input record into the instance query; `None` when the
    /// record lacks required fields.
    fn instance_query(&self, item: &Value) -> Option<String>;

    /// Convert a deliberation answer into the persisted result record.
    ///
    /// An unrecognizable answer is a recovered condition: drivers fall back
    /// to a dataset-appropriate default instead of failing the item.
    fn record(&self, index: u64, item: &Value, final_answer: &str, transcript: &[String])
        -> Value;
}

/// Look up a driver by its CLI name.
pub fn by_name(name: &str) -> Option<Arc<dyn Benchmark>> {
    match name {
        "feverous" => Some(Arc::new(feverous::Feverous)),
        "sem-tab-facts" | "semtab" => Some(Arc::new(semtab::SemTabFacts)),
        "tat-qa" | "tatqa" => Some(Arc::new(tatqa::TatQa)),
        "wikisql" => Some(Arc::new(wikisql::WikiSql)),
        _ => None,
    }
}

/// Render a JSON value as prompt text: strings verbatim, everything else
/// as compact JSON.
pub(crate) fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_knows_every_driver() {
        for name in ["feverous", "sem-tab-facts", "tat-qa", "wikisql"] {
            assert!(by_name(name).is_some(), "missing driver {name}");
        }
        assert!(by_name("semtab").is_some());
        assert!(by_name("unknown-set").is_none());
    }

    #[test]
    fn test_field_text_keeps_strings_bare() {
        assert_eq!(field_text(&serde_json::json!("plain")), "plain");
        assert_eq!(field_text(&serde_json::json!([1, 2])), "[1,2]");
    }
}
