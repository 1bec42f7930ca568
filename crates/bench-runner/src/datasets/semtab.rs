//! SEM-TAB-FACTS statement-verification driver.
//!
//! Input records carry a flattened table (caption + rows) and one statement
//! each; the identifier is the dataset's `global_id`. The persisted `type`
//! feeds the downstream XML re-annotation step.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

use deliberation::extract_final_answer;

use super::{field_text, Benchmark};

const TASK: &str = r#"Based on the given table and relevant texts, determine whether a statement is **entailed**, **refuted**, or **unknown**.

"entailed": you can directly or indirectly extract info and decide on its being entailed.
"refuted": there is information about the statement that offers you reasons to refute it.
"unknown": when in some cases, the statement cannot be determined from the table or there is insufficient information to make a determination.

Final Response Format:(make sure you write out the indicator "Final Answer:")

Analysis:
1.
2.
...

Final Answer:
(choose from entailed/refuted/unknown)"#;

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)entailed|refuted|unknown").expect("valid regex"))
}

/// Statement label; an unrecognizable answer recovers to `unknown`.
fn label(final_answer: &str) -> String {
    let answer = extract_final_answer(final_answer).unwrap_or_else(|| final_answer.to_string());
    match label_re().find(&answer) {
        Some(label) => label.as_str().to_lowercase(),
        None => "unknown".to_string(),
    }
}

pub struct SemTabFacts;

impl Benchmark for SemTabFacts {
    fn name(&self) -> &'static str {
        "sem-tab-facts"
    }

    fn id_field(&self) -> &'static str {
        "global_id"
    }

    fn task_description(&self) -> &str {
        TASK
    }

    fn instance_query(&self, item: &Value) -> Option<String> {
        let rows = item.get("rows")?.as_array()?;
        let table_rows: Vec<String> = rows
            .iter()
            .map(|row| match row.as_array() {
                Some(cells) => cells
                    .iter()
                    .map(field_text)
                    .collect::<Vec<_>>()
                    .join(", "),
                None => field_text(row),
            })
            .collect();
        let caption = item.get("caption").map(field_text).unwrap_or_default();
        let legend = item.get("legend").map(field_text).unwrap_or_default();
        let footnote = item.get("footnote").map(field_text).unwrap_or_default();
        let statement = item.get("text")?.as_str()?;

        Some(format!(
            "Table:\nCaption: {caption}\nRows:\n{}\n\nNotes:\nLegend: {legend}\nFootnote: \
             {footnote}\n\nStatement:\n{statement}",
            table_rows.join("\n")
        ))
    }

    fn record(&self, index: u64, item: &Value, final_answer: &str, _transcript: &[String]) -> Value {
        json!({
            "global_id": index,
            "xml_id": item.get("xml_id").cloned().unwrap_or(Value::Null),
            "table_id": item.get("table_id").cloned().unwrap_or(Value::Null),
            "statement_id": item.get("id").cloned().unwrap_or(Value::Null),
            "type": label(final_answer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_canonicalized() {
        assert_eq!(label("Final Answer:\nEntailed"), "entailed");
        assert_eq!(label("Final Answer:\nrefuted."), "refuted");
        assert_eq!(label("no idea at all"), "unknown");
    }

    #[test]
    fn test_query_renders_table_and_statement() {
        let driver = SemTabFacts;
        let item = serde_json::json!({
            "global_id": 3,
            "xml_id": "10064",
            "table_id": "t1",
            "id": "s2",
            "caption": "Rainfall by month",
            "rows": [["Month", "mm"], ["May", "120"]],
            "legend": "",
            "footnote": "",
            "text": "May was the wettest month.",
        });
        let query = driver.instance_query(&item).unwrap();
        assert!(query.contains("Caption: Rainfall by month"));
        assert!(query.contains("Month, mm\nMay, 120"));
        assert!(query.ends_with("Statement:\nMay was the wettest month."));

        let record = driver.record(3, &item, "Final Answer:\nentailed", &[]);
        assert_eq!(record["global_id"], 3);
        assert_eq!(record["xml_id"], "10064");
        assert_eq!(record["statement_id"], "s2");
        assert_eq!(record["type"], "entailed");
    }

    #[test]
    fn test_missing_statement_is_rejected() {
        let driver = SemTabFacts;
        assert!(driver
            .instance_query(&serde_json::json!({"rows": [], "caption": "c"}))
            .is_none());
    }
}
