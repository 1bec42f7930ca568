//! FEVEROUS claim-verification driver.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

use deliberation::extract_final_answer;

use super::{field_text, Benchmark};

const TASK: &str = r#"You are an expert in question answering.
You will be given a claim and relevant set of evidence.
Verdict the claim as "SUPPORTS", "REFUTES", or "NOT ENOUGH INFO" based on given evidence.

Guidance:
- For a claim to be marked as "SUPPORTS", every piece of information in the claim must be backed by evidence.
- To mark a claim as "REFUTES", you only need to find sufficient evidence that contradicts any part of the claim. Even if the rest of the claim might be accurate, refuting one section is enough.
- A claim is classified as "NOT ENOUGH INFO" if there is not enough information available in the provided evidence to verify or refute it. This typically happens when the relevant data is missing, incomplete, or ambiguous.

Your answer format should be (only final answer is needed, no explanation after):

Final Answer:
(choose from "SUPPORTS", "REFUTES", or "NOT ENOUGH INFO")"#;

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)supports|refutes|not enough info").expect("valid regex"))
}

/// Canonical verdict label; an unrecognizable answer recovers to
/// `NOT ENOUGH INFO`.
fn verdict(final_answer: &str) -> String {
    let answer = extract_final_answer(final_answer).unwrap_or_else(|| final_answer.to_string());
    match label_re().find(&answer) {
        Some(label) => label.as_str().to_uppercase(),
        None => "NOT ENOUGH INFO".to_string(),
    }
}

pub struct Feverous;

impl Benchmark for Feverous {
    fn name(&self) -> &'static str {
        "feverous"
    }

    fn task_description(&self) -> &str {
        TASK
    }

    fn instance_query(&self, item: &Value) -> Option<String> {
        let claim = item.get("claim")?.as_str()?;
        let evidence = field_text(item.get("evidence")?);
        Some(format!("Claim: {claim}\nEvidence: {evidence}"))
    }

    fn record(&self, index: u64, _item: &Value, final_answer: &str, _transcript: &[String]) -> Value {
        json!({"index": index, "prediction": verdict(final_answer)})
    }
}
