//! Shared final-answer extraction.
//!
//! One extraction grammar serves both deliberation strategies and the
//! dataset drivers:
//!
//! - marker: the literal text `final answer:`, matched case-insensitively;
//! - the answer is everything after the *last* marker occurrence, up to a
//!   trailing blank line or the end of the text;
//! - surrounding whitespace is trimmed and any embedded marker occurrences
//!   are deleted;
//! - a missing marker yields `None`.

use std::sync::OnceLock;

use regex::Regex;

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)final answer:").expect("valid marker regex"))
}

fn blank_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A newline followed by a whitespace-only line.
    RE.get_or_init(|| Regex::new(r"(?m)\n[ \t\r]*$").expect("valid blank-line regex"))
}

/// Extract the stated final answer from a raw model output.
pub fn extract_final_answer(output: &str) -> Option<String> {
    let marker = marker_re().find_iter(output).last()?;
    // Whitespace between the marker and the answer does not count as the
    // terminating blank line.
    let mut tail = output[marker.end()..].trim_start();
    if let Some(stop) = blank_line_re().find(tail) {
        tail = &tail[..stop.start()];
    }
    let cleaned = marker_re().replace_all(tail, "");
    Some(cleaned.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_after_marker() {
        let output = "Steps:\n1. look\n2. decide\n\nFinal Answer:\nSUPPORTS";
        assert_eq!(extract_final_answer(output), Some("SUPPORTS".to_string()));
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        assert_eq!(
            extract_final_answer("FINAL ANSWER: yes"),
            Some("yes".to_string())
        );
        assert_eq!(
            extract_final_answer("final answer:\n  no  "),
            Some("no".to_string())
        );
    }

    #[test]
    fn test_takes_last_occurrence() {
        let output = "Final Answer: draft\nMore reasoning...\nFinal Answer:\npolished";
        assert_eq!(extract_final_answer(output), Some("polished".to_string()));
    }

    #[test]
    fn test_stops_at_trailing_blank_line() {
        let output = "Final Answer:\n42\n\nSome afterthought the format forbids.";
        assert_eq!(extract_final_answer(output), Some("42".to_string()));
    }

    #[test]
    fn test_blank_line_after_marker_is_not_the_answer() {
        assert_eq!(
            extract_final_answer("Final Answer:\n\nPOSITIVE"),
            Some("POSITIVE".to_string())
        );
    }

    #[test]
    fn test_strips_embedded_markers() {
        let output = "final answer: Final Answer: POSITIVE";
        assert_eq!(extract_final_answer(output), Some("POSITIVE".to_string()));
    }

    #[test]
    fn test_missing_marker_is_none() {
        assert_eq!(extract_final_answer("no verdict given"), None);
        assert_eq!(extract_final_answer(""), None);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        // Re-extracting from an already-extracted bare answer yields the
        // same string.
        let raw = "reasoning...\nFinal Answer:\nLine B wins";
        let first = extract_final_answer(raw).unwrap();
        let second = extract_final_answer(&format!("Final Answer:\n{first}")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_marker_with_empty_tail_is_blank_answer() {
        assert_eq!(extract_final_answer("Final Answer:"), Some(String::new()));
    }
}
