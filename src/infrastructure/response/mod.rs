use crate::domain::locale::fold_case;
use once_cell::sync::Lazy;
use regex::Regex;

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static REASONING_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reasoning>[\s\S]*?</reasoning>").unwrap());

static INTERNAL_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<internal>[\s\S]*?</internal>").unwrap());

static MULTIPLE_NEWLINES_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strips model scratchpad blocks and collapses runs of blank lines.
pub fn clean_llm_response(response: &str) -> String {
    let mut cleaned = THINK_TAG_PATTERN.replace_all(response, "").to_string();
    cleaned = REASONING_TAG_PATTERN.replace_all(&cleaned, "").to_string();
    cleaned = INTERNAL_TAG_PATTERN.replace_all(&cleaned, "").to_string();

    MULTIPLE_NEWLINES_PATTERN
        .replace_all(cleaned.trim(), "\n\n")
        .to_string()
}

/// Case-insensitive substring check for any of the chart trigger words.
pub fn contains_any_marker<S: AsRef<str>>(reply: &str, markers: &[S]) -> bool {
    let reply = fold_case(reply);
    markers
        .iter()
        .map(|m| m.as_ref().trim())
        .filter(|m| !m.is_empty())
        .any(|m| reply.contains(&fold_case(m)))
}
