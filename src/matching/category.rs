//! Category key parsing and keyword compilation.
//!
//! # Key Grammar
//! ```text
//! <baseName>_<hardcoded|p<digits>>_<s<digits>>
//!
//! donotcall_p1_s3        → base "donotcall", priority 1, stage "s3"
//! honeypot_hardcoded_s2  → base "honeypot", hardcoded, stage "s2"
//! not_interested_p2_s1   → base "not_interested", priority 2, stage "s1"
//! ```
//!
//! # Design Decisions
//! - Base names may contain underscores; only the last two segments are structural
//! - Keyword values tolerate string, array and object shapes; non-strings are dropped
//! - Keywords are escaped before compilation so they match verbatim

use regex::Regex;
use serde_json::Value;
use std::fmt;

/// Identity of one labeled bucket of keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInfo {
    /// Category identifier, e.g. "donotcall".
    pub base_name: String,
    /// Stage identifier, always `s<digits>`.
    pub stage: String,
    /// Rank among non-hardcoded categories of the stage. 0 for hardcoded.
    pub priority: u32,
    /// Checked before every prioritized category of the stage.
    pub is_hardcoded: bool,
    /// Value returned on a match.
    pub label: String,
}

/// Parse a configuration key into category metadata.
///
/// Returns `None` for keys with fewer than three segments, a last segment that
/// is not `s<digits>`, a priority token that is neither `hardcoded` nor
/// `p<digits>`, or an empty base name.
pub fn parse_category_key(key: &str) -> Option<CategoryInfo> {
    let parts: Vec<&str> = key.split('_').collect();
    if parts.len() < 3 {
        return None;
    }

    let stage = parts[parts.len() - 1];
    if !is_stage_id(stage) {
        return None;
    }

    let (priority, is_hardcoded) = match parts[parts.len() - 2] {
        "hardcoded" => (0, true),
        token => (parse_prefixed_number(token, 'p')?, false),
    };

    let base_name = parts[..parts.len() - 2].join("_");
    if base_name.is_empty() {
        return None;
    }

    let label = label_for(&base_name);
    Some(CategoryInfo {
        base_name,
        stage: stage.to_string(),
        priority,
        is_hardcoded,
        label,
    })
}

/// Whether `s` is a stage identifier (`s` followed by one or more ASCII digits).
pub fn is_stage_id(s: &str) -> bool {
    parse_prefixed_number(s, 's').is_some()
}

fn parse_prefixed_number(token: &str, prefix: char) -> Option<u32> {
    let digits = token.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Map a base name to the label returned on a match.
///
/// Known categories (with or without underscores) map to canonical labels;
/// anything else is uppercased.
pub fn label_for(base_name: &str) -> String {
    let canonical = match base_name {
        "donotcall" | "do_not_call" => "DO_NOT_CALL",
        "honeypot" => "HONEYPOT",
        "answermachine" | "answer_machine" => "ANSWER_MACHINE",
        "interested" => "INTERESTED",
        "notinterested" | "not_interested" => "NOT_INTERESTED",
        "dnq" => "DNQ",
        "busy" => "BUSY",
        "already" => "ALREADY",
        "rebuttal" => "REBUTTAL",
        "neutral" => "NEUTRAL",
        "repeatpitch" | "repeat_pitch" => "REPEAT_PITCH",
        "greetingresponse" | "greeting_response" => "GREETING_RESPONSE",
        "notfeelinggood" | "not_feeling_good" => "NOT_FEELING_GOOD",
        "donttransfer" | "dont_transfer" => "DONT_TRANSFER",
        other => return other.to_uppercase(),
    };
    canonical.to_string()
}

/// Extract keyword strings from a JSON value.
///
/// Accepts a single string, an array (non-string elements dropped) or an
/// object (its string values, in source order). Returns `None` for any other
/// shape.
pub fn keyword_strings(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        Value::Object(map) => Some(
            map.values()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}

/// Like [`keyword_strings`], treating unsupported shapes as zero keywords.
pub fn parse_keyword_value(value: &Value) -> Vec<String> {
    keyword_strings(value).unwrap_or_default()
}

/// A normalized keyword plus its whole-word pattern.
#[derive(Clone)]
pub struct KeywordEntry {
    text: String,
    pattern: Regex,
}

impl KeywordEntry {
    /// Normalize and compile a raw keyword.
    ///
    /// Returns `Ok(None)` when the keyword normalizes to the empty string.
    pub fn compile(raw: &str) -> Result<Option<Self>, regex::Error> {
        let text = super::normalize(raw);
        if text.is_empty() {
            return Ok(None);
        }
        let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&text)))?;
        Ok(Some(Self { text, pattern }))
    }

    /// The normalized keyword.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the keyword occurs in `normalized` bounded by word edges.
    pub fn is_match_in(&self, normalized: &str) -> bool {
        self.pattern.is_match(normalized)
    }
}

impl fmt::Debug for KeywordEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeywordEntry").field(&self.text).finish()
    }
}

/// Normalize and compile keywords, dropping empty ones.
///
/// Keywords whose pattern fails to compile are logged and skipped; the
/// returned errors let callers surface them.
pub fn build_keyword_entries(raw: &[String]) -> (Vec<KeywordEntry>, Vec<(String, regex::Error)>) {
    let mut entries = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for keyword in raw {
        match KeywordEntry::compile(keyword) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(keyword = %keyword, error = %e, "Rejected keyword pattern");
                rejected.push((keyword.clone(), e));
            }
        }
    }

    (entries, rejected)
}
