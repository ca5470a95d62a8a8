use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[a-zA-Z]*\n?|```").expect("static regex"));

/// Remove markdown code fences a model wraps around JSON output.
#[must_use]
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").into_owned()
}

/// Parse structured output from free-form model text.
///
/// Tries the fence-stripped text as-is, then the widest `[..]` or
/// `{..}` slice inside it. Returns `None` for anything unparseable; a
/// malformed response is "no result", never an error that crosses the
/// pipeline boundary.
#[must_use]
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let stripped = strip_code_fences(raw);
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<T>(trimmed) {
        return Some(value);
    }
    for (open, close) in [('[', ']'), ('{', '}')] {
        let Some(start) = trimmed.find(open) else {
            continue;
        };
        let Some(end) = trimmed.rfind(close) else {
            continue;
        };
        if end <= start {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<T>(&trimmed[start..=end]) {
            return Some(value);
        }
    }
    None
}
