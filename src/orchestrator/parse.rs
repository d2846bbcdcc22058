//! Defensive parsing of tool responses into typed data.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Tagged parse result.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    /// No JSON object could be recovered from the text.
    Syntax(String),
    /// JSON was found but does not have the expected shape.
    Shape(String),
}

/// Parse `raw` as `T`. If the whole text is not JSON, the first balanced
/// `{...}` substring is tried before giving up.
pub fn parse_response<T: DeserializeOwned>(raw: &str) -> ParseOutcome<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ParseOutcome::Syntax("response was empty".into());
    }

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(v) if v.is_object() => v,
        Ok(_) | Err(_) => match extract_first_object(trimmed)
            .and_then(|s| serde_json::from_str::<Value>(s).ok())
        {
            Some(v) => v,
            None => return ParseOutcome::Syntax("no JSON object found in response".into()),
        },
    };

    match serde_json::from_value::<T>(value) {
        Ok(parsed) => ParseOutcome::Parsed(parsed),
        Err(e) => ParseOutcome::Shape(e.to_string()),
    }
}

/// The first balanced `{...}` substring, honouring JSON string literals.
pub fn extract_first_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = balanced_end(bytes, start) {
            return Some(&text[start..=end]);
        }
        search_from = start + 1;
    }
    None
}

fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
