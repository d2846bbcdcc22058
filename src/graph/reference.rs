//! Parse `{{nodeId.field}}` and `{{secrets.NAME}}` placeholders out of
//! parameter values.

use serde_json::Value;

/// Namespace reserved for credential placeholders.
pub const SECRETS_NAMESPACE: &str = "secrets";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// Output field of another node. `field` may be empty (whole output)
    /// or a dotted path.
    Node { node_id: String, field: String },
    Secret { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Lit(String),
    Ref(Placeholder),
}

/// If the whole (trimmed) string is a single placeholder, return it.
pub fn pure_reference(input: &str) -> Option<Placeholder> {
    let trimmed = input.trim();
    if trimmed.starts_with("{{") && trimmed.ends_with("}}") && trimmed.matches("{{").count() == 1 {
        return Some(parse_single_ref(&trimmed[2..trimmed.len() - 2]));
    }
    None
}

/// Split a string into literal text and placeholders.
pub fn parse_template(input: &str) -> Vec<TemplatePart> {
    let mut parts = Vec::new();
    let mut remaining = input;

    while let Some(start) = remaining.find("{{") {
        if start > 0 {
            parts.push(TemplatePart::Lit(remaining[..start].to_string()));
        }

        let after_open = &remaining[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                parts.push(TemplatePart::Ref(parse_single_ref(&after_open[..end])));
                remaining = &after_open[end + 2..];
            }
            None => {
                // Unterminated: the rest is literal text
                parts.push(TemplatePart::Lit(remaining[start..].to_string()));
                return parts;
            }
        }
    }

    if !remaining.is_empty() {
        parts.push(TemplatePart::Lit(remaining.to_string()));
    }
    parts
}

/// Every placeholder inside a JSON value, in document order.
pub fn collect_placeholders(value: &Value) -> Vec<Placeholder> {
    let mut out = Vec::new();
    walk(value, &mut out);
    out
}

fn walk(value: &Value, out: &mut Vec<Placeholder>) {
    match value {
        Value::String(s) => {
            for part in parse_template(s) {
                if let TemplatePart::Ref(p) = part {
                    out.push(p);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| walk(v, out)),
        Value::Object(map) => map.values().for_each(|v| walk(v, out)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn parse_single_ref(inner: &str) -> Placeholder {
    let inner = inner.trim();
    let (head, rest) = match inner.find('.') {
        Some(pos) => (&inner[..pos], &inner[pos + 1..]),
        None => (inner, ""),
    };

    if head == SECRETS_NAMESPACE && !rest.is_empty() {
        return Placeholder::Secret {
            name: rest.to_string(),
        };
    }
    Placeholder::Node {
        node_id: head.to_string(),
        field: rest.to_string(),
    }
}
