//! Parameter value → Apps Script expression conversion.
//!
//! Node placeholders become `readOutput_(ctx, "<node>", "<path>")` lookups
//! against the shared execution state; secrets become `getSecret_("<NAME>")`.

use serde_json::Value;

use crate::graph::reference::{parse_template, pure_reference};
use crate::graph::{Placeholder, TemplatePart};

/// Convert a JSON parameter value into a JS expression.
pub fn emit_value(value: &Value) -> String {
    match value {
        Value::String(s) => emit_string(s),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(emit_value).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => {
            if map.is_empty() {
                return "{}".into();
            }
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", js_string(k), emit_value(v)))
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => value.to_string(),
    }
}

/// Optional parameter: the value's expression, or `fallback` if absent.
pub fn emit_or(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_null() => emit_value(v),
        _ => fallback.to_string(),
    }
}

fn emit_string(s: &str) -> String {
    if let Some(p) = pure_reference(s) {
        return emit_placeholder(&p);
    }

    let parts = parse_template(s);
    if !parts.iter().any(|p| matches!(p, TemplatePart::Ref(_))) {
        return js_string(s);
    }

    let mut out = String::from("`");
    for part in &parts {
        match part {
            TemplatePart::Lit(text) => out.push_str(&escape_template(text)),
            TemplatePart::Ref(p) => {
                out.push_str("${");
                out.push_str(&emit_placeholder(p));
                out.push('}');
            }
        }
    }
    out.push('`');
    out
}

pub fn emit_placeholder(p: &Placeholder) -> String {
    match p {
        Placeholder::Node { node_id, field } => {
            format!("readOutput_(ctx, {}, {})", js_string(node_id), js_string(field))
        }
        Placeholder::Secret { name } => format!("getSecret_({})", js_string(name)),
    }
}

/// A double-quoted JS string literal.
pub fn js_string(s: &str) -> String {
    // JSON string syntax is a subset of JS string syntax.
    serde_json::Value::String(s.to_string()).to_string()
}

fn escape_template(text: &str) -> String {
    text.replace('\\', "\\\\").replace('`', "\\`").replace("${", "\\${")
}
