//! Catalog entry types: node types, parameter schemas and the public
//! capabilities projection handed to the planner.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// =============================================================================
// NODE TYPE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Trigger,
    Transform,
    Action,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Trigger => write!(f, "trigger"),
            Category::Transform => write!(f, "transform"),
            Category::Action => write!(f, "action"),
        }
    }
}

/// Primitive JSON kind a parameter value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamKind {
    /// Whether `value` has this primitive kind.
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Number => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::Array => value.is_array(),
            ParamKind::Object => value.is_object(),
        }
    }

    /// Kind name of an arbitrary JSON value, for diagnostics.
    pub fn describe(value: &serde_json::Value) -> &'static str {
        match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ParamKind::String => "string",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Array => "array",
            ParamKind::Object => "object",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamSpec {
    pub fn required(name: &str, kind: ParamKind) -> Self {
        ParamSpec {
            name: name.into(),
            kind,
            required: true,
            enum_values: None,
            description: None,
        }
    }

    pub fn optional(name: &str, kind: ParamKind) -> Self {
        ParamSpec {
            required: false,
            ..ParamSpec::required(name, kind)
        }
    }

    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.into());
        self
    }
}

/// Ordered parameter declarations for one node type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamsSchema {
    pub params: Vec<ParamSpec>,
}

impl ParamsSchema {
    pub fn new(params: Vec<ParamSpec>) -> Self {
        ParamsSchema { params }
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// One registered operation. Immutable once it is in a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeType {
    pub id: String,
    pub category: Category,
    /// Owning integration, or `builtin`.
    pub app: String,
    /// Operation key within the app; together with category and app it
    /// selects the code emission rule.
    pub operation: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub params_schema: ParamsSchema,
    #[serde(default)]
    pub required_scopes: BTreeSet<String>,
    /// Internal-only note for the code generator; never part of capabilities.
    #[serde(default, skip_serializing)]
    pub implementation_hint: Option<String>,
}

// =============================================================================
// CAPABILITIES
// =============================================================================

/// Public summary of one node type inside [`Capabilities`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSummary {
    pub category: Category,
    pub app: String,
    pub name: String,
    pub description: String,
}

/// Read-only projection of the catalog exposed to the planning phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub nodes: Vec<String>,
    pub summaries: BTreeMap<String, TypeSummary>,
    pub schemas_by_type: BTreeMap<String, ParamsSchema>,
    pub scopes_by_type: BTreeMap<String, BTreeSet<String>>,
}

impl Capabilities {
    pub fn contains(&self, type_id: &str) -> bool {
        self.summaries.contains_key(type_id)
    }
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub type_id: String,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn param_kind_matches_primitives() {
        assert!(ParamKind::String.matches(&json!("x")));
        assert!(ParamKind::Number.matches(&json!(3.5)));
        assert!(ParamKind::Boolean.matches(&json!(false)));
        assert!(ParamKind::Array.matches(&json!([1])));
        assert!(ParamKind::Object.matches(&json!({"a": 1})));
        assert!(!ParamKind::Number.matches(&json!("3")));
    }

    #[test]
    fn implementation_hint_is_not_serialized() {
        let nt = NodeType {
            id: "x.y".into(),
            category: Category::Action,
            app: "x".into(),
            operation: "y".into(),
            name: "Y".into(),
            description: String::new(),
            params_schema: ParamsSchema::default(),
            required_scopes: BTreeSet::new(),
            implementation_hint: Some("secret sauce".into()),
        };
        let text = serde_json::to_string(&nt).unwrap();
        assert!(!text.contains("secret sauce"));
        assert!(!text.contains("implementationHint"));
    }

    #[test]
    fn schema_lookup_by_name() {
        let schema = ParamsSchema::new(vec![
            ParamSpec::required("query", ParamKind::String),
            ParamSpec::optional("limit", ParamKind::Number),
        ]);
        assert!(schema.get("query").unwrap().required);
        assert!(!schema.get("limit").unwrap().required);
        assert!(schema.get("other").is_none());
    }
}
