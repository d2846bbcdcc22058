//! Supporting project files: State.gs, Http.gs, Auth.gs, appsscript.json
//! and README.md.

use std::collections::BTreeSet;

use serde_json::json;

use crate::catalog::NodeCatalog;
use crate::graph::NodeGraph;

/// Execution state and de-duplication store.
pub fn gen_state_gs() -> String {
    r#"// Execution state shared by every step of runWorkflow, keyed by node id.

function createExecutionState_(e) {
  return {
    startedAt: new Date().toISOString(),
    event: e || null,
    outputs: {},
  };
}

function finishExecution_(ctx) {
  Logger.log("Workflow finished; steps run: " + Object.keys(ctx.outputs).length);
}

// Read a dotted field path from a node's stored output.
function readOutput_(ctx, nodeId, path) {
  if (!(nodeId in ctx.outputs)) {
    throw new Error("Output of step '" + nodeId + "' is not available yet");
  }
  return readPath_(ctx.outputs[nodeId], path);
}

function readPath_(value, path) {
  if (!path) {
    return value;
  }
  return String(path).split(".").reduce(function (acc, key) {
    return acc === null || acc === undefined ? undefined : acc[key];
  }, value);
}

// Returns true the first time a (scope, key) pair is seen.
function markSeen_(scope, key) {
  const props = PropertiesService.getScriptProperties();
  const storeKey = "seen:" + scope;
  const seen = JSON.parse(props.getProperty(storeKey) || "[]");
  if (seen.indexOf(key) !== -1) {
    return false;
  }
  seen.push(key);
  // Keep the store under the property size limit.
  props.setProperty(storeKey, JSON.stringify(seen.slice(-500)));
  return true;
}

function summarizeThread_(thread) {
  const first = thread.getMessages()[0];
  return {
    id: thread.getId(),
    subject: thread.getFirstMessageSubject(),
    from: first ? first.getFrom() : "",
    date: thread.getLastMessageDate().toISOString(),
    snippet: first ? first.getPlainBody().slice(0, 200) : "",
  };
}
"#
    .to_string()
}

/// Outbound HTTP helper.
pub fn gen_http_gs() -> String {
    r#"// Outbound HTTP with JSON payloads and decoded responses.

function httpRequest_(url, options) {
  const opts = options || {};
  const params = {
    method: String(opts.method || "GET").toLowerCase(),
    headers: opts.headers || {},
    muteHttpExceptions: true,
  };
  if (opts.payload !== null && opts.payload !== undefined) {
    params.contentType = "application/json";
    params.payload = JSON.stringify(opts.payload);
  }
  const response = UrlFetchApp.fetch(url, params);
  const body = response.getContentText();
  let parsed = null;
  try {
    parsed = JSON.parse(body);
  } catch (err) {
    parsed = null;
  }
  const status = response.getResponseCode();
  if (status >= 400) {
    Logger.log("HTTP " + status + " from " + url);
  }
  return { status: status, body: body, json: parsed };
}
"#
    .to_string()
}

/// Credential scaffolding for the secrets the graph references.
pub fn gen_auth_gs(graph: &NodeGraph) -> String {
    let mut out = String::from(
        r#"// Credentials are read from script properties; set them once with setupSecrets().

function getSecret_(name) {
  const value = PropertiesService.getScriptProperties().getProperty("secret:" + name);
  if (!value) {
    throw new Error("Missing secret '" + name + "'. Run setupSecrets() and fill it in.");
  }
  return value;
}

function setupSecrets() {
  const props = PropertiesService.getScriptProperties();
  const required = ["#,
    );
    let names: Vec<String> = graph
        .secrets
        .iter()
        .map(|s| super::expr::js_string(s))
        .collect();
    out.push_str(&names.join(", "));
    out.push_str(
        r#"];
  required.forEach(function (name) {
    if (!props.getProperty("secret:" + name)) {
      props.setProperty("secret:" + name, "");
      Logger.log("Created empty secret '" + name + "'; set its value in Project Settings.");
    }
  });
}
"#,
    );
    out
}

/// `appsscript.json` manifest with the computed OAuth scopes.
pub fn gen_manifest(scopes: &BTreeSet<String>) -> String {
    let manifest = json!({
        "dependencies": {},
        "exceptionLogging": "STACKDRIVER",
        "oauthScopes": scopes,
        "runtimeVersion": "V8",
        "timeZone": "Etc/UTC",
    });
    let mut text = serde_json::to_string_pretty(&manifest).unwrap_or_else(|_| "{}".into());
    text.push('\n');
    text
}

/// Human-readable summary of the compiled graph.
pub fn gen_readme(
    graph: &NodeGraph,
    catalog: &NodeCatalog,
    order: &[String],
    scopes: &BTreeSet<String>,
    generated_at: &str,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", graph.name));
    out.push_str(&format!(
        "Workflow `{}` version {}. Generated at {}.\n\n",
        graph.id, graph.version, generated_at
    ));

    out.push_str("## Steps\n\n");
    for (i, id) in order.iter().enumerate() {
        let Some(node) = graph.node(id) else { continue };
        let type_name = catalog
            .get(&node.node_type)
            .map(|nt| format!("{} ({})", nt.name, nt.category))
            .unwrap_or_else(|| node.node_type.clone());
        let label = if node.label.is_empty() { id.as_str() } else { node.label.as_str() };
        out.push_str(&format!("{}. **{}** `{}` - {}\n", i + 1, label, id, type_name));
    }

    out.push_str("\n## Permissions\n\n");
    if scopes.is_empty() {
        out.push_str("No OAuth scopes required.\n");
    }
    for scope in scopes {
        out.push_str(&format!("- `{}`\n", scope));
    }

    out.push_str("\n## Secrets\n\n");
    if graph.secrets.is_empty() {
        out.push_str("None.\n");
    }
    for secret in &graph.secrets {
        out.push_str(&format!("- `{}`\n", secret));
    }

    out.push_str(
        "\n## Setup\n\n\
         1. Copy every `.gs` file and `appsscript.json` into a new script project.\n\
         2. Run `setupSecrets()` and fill in any secret values under Project Settings.\n\
         3. Run `installTriggers()` once and grant the requested permissions.\n",
    );
    out
}
