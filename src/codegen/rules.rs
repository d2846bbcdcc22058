//! Per-operation emission rules for the `runWorkflow` body.
//!
//! Dispatch is on `(category, app, operation)`. Every fragment stores its
//! result in `ctx.outputs[<node id>]` so downstream placeholders can read it.

use crate::catalog::{Category, NodeType};
use crate::graph::GraphNode;

use super::expr::{emit_or, emit_value, js_string};
use super::writer::CodeWriter;

/// Whether a node got a real rule or a stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    Rule,
    Stub,
}

/// Emit the fragment for one node.
pub fn emit_node(node: &GraphNode, node_type: &NodeType, w: &mut CodeWriter) -> Emission {
    w.comment(&format!("[{}] {} ({})", node.id, display_label(node, node_type), node_type.id));
    w.line("{");
    w.indent();

    let emission = match (node_type.category, node_type.app.as_str(), node_type.operation.as_str()) {
        (Category::Trigger, "gmail", "new_message") => {
            emit_gmail_poll(node, w);
            Emission::Rule
        }
        (Category::Trigger, _, _) => {
            emit_trigger_event(node, w);
            Emission::Rule
        }
        (Category::Transform, "builtin", "filter") => emit_filter(node, w),
        (Category::Transform, "builtin", "format_text") => {
            set_output(node, &format!("{{ text: {} }}", arg(node, "template")), w);
            Emission::Rule
        }
        (Category::Transform, "builtin", "extract_field") => {
            set_output(
                node,
                &format!("{{ value: readPath_({}, {}) }}", arg(node, "source"), arg(node, "path")),
                w,
            );
            Emission::Rule
        }
        (Category::Action, "gmail", op) => emit_gmail(node, op, w),
        (Category::Action, "sheets", op) => emit_sheets(node, op, w),
        (Category::Action, "calendar", op) => emit_calendar(node, op, w),
        (Category::Action, "drive", op) => emit_drive(node, op, w),
        (Category::Action, "http", "request") => {
            w.line(&format!(
                "const response = httpRequest_({}, {{ method: {}, headers: {}, payload: {} }});",
                arg(node, "url"),
                emit_or(node.params.get("method"), "\"GET\""),
                emit_or(node.params.get("headers"), "{}"),
                emit_or(node.params.get("body"), "null"),
            ));
            set_output(node, "response", w);
            Emission::Rule
        }
        (Category::Action, "slack", "post_message") => {
            w.line(&format!(
                "const response = httpRequest_({}, {{ method: \"POST\", payload: {{ text: {} }} }});",
                arg(node, "webhook_url"),
                arg(node, "text"),
            ));
            set_output(node, "{ status: response.status }", w);
            Emission::Rule
        }
        (Category::Action, "builtin", "log") => {
            w.line(&format!("const message = String({});", arg(node, "message")));
            w.line("Logger.log(message);");
            set_output(node, "{ message: message }", w);
            Emission::Rule
        }
        _ => Emission::Stub,
    };

    if emission == Emission::Stub {
        emit_stub(node, node_type, w);
    }

    w.block_close();
    emission
}

fn display_label<'a>(node: &'a GraphNode, node_type: &'a NodeType) -> &'a str {
    if node.label.trim().is_empty() {
        &node_type.name
    } else {
        &node.label
    }
}

fn arg(node: &GraphNode, name: &str) -> String {
    emit_or(node.params.get(name), "null")
}

fn set_output(node: &GraphNode, expr: &str, w: &mut CodeWriter) {
    w.line(&format!("ctx.outputs[{}] = {};", js_string(&node.id), expr));
}

fn emit_stub(node: &GraphNode, node_type: &NodeType, w: &mut CodeWriter) {
    w.comment(&format!("STUB: no emission rule for '{}'.", node_type.id));
    if let Some(hint) = &node_type.implementation_hint {
        w.comment(&format!("Hint: {}", hint));
    }
    if !node.params.is_empty() {
        let params: Vec<String> = node
            .params
            .iter()
            .map(|(k, v)| format!("{}: {}", js_string(k), emit_value(v)))
            .collect();
        w.line(&format!("const params = {{ {} }};", params.join(", ")));
    } else {
        w.line("const params = {};");
    }
    w.line(&format!(
        "Logger.log(\"Stub step \" + {} + \" skipped with params \" + JSON.stringify(params));",
        js_string(&node.id)
    ));
    set_output(node, "{ stub: true }", w);
}

fn emit_trigger_event(node: &GraphNode, w: &mut CodeWriter) {
    set_output(node, "{ firedAt: ctx.startedAt, event: ctx.event }", w);
}

fn emit_gmail_poll(node: &GraphNode, w: &mut CodeWriter) {
    w.line(&format!(
        "const threads = GmailApp.search({});",
        emit_or(node.params.get("query"), "\"is:unread\"")
    ));
    w.line(&format!(
        "const fresh = threads.filter(function (t) {{ return markSeen_({}, t.getId()); }});",
        js_string(&node.id)
    ));
    w.block_open("if (fresh.length === 0)");
    w.line("Logger.log(\"No new messages; nothing to do.\");");
    w.line("return ctx;");
    w.block_close();
    set_output(
        node,
        "{ firedAt: ctx.startedAt, count: fresh.length, threads: fresh.map(summarizeThread_) }",
        w,
    );
}

fn emit_filter(node: &GraphNode, w: &mut CodeWriter) -> Emission {
    let operator = node.params.get("operator").and_then(|v| v.as_str()).unwrap_or("exists");
    let cond = match operator {
        "equals" => "String(actual) === String(expected)",
        "not_equals" => "String(actual) !== String(expected)",
        "contains" => "String(actual).indexOf(String(expected)) !== -1",
        "gt" => "Number(actual) > Number(expected)",
        "lt" => "Number(actual) < Number(expected)",
        "exists" => "actual !== null && actual !== undefined && actual !== \"\"",
        _ => return Emission::Stub,
    };
    w.line(&format!("const actual = {};", arg(node, "field")));
    w.line(&format!("const expected = {};", arg(node, "value")));
    w.block_open(&format!("if (!({}))", cond));
    w.line(&format!(
        "Logger.log(\"Filter \" + {} + \" stopped the run.\");",
        js_string(&node.id)
    ));
    w.line("return ctx;");
    w.block_close();
    set_output(node, "{ passed: true, value: actual }", w);
    Emission::Rule
}

fn emit_gmail(node: &GraphNode, op: &str, w: &mut CodeWriter) -> Emission {
    match op {
        "search" => {
            w.line(&format!(
                "const threads = GmailApp.search({}, 0, {});",
                arg(node, "query"),
                emit_or(node.params.get("max_results"), "50")
            ));
            set_output(node, "{ count: threads.length, threads: threads.map(summarizeThread_) }", w);
        }
        "send" => {
            w.line(&format!(
                "const options = {};",
                match node.params.get("cc") {
                    Some(cc) if !cc.is_null() => format!("{{ cc: {} }}", emit_value(cc)),
                    _ => "{}".into(),
                }
            ));
            w.line(&format!(
                "GmailApp.sendEmail({}, {}, String({}), options);",
                arg(node, "to"),
                arg(node, "subject"),
                arg(node, "body")
            ));
            set_output(node, &format!("{{ sent: true, to: {} }}", arg(node, "to")), w);
        }
        "add_label" => {
            w.line(&format!("const labelName = {};", arg(node, "label")));
            w.line("const label = GmailApp.getUserLabelByName(labelName) || GmailApp.createLabel(labelName);");
            w.line(&format!("const ids = [].concat({});", arg(node, "message_ids")));
            w.line("ids.forEach(function (id) { GmailApp.getThreadById(id).addLabel(label); });");
            set_output(node, "{ labelled: ids.length }", w);
        }
        _ => return Emission::Stub,
    }
    Emission::Rule
}

fn emit_sheets(node: &GraphNode, op: &str, w: &mut CodeWriter) -> Emission {
    let open = format!("SpreadsheetApp.openByUrl({})", arg(node, "spreadsheet_url"));
    match op {
        "append_row" => {
            w.line(&format!("const book = {};", open));
            w.line(&format!(
                "const sheet = {} ? book.getSheetByName({}) : book.getSheets()[0];",
                emit_or(node.params.get("sheet_name"), "null"),
                emit_or(node.params.get("sheet_name"), "null")
            ));
            w.line(&format!("sheet.appendRow([].concat({}));", arg(node, "values")));
            set_output(node, "{ row: sheet.getLastRow() }", w);
        }
        "read_range" => {
            w.line(&format!("const values = {}.getRange({}).getValues();", open, arg(node, "range")));
            set_output(node, "{ rows: values.length, values: values }", w);
        }
        "update_range" => {
            w.line(&format!("const values = {};", arg(node, "values")));
            w.line(&format!("{}.getRange({}).setValues(values);", open, arg(node, "range")));
            set_output(node, "{ updated: values.length }", w);
        }
        _ => return Emission::Stub,
    }
    Emission::Rule
}

fn emit_calendar(node: &GraphNode, op: &str, w: &mut CodeWriter) -> Emission {
    let calendar_id = emit_or(node.params.get("calendar_id"), "null");
    let open = format!(
        "{} ? CalendarApp.getCalendarById({}) : CalendarApp.getDefaultCalendar()",
        calendar_id, calendar_id
    );
    match op {
        "create_event" => {
            w.line(&format!("const calendar = {};", open));
            w.line(&format!(
                "const created = calendar.createEvent({}, new Date({}), new Date({}), {{ description: {} }});",
                arg(node, "title"),
                arg(node, "start"),
                arg(node, "end"),
                emit_or(node.params.get("description"), "\"\"")
            ));
            set_output(node, "{ eventId: created.getId() }", w);
        }
        "list_events" => {
            w.line(&format!("const calendar = {};", open));
            w.line("const from = new Date();");
            w.line(&format!(
                "const until = new Date(from.getTime() + {} * 24 * 60 * 60 * 1000);",
                emit_or(node.params.get("days_ahead"), "7")
            ));
            w.line("const events = calendar.getEvents(from, until);");
            set_output(
                node,
                "{ count: events.length, events: events.map(function (ev) { return { id: ev.getId(), title: ev.getTitle(), start: ev.getStartTime().toISOString() }; }) }",
                w,
            );
        }
        _ => return Emission::Stub,
    }
    Emission::Rule
}

fn emit_drive(node: &GraphNode, op: &str, w: &mut CodeWriter) -> Emission {
    match op {
        "create_file" => {
            let folder = emit_or(node.params.get("folder_id"), "null");
            w.line(&format!(
                "const parent = {} ? DriveApp.getFolderById({}) : DriveApp.getRootFolder();",
                folder, folder
            ));
            w.line(&format!(
                "const file = parent.createFile({}, String({}), {});",
                arg(node, "name"),
                arg(node, "content"),
                emit_or(node.params.get("mime_type"), "MimeType.PLAIN_TEXT")
            ));
            set_output(node, "{ fileId: file.getId(), url: file.getUrl() }", w);
        }
        "list_files" => {
            w.line(&format!(
                "const it = {};",
                match node.params.get("query") {
                    Some(q) if !q.is_null() => format!("DriveApp.searchFiles({})", emit_value(q)),
                    _ => "DriveApp.getFiles()".into(),
                }
            ));
            w.line("const files = [];");
            w.block_open("while (it.hasNext() && files.length < 100)");
            w.line("const f = it.next();");
            w.line("files.push({ id: f.getId(), name: f.getName(), url: f.getUrl() });");
            w.block_close();
            set_output(node, "{ count: files.length, files: files }", w);
        }
        _ => return Emission::Stub,
    }
    Emission::Rule
}
