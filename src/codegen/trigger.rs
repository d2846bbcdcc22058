//! Emit `installTriggers()`, which (re)creates the runtime triggers that
//! call `runWorkflow`.

use serde_json::Value;

use crate::catalog::NodeType;
use crate::graph::GraphNode;

use super::expr::{emit_or, emit_value};
use super::writer::CodeWriter;

/// Intervals accepted by `everyMinutes`.
const MINUTE_STEPS: &[u64] = &[1, 5, 10, 15, 30];

pub fn emit_install_triggers(triggers: &[(&GraphNode, &NodeType)], w: &mut CodeWriter) {
    w.block_open("function installTriggers()");
    w.line("ScriptApp.getProjectTriggers()");
    w.indent();
    w.line(".filter(function (t) { return t.getHandlerFunction() === \"runWorkflow\"; })");
    w.line(".forEach(function (t) { ScriptApp.deleteTrigger(t); });");
    w.dedent();

    for (node, node_type) in triggers {
        w.comment(&format!("[{}] {}", node.id, node_type.id));
        match node_type.id.as_str() {
            "builtin.schedule" => emit_schedule(node, w),
            "gmail.new_message" => {
                let minutes = minute_step(node.params.get("poll_minutes").and_then(Value::as_u64).unwrap_or(5));
                w.line(&format!(
                    "ScriptApp.newTrigger(\"runWorkflow\").timeBased().everyMinutes({}).create();",
                    minutes
                ));
            }
            "sheets.on_edit" => w.line(&format!(
                "ScriptApp.newTrigger(\"runWorkflow\").forSpreadsheet(SpreadsheetApp.openByUrl({})).onEdit().create();",
                emit_or(node.params.get("spreadsheet_url"), "null")
            )),
            "forms.on_submit" => w.line(&format!(
                "ScriptApp.newTrigger(\"runWorkflow\").forForm({}).onFormSubmit().create();",
                emit_or(node.params.get("form_id"), "null")
            )),
            "calendar.event_updated" => w.line(&format!(
                "ScriptApp.newTrigger(\"runWorkflow\").forUserCalendar({}).onEventUpdated().create();",
                emit_or(node.params.get("calendar_id"), "null")
            )),
            "builtin.manual" => w.comment("Manual trigger: run runWorkflow() from the editor."),
            _ => w.comment("STUB: no installer for this trigger type; run runWorkflow() manually."),
        }
    }

    w.block_close();
}

fn emit_schedule(node: &GraphNode, w: &mut CodeWriter) {
    let frequency = node.params.get("frequency").and_then(Value::as_str).unwrap_or("daily");
    let interval = node.params.get("interval").and_then(Value::as_u64).unwrap_or(1).max(1);
    let hour = node
        .params
        .get("hour")
        .map(emit_value)
        .unwrap_or_else(|| "9".into());

    let chain = match frequency {
        "minutes" => format!("everyMinutes({})", minute_step(interval)),
        "hourly" => format!("everyHours({})", interval),
        "weekly" => format!(
            "onWeekDay(ScriptApp.WeekDay.{}).atHour({})",
            node.params
                .get("weekday")
                .and_then(Value::as_str)
                .unwrap_or("MONDAY"),
            hour
        ),
        "monthly" => format!("onMonthDay(1).atHour({})", hour),
        _ => format!("everyDays(1).atHour({})", hour),
    };
    w.line(&format!(
        "ScriptApp.newTrigger(\"runWorkflow\").timeBased().{}.create();",
        chain
    ));
}

fn minute_step(requested: u64) -> u64 {
    MINUTE_STEPS
        .iter()
        .copied()
        .find(|&m| m >= requested)
        .unwrap_or(30)
}
