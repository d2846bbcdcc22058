//! Built-in node types shipped with the core.
//!
//! Connector descriptors loaded through [`super::loader`] extend or replace
//! these entries at startup.

use super::types::*;
use super::NodeCatalog;

/// OAuth scopes used by the built-in entries.
pub mod scopes {
    pub const GMAIL_READONLY: &str = "https://www.googleapis.com/auth/gmail.readonly";
    pub const GMAIL_SEND: &str = "https://www.googleapis.com/auth/gmail.send";
    pub const GMAIL_MODIFY: &str = "https://www.googleapis.com/auth/gmail.modify";
    pub const SHEETS: &str = "https://www.googleapis.com/auth/spreadsheets";
    pub const SHEETS_READONLY: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
    pub const CALENDAR: &str = "https://www.googleapis.com/auth/calendar";
    pub const CALENDAR_READONLY: &str = "https://www.googleapis.com/auth/calendar.readonly";
    pub const DRIVE_FILE: &str = "https://www.googleapis.com/auth/drive.file";
    pub const DRIVE_READONLY: &str = "https://www.googleapis.com/auth/drive.readonly";
    pub const FORMS_READONLY: &str = "https://www.googleapis.com/auth/forms.readonly";
    pub const EXTERNAL_REQUEST: &str = "https://www.googleapis.com/auth/script.external_request";
    pub const SCRIPT_TRIGGERS: &str = "https://www.googleapis.com/auth/script.scriptapp";
}

/// Type id of the time-based trigger used by the planner fallback.
pub const SCHEDULE_TRIGGER: &str = "builtin.schedule";
/// Type id of the generic action used by the planner fallback.
pub const LOG_ACTION: &str = "builtin.log";

pub const FREQUENCIES: &[&str] = &["minutes", "hourly", "daily", "weekly", "monthly"];
const WEEKDAYS: &[&str] = &[
    "MONDAY", "TUESDAY", "WEDNESDAY", "THURSDAY", "FRIDAY", "SATURDAY", "SUNDAY",
];

/// The default catalog.
pub fn builtin_catalog() -> NodeCatalog {
    let mut catalog = NodeCatalog::new();
    for nt in builtin_types() {
        // Built-in ids are unique, so registration cannot conflict.
        let _ = catalog.register(nt);
    }
    catalog
}

pub fn builtin_types() -> Vec<NodeType> {
    use self::scopes::*;
    use Category::*;
    use ParamKind::*;

    vec![
        // Triggers
        op(
            SCHEDULE_TRIGGER,
            Trigger,
            "Schedule",
            "Run on a fixed time-based cadence",
            vec![
                ParamSpec::required("frequency", String).one_of(FREQUENCIES),
                ParamSpec::optional("interval", Number).describe("Every N units for minutes/hourly"),
                ParamSpec::optional("hour", Number).describe("Hour of day, 0-23"),
                ParamSpec::optional("weekday", String).one_of(WEEKDAYS),
            ],
            &[SCRIPT_TRIGGERS],
        ),
        op("builtin.manual", Trigger, "Manual run", "Run when started by hand", vec![], &[]),
        op(
            "gmail.new_message",
            Trigger,
            "New email",
            "Poll the mailbox for new messages matching a query",
            vec![
                ParamSpec::optional("query", String).describe("Mail search query"),
                ParamSpec::optional("poll_minutes", Number),
            ],
            &[GMAIL_READONLY, SCRIPT_TRIGGERS],
        ),
        op(
            "sheets.on_edit",
            Trigger,
            "Spreadsheet edited",
            "Fire when a spreadsheet is edited",
            vec![
                ParamSpec::required("spreadsheet_url", String),
                ParamSpec::optional("sheet_name", String),
            ],
            &[SHEETS_READONLY, SCRIPT_TRIGGERS],
        ),
        op(
            "forms.on_submit",
            Trigger,
            "Form submitted",
            "Fire when a form response is submitted",
            vec![ParamSpec::required("form_id", String)],
            &[FORMS_READONLY, SCRIPT_TRIGGERS],
        ),
        op(
            "calendar.event_updated",
            Trigger,
            "Calendar event updated",
            "Fire when events on a calendar change",
            vec![ParamSpec::required("calendar_id", String)],
            &[CALENDAR_READONLY, SCRIPT_TRIGGERS],
        ),
        // Transforms
        op(
            "builtin.filter",
            Transform,
            "Filter",
            "Stop the run unless a condition holds",
            vec![
                ParamSpec::required("field", String),
                ParamSpec::required("operator", String).one_of(&[
                    "equals", "not_equals", "contains", "gt", "lt", "exists",
                ]),
                ParamSpec::optional("value", String),
            ],
            &[],
        ),
        op(
            "builtin.format_text",
            Transform,
            "Format text",
            "Build a string from a template",
            vec![ParamSpec::required("template", String)],
            &[],
        ),
        op(
            "builtin.extract_field",
            Transform,
            "Extract field",
            "Pick one field out of an upstream output",
            vec![
                ParamSpec::required("source", String),
                ParamSpec::required("path", String),
            ],
            &[],
        ),
        // Actions
        op(
            "gmail.search",
            Action,
            "Search email",
            "Find messages matching a mail search query",
            vec![
                ParamSpec::required("query", String),
                ParamSpec::optional("max_results", Number),
            ],
            &[GMAIL_READONLY],
        ),
        op(
            "gmail.send",
            Action,
            "Send email",
            "Send a plain-text email",
            vec![
                ParamSpec::required("to", String),
                ParamSpec::required("subject", String),
                ParamSpec::required("body", String),
                ParamSpec::optional("cc", String),
            ],
            &[GMAIL_SEND],
        ),
        op(
            "gmail.add_label",
            Action,
            "Label email",
            "Apply a label to messages",
            vec![
                ParamSpec::required("message_ids", Array),
                ParamSpec::required("label", String),
            ],
            &[GMAIL_MODIFY],
        ),
        op(
            "sheets.append_row",
            Action,
            "Append row",
            "Append one row of values to a spreadsheet",
            vec![
                ParamSpec::required("spreadsheet_url", String),
                ParamSpec::optional("sheet_name", String),
                ParamSpec::required("values", Array),
            ],
            &[SHEETS],
        ),
        op(
            "sheets.read_range",
            Action,
            "Read range",
            "Read a cell range from a spreadsheet",
            vec![
                ParamSpec::required("spreadsheet_url", String),
                ParamSpec::required("range", String),
            ],
            &[SHEETS_READONLY],
        ),
        op(
            "sheets.update_range",
            Action,
            "Update range",
            "Overwrite a cell range in a spreadsheet",
            vec![
                ParamSpec::required("spreadsheet_url", String),
                ParamSpec::required("range", String),
                ParamSpec::required("values", Array),
            ],
            &[SHEETS],
        ),
        op(
            "calendar.create_event",
            Action,
            "Create event",
            "Create a calendar event",
            vec![
                ParamSpec::optional("calendar_id", String),
                ParamSpec::required("title", String),
                ParamSpec::required("start", String),
                ParamSpec::required("end", String),
                ParamSpec::optional("description", String),
            ],
            &[CALENDAR],
        ),
        op(
            "calendar.list_events",
            Action,
            "List events",
            "List upcoming calendar events",
            vec![
                ParamSpec::optional("calendar_id", String),
                ParamSpec::optional("days_ahead", Number),
            ],
            &[CALENDAR_READONLY],
        ),
        op(
            "drive.create_file",
            Action,
            "Create file",
            "Create a text file in storage",
            vec![
                ParamSpec::required("name", String),
                ParamSpec::required("content", String),
                ParamSpec::optional("folder_id", String),
                ParamSpec::optional("mime_type", String),
            ],
            &[DRIVE_FILE],
        ),
        op(
            "drive.list_files",
            Action,
            "List files",
            "List files matching a storage query",
            vec![ParamSpec::optional("query", String)],
            &[DRIVE_READONLY],
        ),
        op(
            "http.request",
            Action,
            "HTTP request",
            "Call an external HTTP endpoint",
            vec![
                ParamSpec::required("url", String),
                ParamSpec::optional("method", String)
                    .one_of(&["GET", "POST", "PUT", "PATCH", "DELETE"]),
                ParamSpec::optional("headers", Object),
                ParamSpec::optional("body", Object),
            ],
            &[EXTERNAL_REQUEST],
        ),
        op(
            "slack.post_message",
            Action,
            "Post chat message",
            "Post a message to a chat incoming webhook",
            vec![
                ParamSpec::required("webhook_url", String),
                ParamSpec::required("text", String),
            ],
            &[EXTERNAL_REQUEST],
        ),
        op(
            LOG_ACTION,
            Action,
            "Log",
            "Write a message to the execution log",
            vec![ParamSpec::required("message", String)],
            &[],
        ),
    ]
}

fn op(
    id: &str,
    category: Category,
    name: &str,
    description: &str,
    params: Vec<ParamSpec>,
    scopes: &[&str],
) -> NodeType {
    let (app, operation) = id.split_once('.').unwrap_or(("builtin", id));
    NodeType {
        id: id.into(),
        category,
        app: app.into(),
        operation: operation.into(),
        name: name.into(),
        description: description.into(),
        params_schema: ParamsSchema::new(params),
        required_scopes: scopes.iter().map(|s| s.to_string()).collect(),
        implementation_hint: None,
    }
}
