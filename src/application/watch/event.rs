//! Watch session events
//!
//! Milestones of a watch session for machine-readable output. The human
//! readable status lines go through the watch status reporter instead.

use serde::Serialize;

use crate::domain::entities::Diagnostic;

/// Watch event types for NDJSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    /// Watching began
    WatchStarted {
        config: Option<String>,
        watching: Vec<String>,
    },
    /// A watched file changed content, or a watched directory gained or lost a file
    FileChanged { path: String },
    /// A status message (starting, change detected, summary)
    Status { code: u32, message: String },
    /// A diagnostic from the last cycle
    Diagnostic {
        file: Option<String>,
        line: Option<usize>,
        column: Option<usize>,
        category: String,
        code: u32,
        message: String,
    },
    /// A cycle finished
    CycleComplete { errors: usize, emitted: usize },
    /// Watch stopped
    Shutdown,
}

impl WatchEvent {
    /// Describe `diagnostic`, with a 1-based position when it has one.
    pub fn diagnostic(diagnostic: &Diagnostic) -> Self {
        let position = diagnostic
            .file()
            .zip(diagnostic.start())
            .map(|(file, start)| file.line_and_character(start));
        WatchEvent::Diagnostic {
            file: diagnostic.file_name().map(str::to_string),
            line: position.map(|(line, _)| line + 1),
            column: position.map(|(_, character)| character + 1),
            category: diagnostic.category().name().to_string(),
            code: diagnostic.code(),
            message: diagnostic.message_text().flatten("\n"),
        }
    }

    pub fn status(diagnostic: &Diagnostic) -> Self {
        WatchEvent::Status {
            code: diagnostic.code(),
            message: diagnostic.message_text().flatten("\n"),
        }
    }

    /// Convert to JSON string with "command": "watch" field included
    pub fn to_json(&self) -> String {
        let mut value =
            serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"event": "error"}));
        if let Some(obj) = value.as_object_mut() {
            obj.insert("command".to_string(), serde_json::json!("watch"));
        }
        serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
    }
}
