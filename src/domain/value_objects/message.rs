//! Diagnostic message catalog
//!
//! Every diagnostic the driver or the reference program produces comes from a
//! [`DiagnosticMessage`] template. Placeholders are written `{0}`, `{1}`, ...

use crate::domain::entities::DiagnosticCategory;

/// A diagnostic message template with its code and default category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub text: &'static str,
}

impl DiagnosticMessage {
    pub const fn new(code: u32, category: DiagnosticCategory, text: &'static str) -> Self {
        Self {
            code,
            category,
            text,
        }
    }

    /// Substitute `{n}` placeholders with `args[n]`.
    ///
    /// Placeholders without a matching argument are left as written.
    pub fn format(&self, args: &[&str]) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let Some(close) = tail.find('}') else {
                out.push_str(tail);
                return out;
            };
            match tail[1..close].parse::<usize>().ok().and_then(|i| args.get(i)) {
                Some(arg) => out.push_str(arg),
                None => out.push_str(&tail[..=close]),
            }
            rest = &tail[close + 1..];
        }
        out.push_str(rest);
        out
    }
}

pub mod messages {
    use super::DiagnosticMessage;
    use crate::domain::entities::DiagnosticCategory::{Error, Message, Warning};

    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage =
        DiagnosticMessage::new(1002, Error, "Unterminated string literal.");
    pub const TOKEN_EXPECTED: DiagnosticMessage =
        DiagnosticMessage::new(1005, Error, "'{0}' expected.");
    pub const UNEXPECTED_TOKEN: DiagnosticMessage =
        DiagnosticMessage::new(1128, Error, "Unexpected '{0}'.");
    pub const UNTERMINATED_TEMPLATE_LITERAL: DiagnosticMessage =
        DiagnosticMessage::new(1160, Error, "Unterminated template literal.");
    pub const CANNOT_FIND_MODULE: DiagnosticMessage =
        DiagnosticMessage::new(2307, Error, "Cannot find module '{0}'.");
    pub const CANNOT_FIND_TYPE_DEFINITION_FILE: DiagnosticMessage =
        DiagnosticMessage::new(2688, Error, "Cannot find type definition file for '{0}'.");
    pub const CANNOT_FIND_LIB_DEFINITION: DiagnosticMessage =
        DiagnosticMessage::new(2726, Error, "Cannot find lib definition for '{0}'.");
    pub const CANNOT_READ_FILE: DiagnosticMessage =
        DiagnosticMessage::new(5012, Error, "Cannot read file '{0}': {1}.");
    pub const FAILED_TO_PARSE_FILE: DiagnosticMessage =
        DiagnosticMessage::new(5014, Error, "Failed to parse file '{0}': {1}.");
    pub const UNKNOWN_CONFIG_OPTION: DiagnosticMessage =
        DiagnosticMessage::new(5023, Warning, "Unknown configuration option '{0}'.");
    pub const UNKNOWN_CONFIG_OPTION_DID_YOU_MEAN: DiagnosticMessage = DiagnosticMessage::new(
        5025,
        Warning,
        "Unknown configuration option '{0}'. Did you mean '{1}'?",
    );
    pub const COULD_NOT_WRITE_FILE: DiagnosticMessage =
        DiagnosticMessage::new(5033, Error, "Could not write file '{0}': {1}.");
    pub const NO_INPUTS_FOUND: DiagnosticMessage = DiagnosticMessage::new(
        18003,
        Error,
        "No inputs were found in config file '{0}'.",
    );
    pub const FILE_NOT_FOUND: DiagnosticMessage =
        DiagnosticMessage::new(6053, Error, "File '{0}' not found.");

    pub const FOUND_1_ERROR: DiagnosticMessage =
        DiagnosticMessage::new(6195, Message, "Found 1 error.");
    pub const FOUND_N_ERRORS: DiagnosticMessage =
        DiagnosticMessage::new(6196, Message, "Found {0} errors.");

    pub const STARTING_COMPILATION_IN_WATCH_MODE: DiagnosticMessage =
        DiagnosticMessage::new(6031, Message, "Starting compilation in watch mode...");
    pub const FILE_CHANGE_DETECTED: DiagnosticMessage = DiagnosticMessage::new(
        6032,
        Message,
        "File change detected. Starting incremental compilation...",
    );
    pub const FOUND_1_ERROR_WATCHING: DiagnosticMessage = DiagnosticMessage::new(
        6193,
        Message,
        "Found 1 error. Watching for file changes.",
    );
    pub const FOUND_N_ERRORS_WATCHING: DiagnosticMessage = DiagnosticMessage::new(
        6194,
        Message,
        "Found {0} errors. Watching for file changes.",
    );

    /// Codes that start a new screen of watch output.
    pub const DEFAULT_SCREEN_STARTING_CODES: [u32; 2] = [
        STARTING_COMPILATION_IN_WATCH_MODE.code,
        FILE_CHANGE_DETECTED.code,
    ];
}

#[cfg(test)]
mod tests {
    use super::messages::*;

    #[test]
    fn format_substitutes_positional_args() {
        assert_eq!(
            COULD_NOT_WRITE_FILE.format(&["out/a.js", "denied"]),
            "Could not write file 'out/a.js': denied."
        );
    }

    #[test]
    fn format_keeps_unmatched_placeholders() {
        assert_eq!(TOKEN_EXPECTED.format(&[]), "'{0}' expected.");
    }

    #[test]
    fn format_handles_literal_brace_argument() {
        assert_eq!(TOKEN_EXPECTED.format(&["}"]), "'}' expected.");
    }
}
