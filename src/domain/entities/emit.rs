//! Emit results and process exit status

use crate::domain::entities::Diagnostic;

/// Outcome of one `emit` call on a program.
#[derive(Debug, Clone, Default)]
pub struct EmitResult {
    pub emit_skipped: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Files written, when the program was asked to list them
    pub emitted_files: Option<Vec<String>>,
}

impl EmitResult {
    /// Result used when emission was not attempted at all.
    pub fn skipped() -> Self {
        Self {
            emit_skipped: true,
            ..Self::default()
        }
    }
}

/// Exit status of a non-watch run.
///
/// The integer values are part of the CLI contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    Success = 0,
    DiagnosticsPresentOutputsGenerated = 1,
    DiagnosticsPresentOutputsSkipped = 2,
}

impl ExitStatus {
    /// Derive the exit status from an emit result and the reported diagnostics.
    pub fn from_emit(emit_skipped: bool, diagnostics: &[Diagnostic]) -> Self {
        if diagnostics.is_empty() {
            ExitStatus::Success
        } else if emit_skipped {
            ExitStatus::DiagnosticsPresentOutputsSkipped
        } else {
            ExitStatus::DiagnosticsPresentOutputsGenerated
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}
