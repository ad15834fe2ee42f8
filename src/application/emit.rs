//! Emit orchestration
//!
//! One compile-report-emit cycle over a built program. Diagnostics are
//! gathered in priority order, each cheaper class gating the more expensive
//! ones, then sorted, deduplicated and reported before the emitted and listed
//! files are written.

use crate::application::explain::list_files;
use crate::application::reporter::ReportDiagnostic;
use crate::domain::entities::{
    error_count_for_summary, sort_and_deduplicate, Diagnostic, EmitResult, ExitStatus,
};
use crate::domain::ports::{
    is_cancelled, CancellationToken, CustomTransformers, EmitRequest, Program, WriteFileCallback,
};
use crate::domain::value_objects::path::normalized_absolute_path;
use crate::domain::value_objects::{messages, DiagnosticMessage};

/// Marker printed before every emitted file path.
pub const EMITTED_FILE_PREFIX: &str = "TSFILE: ";

/// What one cycle produced.
#[derive(Debug, Clone)]
pub struct EmitOutcome {
    pub emit_result: EmitResult,
    /// Sorted, deduplicated diagnostics, in the order they were reported
    pub diagnostics: Vec<Diagnostic>,
}

impl EmitOutcome {
    pub fn exit_status(&self) -> ExitStatus {
        ExitStatus::from_emit(self.emit_result.emit_skipped, &self.diagnostics)
    }

    pub fn error_count(&self) -> usize {
        error_count_for_summary(&self.diagnostics)
    }
}

/// Runs emit-and-report cycles against a program.
pub struct EmitOrchestrator<'a> {
    report: &'a dyn ReportDiagnostic,
    write: Option<&'a dyn Fn(&str)>,
    report_summary: Option<&'a dyn Fn(usize)>,
    write_file: Option<&'a WriteFileCallback>,
    cancellation: Option<&'a CancellationToken>,
    emit_only_dts_files: bool,
    custom_transformers: Option<&'a CustomTransformers>,
}

impl<'a> EmitOrchestrator<'a> {
    pub fn new(report: &'a dyn ReportDiagnostic) -> Self {
        Self {
            report,
            write: None,
            report_summary: None,
            write_file: None,
            cancellation: None,
            emit_only_dts_files: false,
            custom_transformers: None,
        }
    }

    /// Sink for emitted file names and file listings.
    pub fn with_write(mut self, write: &'a dyn Fn(&str)) -> Self {
        self.write = Some(write);
        self
    }

    /// Called with the error count once everything is reported.
    pub fn with_report_summary(mut self, report_summary: &'a dyn Fn(usize)) -> Self {
        self.report_summary = Some(report_summary);
        self
    }

    pub fn with_write_file(mut self, write_file: &'a WriteFileCallback) -> Self {
        self.write_file = Some(write_file);
        self
    }

    pub fn with_cancellation(mut self, cancellation: &'a CancellationToken) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    pub fn with_emit_only_dts_files(mut self, emit_only_dts_files: bool) -> Self {
        self.emit_only_dts_files = emit_only_dts_files;
        self
    }

    pub fn with_custom_transformers(mut self, custom_transformers: &'a CustomTransformers) -> Self {
        self.custom_transformers = Some(custom_transformers);
        self
    }

    /// Run one cycle.
    ///
    /// A cancelled token stops diagnostic gathering at the next stage
    /// boundary and skips emit; whatever was gathered is still reported once.
    pub fn run(&self, program: &dyn Program) -> EmitOutcome {
        let options = program.compiler_options();
        let list_files_only = options.list_files_only;

        let (mut diagnostics, cancelled) = self.gather_diagnostics(program);

        let emit_result = if list_files_only || cancelled {
            EmitResult::skipped()
        } else {
            program.emit(EmitRequest {
                write_file: self.write_file,
                cancellation: self.cancellation,
                emit_only_dts_files: self.emit_only_dts_files,
                custom_transformers: self.custom_transformers,
            })
        };
        diagnostics.extend(emit_result.diagnostics.iter().cloned());

        let diagnostics = sort_and_deduplicate(diagnostics);
        log::debug!(
            "cycle produced {} diagnostic(s), emit skipped: {}",
            diagnostics.len(),
            emit_result.emit_skipped
        );
        for diagnostic in &diagnostics {
            self.report.report(diagnostic);
        }

        if let Some(write) = self.write {
            let current_directory = program.current_directory();
            for file in emit_result.emitted_files.iter().flatten() {
                let path = normalized_absolute_path(file, &current_directory);
                write(&format!("{EMITTED_FILE_PREFIX}{path}"));
            }
            list_files(program, write);
        }

        if let Some(report_summary) = self.report_summary {
            report_summary(error_count_for_summary(&diagnostics));
        }

        EmitOutcome {
            emit_result,
            diagnostics,
        }
    }

    /// Run one cycle and map it to the process exit status.
    pub fn run_and_get_exit_status(&self, program: &dyn Program) -> ExitStatus {
        self.run(program).exit_status()
    }

    fn gather_diagnostics(&self, program: &dyn Program) -> (Vec<Diagnostic>, bool) {
        let token = self.cancellation;
        let options = program.compiler_options();
        let mut diagnostics = program.config_file_parsing_diagnostics();
        let config_count = diagnostics.len();

        macro_rules! stage {
            ($call:expr) => {
                if is_cancelled(token) {
                    log::debug!("cancelled while gathering diagnostics");
                    return (diagnostics, true);
                }
                diagnostics.extend($call);
            };
        }

        stage!(program.syntactic_diagnostics(token));
        if diagnostics.len() == config_count {
            stage!(program.options_diagnostics(token));
            if !options.list_files_only {
                stage!(program.global_diagnostics(token));
                if diagnostics.len() == config_count {
                    stage!(program.semantic_diagnostics(token));
                    if options.declaration || options.emit_declaration_only {
                        stage!(program.declaration_diagnostics(token));
                    }
                }
            }
        }
        let cancelled = is_cancelled(token);
        (diagnostics, cancelled)
    }
}

/// Summary message reported after every watch cycle.
pub fn watch_error_summary_message(error_count: usize) -> &'static DiagnosticMessage {
    if error_count == 1 {
        &messages::FOUND_1_ERROR_WATCHING
    } else {
        &messages::FOUND_N_ERRORS_WATCHING
    }
}

/// Closing summary of a one-shot build; empty when there are no errors.
pub fn error_summary_text(error_count: usize, new_line: &str) -> String {
    if error_count == 0 {
        return String::new();
    }
    let message = if error_count == 1 {
        messages::FOUND_1_ERROR.format(&[])
    } else {
        messages::FOUND_N_ERRORS.format(&[&error_count.to_string()])
    };
    format!("{new_line}{message}{new_line}{new_line}")
}
