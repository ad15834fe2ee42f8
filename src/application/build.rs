//! One-shot build
//!
//! Build a program once, emit it, report its diagnostics and map the result
//! to the process exit status.

use std::rc::Rc;

use crate::application::compiler_host::{CompilerHostAdapter, ProgramHost};
use crate::application::config_file::ParsedCommandLine;
use crate::application::emit::{error_summary_text, EmitOrchestrator};
use crate::application::performance::PerformanceContext;
use crate::application::reporter::ReportDiagnostic;
use crate::domain::entities::ExitStatus;
use crate::domain::ports::{ProgramFactory, System};

/// Build `parsed` once and report everything it produced.
///
/// Pretty runs close with an error summary line. With `diagnostics` or
/// `extended_diagnostics`, the measured I/O timings follow.
pub fn perform_compilation(
    parsed: &ParsedCommandLine,
    system: &System,
    program_factory: &dyn ProgramFactory,
    report_diagnostic: &dyn ReportDiagnostic,
) -> ExitStatus {
    let options = &parsed.options;
    let performance = Rc::new(PerformanceContext::new());
    let host = CompilerHostAdapter::new(
        Rc::new(ProgramHost::new(system.clone())),
        options.clone(),
        Rc::clone(&performance),
    );

    let program = program_factory.create_program(&parsed.program_input(), Rc::new(host));
    let write = |text: &str| system.write_line(text);
    let summary = |error_count: usize| system.write(&error_summary_text(error_count, system.new_line_str()));

    let mut orchestrator = EmitOrchestrator::new(report_diagnostic).with_write(&write);
    if options.is_pretty() {
        orchestrator = orchestrator.with_report_summary(&summary);
    }
    let status = orchestrator.run_and_get_exit_status(program.as_ref());

    if options.diagnostics || options.extended_diagnostics {
        for line in performance.report_lines() {
            system.write_line(&line);
        }
    }
    log::info!("build finished with exit status {}", status.code());
    status
}
