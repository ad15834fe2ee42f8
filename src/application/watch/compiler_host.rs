//! Watch compiler host
//!
//! Everything a watch session needs from its environment: the program host
//! for reading inputs, the watch host for watches and timers, the reporters,
//! and the factory that builds a program for each cycle.

use std::rc::Rc;

use crate::application::compiler_host::{CompilerHostAdapter, ProgramHost};
use crate::application::config_file::{
    parse_command_line, parse_config_file_with_system, ConfigParseOutcome, ParsedCommandLine,
};
use crate::application::emit::{watch_error_summary_message, EmitOrchestrator, EmitOutcome};
use crate::application::performance::PerformanceContext;
use crate::application::reporter::{DiagnosticReporter, ReportDiagnostic};
use crate::application::watch_host::WatchHost;
use crate::application::watch_status::ReportWatchStatus;
use crate::config::Config;
use crate::domain::entities::Diagnostic;
use crate::domain::ports::{Program, ProgramFactory, System};
use crate::domain::value_objects::{CompilerOptions, DiagnosticMessage};

/// Where a watch session gets its build input from.
#[derive(Debug, Clone)]
pub enum WatchInput {
    ConfigFile {
        config_file_name: String,
        options_to_extend: CompilerOptions,
    },
    RootFiles {
        root_names: Vec<String>,
        config: Config,
        options: CompilerOptions,
    },
}

pub struct WatchCompilerHost {
    system: System,
    program_host: Rc<ProgramHost>,
    watch_host: WatchHost,
    report_diagnostic: Rc<dyn ReportDiagnostic>,
    program_factory: Rc<dyn ProgramFactory>,
    performance: Rc<PerformanceContext>,
    input: WatchInput,
}

impl WatchCompilerHost {
    /// Watch the project described by `config_file_name`.
    ///
    /// A config file that cannot be read or parsed is unrecoverable: see
    /// [`Self::parse`].
    pub fn of_config_file(
        config_file_name: impl Into<String>,
        options_to_extend: CompilerOptions,
        system: &System,
        program_factory: Rc<dyn ProgramFactory>,
        report_diagnostic: Option<Rc<dyn ReportDiagnostic>>,
        report_watch_status: Option<Rc<dyn ReportWatchStatus>>,
    ) -> Self {
        Self::new(
            WatchInput::ConfigFile {
                config_file_name: config_file_name.into(),
                options_to_extend,
            },
            system,
            program_factory,
            report_diagnostic,
            report_watch_status,
        )
    }

    /// Watch an explicit set of root files. An empty `root_names` walks the
    /// `[files]` selection of `config` from the working directory.
    pub fn of_root_files(
        root_names: Vec<String>,
        config: Config,
        options: CompilerOptions,
        system: &System,
        program_factory: Rc<dyn ProgramFactory>,
        report_diagnostic: Option<Rc<dyn ReportDiagnostic>>,
        report_watch_status: Option<Rc<dyn ReportWatchStatus>>,
    ) -> Self {
        Self::new(
            WatchInput::RootFiles {
                root_names,
                config,
                options,
            },
            system,
            program_factory,
            report_diagnostic,
            report_watch_status,
        )
    }

    fn new(
        input: WatchInput,
        system: &System,
        program_factory: Rc<dyn ProgramFactory>,
        report_diagnostic: Option<Rc<dyn ReportDiagnostic>>,
        report_watch_status: Option<Rc<dyn ReportWatchStatus>>,
    ) -> Self {
        let report_diagnostic: Rc<dyn ReportDiagnostic> = match report_diagnostic {
            Some(report) => report,
            None => Rc::new(DiagnosticReporter::new(system, false)),
        };
        Self {
            system: system.clone(),
            program_host: Rc::new(ProgramHost::new(system.clone())),
            watch_host: WatchHost::new(system, report_watch_status),
            report_diagnostic,
            program_factory,
            performance: Rc::new(PerformanceContext::new()),
            input,
        }
    }

    pub fn config_file_name(&self) -> Option<&str> {
        match &self.input {
            WatchInput::ConfigFile {
                config_file_name, ..
            } => Some(config_file_name),
            WatchInput::RootFiles { .. } => None,
        }
    }

    pub fn program_host(&self) -> &ProgramHost {
        &self.program_host
    }

    pub fn watch_host(&self) -> &WatchHost {
        &self.watch_host
    }

    pub fn performance(&self) -> &PerformanceContext {
        &self.performance
    }

    /// Resolve the build input.
    ///
    /// `Err` carries an unrecoverable config diagnostic; it has already been
    /// reported and the session must end.
    pub fn parse(&self) -> Result<ParsedCommandLine, Diagnostic> {
        match &self.input {
            WatchInput::ConfigFile {
                config_file_name,
                options_to_extend,
            } => match parse_config_file_with_system(
                config_file_name,
                options_to_extend,
                &self.system,
                self.report_diagnostic.as_ref(),
            ) {
                ConfigParseOutcome::Parsed(parsed) => Ok(parsed),
                ConfigParseOutcome::Unrecoverable(diagnostic) => Err(diagnostic),
            },
            WatchInput::RootFiles {
                root_names,
                config,
                options,
            } => Ok(parse_command_line(root_names, config.clone(), options, &self.system)),
        }
    }

    /// Build a program for `parsed` with hash-versioned source files.
    pub fn create_program(&self, parsed: &ParsedCommandLine) -> Rc<dyn Program> {
        self.performance.reset();
        let mut host = CompilerHostAdapter::new(
            Rc::clone(&self.program_host),
            parsed.options.clone(),
            Rc::clone(&self.performance),
        );
        host.set_source_file_as_hash_versioned();
        self.program_factory
            .create_program(&parsed.program_input(), Rc::new(host))
    }

    /// Emit `program`, report its diagnostics, then report the watch summary.
    pub fn after_program_create(&self, program: &dyn Program) -> EmitOutcome {
        let options = program.compiler_options();
        let new_line = self.program_host.new_line_for(options);
        let write = |text: &str| self.system.write_line(text);
        let summary = |error_count: usize| {
            let count = error_count.to_string();
            self.on_watch_status_change(watch_error_summary_message(error_count), &[&count], options);
        };

        let outcome = EmitOrchestrator::new(self.report_diagnostic.as_ref())
            .with_write(&write)
            .with_report_summary(&summary)
            .run(program);

        if options.extended_diagnostics {
            for line in self.performance.report_lines() {
                self.system.write(&format!("{line}{new_line}"));
            }
        }
        outcome
    }

    /// Report a status message through the watch host.
    pub fn on_watch_status_change(
        &self,
        message: &DiagnosticMessage,
        args: &[&str],
        options: &CompilerOptions,
    ) -> bool {
        let diagnostic = Diagnostic::from_message(message, args);
        self.watch_host
            .on_watch_status_change(&diagnostic, self.program_host.new_line_for(options), options)
    }

    pub fn report_diagnostic(&self, diagnostic: &Diagnostic) {
        self.report_diagnostic.report(diagnostic);
    }
}
