//! Application Layer
//!
//! Drives a compilation over the domain ports:
//!
//! - `config_file` - `kiln.toml` to a resolved build request
//! - `compiler_host` - system capabilities as seen by a program
//! - `emit` - diagnostics gathering, emit and reporting for one program
//! - `explain` - why each file is part of a program
//! - `build` - one-shot compilation
//! - `watch` - rebuild on change
//!
//! Reporters (`reporter`, `watch_status`) turn diagnostics and status
//! messages into text on the system output.

pub mod build;
pub mod compiler_host;
pub mod config_file;
pub mod emit;
pub mod explain;
pub mod performance;
pub mod reporter;
pub mod watch;
pub mod watch_host;
pub mod watch_status;

pub use build::perform_compilation;
pub use compiler_host::{CompilerHostAdapter, ProgramHost};
pub use config_file::{
    parse_command_line, parse_config_file_with_system, ConfigParseOutcome, ParsedCommandLine,
};
pub use emit::{
    error_summary_text, watch_error_summary_message, EmitOrchestrator, EmitOutcome,
    EMITTED_FILE_PREFIX,
};
pub use explain::{explain_files, list_files};
pub use performance::PerformanceContext;
pub use reporter::{DiagnosticReporter, ReportDiagnostic};
pub use watch::{WatchCompilerHost, WatchDriver, WatchEvent, WatchInput, WatchObserver};
pub use watch_host::WatchHost;
pub use watch_status::{ReportWatchStatus, WatchStatusReporter};
