//! Kiln - compiler driver with a watch mode
//!
//! Kiln drives a program through configuration, diagnostic gathering,
//! emission and reporting, either once or continuously as inputs change.
//! It also explains why each file is part of a build.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use application::{
    perform_compilation, DiagnosticReporter, EmitOrchestrator, ParsedCommandLine, WatchCompilerHost,
    WatchDriver, WatchEvent, WatchStatusReporter,
};
pub use config::Config;
pub use domain::entities::{Diagnostic, ExitStatus};
pub use error::{KilnError, KilnResult};
pub use infrastructure::{local_system, EventLoop, FsProgramFactory};
