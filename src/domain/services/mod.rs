//! Domain Services
//!
//! Pure logic over domain entities with no I/O.

pub mod scanner;

pub use scanner::{scan, syntactic_diagnostics, ScanResult, SyntaxError, SyntaxErrorKind};
