//! Domain Value Objects
//!
//! Immutable value types: message catalog entries, paths, hashes and options.

mod compiler_options;
mod hash;
mod message;
mod new_line;
pub mod path;

pub use compiler_options::CompilerOptions;
pub use hash::{string_hash, ContentHash};
pub use message::{messages, DiagnosticMessage};
pub use new_line::NewLineKind;
pub use path::FileNameCasing;
