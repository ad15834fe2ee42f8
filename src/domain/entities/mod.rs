//! Domain Entities
//!
//! - `Diagnostic` - A compiler message with severity, code and location
//! - `SourceFile` - One scanned input file
//! - `FileIncludeReason` - Why a file is part of the compiled set
//! - `EmitResult` / `ExitStatus` - Outcome of a build

mod diagnostic;
mod emit;
mod include_reason;
mod source_file;

pub use diagnostic::{
    error_count_for_summary, sort_and_deduplicate, Diagnostic, DiagnosticCategory, MessageChain,
    MessageText, RelatedInformation,
};
pub use emit::{EmitResult, ExitStatus};
pub use include_reason::{
    FileIncludeKind, FileIncludeReason, FileIncludeReasons, PackageId, ProjectReferenceKind,
};
pub use source_file::{FileReference, ReferenceKind, SourceFile, TextRange};
