//! Program port
//!
//! The read-only view of a built program that the emit orchestrator and the
//! explainer consume, plus the compiler-facing host a program is built
//! against. The program itself (parsing, checking, emitting) lives outside
//! the driver; `infrastructure::program` provides the bundled backend.

use std::rc::Rc;

use super::cancellation::CancellationToken;
use crate::domain::entities::{Diagnostic, EmitResult, FileIncludeReasons, SourceFile};
use crate::domain::value_objects::CompilerOptions;

/// Replacement for the host's `write_file` during emit.
///
/// Receives the output file name, its text and whether to write a byte order
/// mark. An `Err` message becomes an emit diagnostic.
pub type WriteFileCallback = dyn Fn(&str, &str, bool) -> Result<(), String>;

/// Text transform applied to one file: `(file_name, text) -> text`.
pub type Transformer = Rc<dyn Fn(&str, String) -> String>;

/// Transforms run around emit.
#[derive(Clone, Default)]
pub struct CustomTransformers {
    /// Applied to the source text before output is produced
    pub before: Vec<Transformer>,
    /// Applied to the emitted JavaScript
    pub after: Vec<Transformer>,
    /// Applied to emitted declaration files
    pub after_declarations: Vec<Transformer>,
}

impl std::fmt::Debug for CustomTransformers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomTransformers")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .field("after_declarations", &self.after_declarations.len())
            .finish()
    }
}

/// Optional collaborators of one `emit` call.
#[derive(Clone, Copy, Default)]
pub struct EmitRequest<'a> {
    pub write_file: Option<&'a WriteFileCallback>,
    pub cancellation: Option<&'a CancellationToken>,
    pub emit_only_dts_files: bool,
    pub custom_transformers: Option<&'a CustomTransformers>,
}

/// Minimal view of a built program needed to emit files and report errors.
pub trait Program {
    fn current_directory(&self) -> String;

    fn canonical_file_name(&self, file_name: &str) -> String;

    fn compiler_options(&self) -> &CompilerOptions;

    fn source_files(&self) -> &[Rc<SourceFile>];

    fn source_file_by_path(&self, path: &str) -> Option<Rc<SourceFile>>;

    fn file_include_reasons(&self) -> &FileIncludeReasons;

    fn config_file_parsing_diagnostics(&self) -> Vec<Diagnostic>;

    fn syntactic_diagnostics(&self, cancellation: Option<&CancellationToken>) -> Vec<Diagnostic>;

    fn options_diagnostics(&self, cancellation: Option<&CancellationToken>) -> Vec<Diagnostic>;

    fn global_diagnostics(&self, cancellation: Option<&CancellationToken>) -> Vec<Diagnostic>;

    fn semantic_diagnostics(&self, cancellation: Option<&CancellationToken>) -> Vec<Diagnostic>;

    fn declaration_diagnostics(&self, cancellation: Option<&CancellationToken>) -> Vec<Diagnostic>;

    fn emit(&self, request: EmitRequest<'_>) -> EmitResult;
}

/// Compiler-facing host a program reads its inputs through.
pub trait CompilerHost {
    /// Read and scan a file. `None` when it does not exist; read failures are
    /// passed to `on_error` and yield an empty file.
    fn get_source_file(&self, file_name: &str, on_error: &mut dyn FnMut(&str)) -> Option<Rc<SourceFile>>;

    /// Write an output file, creating missing parent directories.
    fn write_file(&self, file_name: &str, text: &str, write_byte_order_mark: bool, on_error: &mut dyn FnMut(&str));

    fn current_directory(&self) -> String;

    fn use_case_sensitive_file_names(&self) -> bool;

    fn canonical_file_name(&self, file_name: &str) -> String;

    fn new_line(&self) -> &'static str;

    fn file_exists(&self, path: &str) -> bool;

    fn read_file(&self, path: &str) -> Option<String>;

    fn directory_exists(&self, path: &str) -> Option<bool>;

    fn get_directories(&self, path: &str) -> Vec<String>;

    fn read_directory(&self, path: &str, extensions: &[String]) -> Vec<String>;

    /// Real path of `path`; `path` itself when the host cannot resolve links.
    fn realpath(&self, path: &str) -> String;

    /// Empty string when unset or when the host has no environment.
    fn get_environment_variable(&self, name: &str) -> String;

    fn create_hash(&self, data: &str) -> Option<String>;

    fn trace(&self, text: &str);
}

/// A referenced project and the root files it contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectReference {
    /// Absolute path of the referenced project's config file
    pub config: String,
    pub root_names: Vec<String>,
    /// Output directory of the referenced project, when it has one
    pub out_dir: Option<String>,
}

/// Everything needed to build a program once.
#[derive(Debug, Clone, Default)]
pub struct ProgramInput {
    pub root_names: Vec<String>,
    pub options: CompilerOptions,
    pub config_file_parsing_diagnostics: Vec<Diagnostic>,
    pub project_references: Vec<ProjectReference>,
}

/// Builds a program from its input through a compiler host.
///
/// The program may keep `host` to write its outputs when emitting.
pub trait ProgramFactory {
    fn create_program(&self, input: &ProgramInput, host: Rc<dyn CompilerHost>) -> Rc<dyn Program>;
}

impl<F> ProgramFactory for F
where
    F: Fn(&ProgramInput, Rc<dyn CompilerHost>) -> Rc<dyn Program>,
{
    fn create_program(&self, input: &ProgramInput, host: Rc<dyn CompilerHost>) -> Rc<dyn Program> {
        self(input, host)
    }
}
