use std::rc::Rc;

use crate::domain::entities::{Diagnostic, EmitResult, FileIncludeReasons, SourceFile};
use crate::domain::ports::{
    is_cancelled, CancellationToken, CompilerHost, EmitRequest, Program, ProgramFactory, ProgramInput,
    Transformer,
};
use crate::domain::services::scanner;
use crate::domain::value_objects::{messages, CompilerOptions};

use super::builder::{ProgramBuilder, ProgramGraph};
use super::emitter;

pub struct FsProgram {
    host: Rc<dyn CompilerHost>,
    options: CompilerOptions,
    current_directory: String,
    config_file_parsing_diagnostics: Vec<Diagnostic>,
    graph: ProgramGraph,
}

impl FsProgram {
    pub fn new(input: &ProgramInput, host: Rc<dyn CompilerHost>) -> Self {
        let graph = ProgramBuilder::new(host.as_ref(), input).build();
        log::debug!(
            "program: {} file(s) from {} root(s)",
            graph.files.len(),
            input.root_names.len()
        );
        Self {
            current_directory: host.current_directory(),
            host,
            options: input.options.clone(),
            config_file_parsing_diagnostics: input.config_file_parsing_diagnostics.clone(),
            graph,
        }
    }

    /// Files this program produces output for.
    fn emittable(&self) -> impl Iterator<Item = &Rc<SourceFile>> {
        self.graph
            .files
            .iter()
            .filter(|file| !file.is_declaration_file() && !self.graph.external.contains(file.path()))
    }

    fn has_errors(&self) -> bool {
        let any_error = |diagnostics: &[Diagnostic]| diagnostics.iter().any(Diagnostic::is_error);
        any_error(&self.config_file_parsing_diagnostics)
            || any_error(&self.graph.options_diagnostics)
            || any_error(&self.graph.semantic_diagnostics)
            || self.graph.files.iter().any(|file| !file.syntax_errors().is_empty())
    }

    /// Write one output; a failure becomes an emit diagnostic.
    fn write_output(&self, file_name: &str, text: &str, request: &EmitRequest<'_>, diagnostics: &mut Vec<Diagnostic>) -> bool {
        let bom = self.options.emit_bom;
        let failure = match request.write_file {
            Some(write_file) => write_file(file_name, text, bom).err(),
            None => {
                let mut failure = None;
                self.host
                    .write_file(file_name, text, bom, &mut |message: &str| failure = Some(message.to_string()));
                failure
            }
        };
        match failure {
            Some(message) => {
                diagnostics.push(Diagnostic::from_message(
                    &messages::COULD_NOT_WRITE_FILE,
                    &[file_name, &message],
                ));
                false
            }
            None => true,
        }
    }
}

fn apply(transformers: Option<&[Transformer]>, file_name: &str, text: String) -> String {
    transformers
        .into_iter()
        .flatten()
        .fold(text, |text, transform| transform(file_name, text))
}

impl Program for FsProgram {
    fn current_directory(&self) -> String {
        self.current_directory.clone()
    }

    fn canonical_file_name(&self, file_name: &str) -> String {
        self.host.canonical_file_name(file_name)
    }

    fn compiler_options(&self) -> &CompilerOptions {
        &self.options
    }

    fn source_files(&self) -> &[Rc<SourceFile>] {
        &self.graph.files
    }

    fn source_file_by_path(&self, path: &str) -> Option<Rc<SourceFile>> {
        self.graph.by_path.get(path).cloned()
    }

    fn file_include_reasons(&self) -> &FileIncludeReasons {
        &self.graph.reasons
    }

    fn config_file_parsing_diagnostics(&self) -> Vec<Diagnostic> {
        self.config_file_parsing_diagnostics.clone()
    }

    fn syntactic_diagnostics(&self, cancellation: Option<&CancellationToken>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for file in &self.graph.files {
            if is_cancelled(cancellation) {
                break;
            }
            diagnostics.extend(scanner::syntactic_diagnostics(file));
        }
        diagnostics
    }

    fn options_diagnostics(&self, _cancellation: Option<&CancellationToken>) -> Vec<Diagnostic> {
        self.graph.options_diagnostics.clone()
    }

    fn global_diagnostics(&self, _cancellation: Option<&CancellationToken>) -> Vec<Diagnostic> {
        Vec::new()
    }

    fn semantic_diagnostics(&self, cancellation: Option<&CancellationToken>) -> Vec<Diagnostic> {
        if is_cancelled(cancellation) {
            return Vec::new();
        }
        self.graph.semantic_diagnostics.clone()
    }

    fn declaration_diagnostics(&self, _cancellation: Option<&CancellationToken>) -> Vec<Diagnostic> {
        Vec::new()
    }

    fn emit(&self, request: EmitRequest<'_>) -> EmitResult {
        let options = &self.options;
        if options.no_emit || (options.no_emit_on_error && self.has_errors()) {
            return EmitResult::skipped();
        }
        let declarations_only = request.emit_only_dts_files || options.emit_declaration_only;
        let declarations = declarations_only || options.declaration;
        let new_line = self.host.new_line();
        let transformers = request.custom_transformers;

        let mut result = EmitResult::default();
        let mut emitted = Vec::new();
        for file in self.emittable() {
            if is_cancelled(request.cancellation) {
                log::debug!("emit cancelled before {}", file.file_name());
                result.emit_skipped = true;
                break;
            }
            let paths = emitter::output_paths(file.file_name(), options, &self.current_directory);
            let text = apply(
                transformers.map(|t| t.before.as_slice()),
                file.file_name(),
                file.text().to_string(),
            );

            if !declarations_only {
                let output = apply(
                    transformers.map(|t| t.after.as_slice()),
                    &paths.javascript,
                    emitter::javascript(&text, new_line),
                );
                if self.write_output(&paths.javascript, &output, &request, &mut result.diagnostics) {
                    emitted.push(paths.javascript.clone());
                }
            }
            if declarations {
                let output = apply(
                    transformers.map(|t| t.after_declarations.as_slice()),
                    &paths.declaration,
                    emitter::declarations(&text, new_line),
                );
                if self.write_output(&paths.declaration, &output, &request, &mut result.diagnostics) {
                    emitted.push(paths.declaration.clone());
                }
            }
        }

        log::debug!("emitted {} file(s)", emitted.len());
        if options.list_emitted_files {
            result.emitted_files = Some(emitted);
        }
        result
    }
}

/// Builds an [`FsProgram`] per cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProgramFactory;

impl ProgramFactory for FsProgramFactory {
    fn create_program(&self, input: &ProgramInput, host: Rc<dyn CompilerHost>) -> Rc<dyn Program> {
        Rc::new(FsProgram::new(input, host))
    }
}
