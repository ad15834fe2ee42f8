//! Program construction
//!
//! Loads root, library, automatic type and project reference files, then
//! follows every reference breadth-first, recording why each file is part of
//! the program. Resolution failures become diagnostics, never errors.

use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use crate::domain::entities::{
    Diagnostic, FileIncludeReason, FileIncludeReasons, ProjectReferenceKind, ReferenceKind, SourceFile,
};
use crate::domain::ports::{CompilerHost, ProgramInput};
use crate::domain::value_objects::messages;
use crate::domain::value_objects::path::{
    change_extension, convert_to_relative_path, directory_path, normalized_absolute_path,
};

use super::resolver;

/// Everything a program knows after loading its files.
#[derive(Default)]
pub(super) struct ProgramGraph {
    pub files: Vec<Rc<SourceFile>>,
    pub by_path: HashMap<String, Rc<SourceFile>>,
    pub reasons: FileIncludeReasons,
    pub options_diagnostics: Vec<Diagnostic>,
    pub semantic_diagnostics: Vec<Diagnostic>,
    /// Paths that are inputs only: libraries, packages, referenced outputs
    pub external: HashSet<String>,
}

pub(super) struct ProgramBuilder<'a> {
    host: &'a dyn CompilerHost,
    input: &'a ProgramInput,
    current_directory: String,
    real_current_directory: String,
    graph: ProgramGraph,
    pending: VecDeque<Rc<SourceFile>>,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(host: &'a dyn CompilerHost, input: &'a ProgramInput) -> Self {
        let current_directory = host.current_directory();
        Self {
            host,
            input,
            real_current_directory: host.realpath(&current_directory),
            current_directory,
            graph: ProgramGraph::default(),
            pending: VecDeque::new(),
        }
    }

    pub fn build(mut self) -> ProgramGraph {
        let input = self.input;

        for (index, lib) in input.options.lib.iter().enumerate() {
            let file_name = resolver::lib_file_name(self.host, lib);
            if !self.add_file(&file_name, FileIncludeReason::LibFile { index: Some(index) }, true) {
                self.graph
                    .options_diagnostics
                    .push(Diagnostic::from_message(&messages::CANNOT_FIND_LIB_DEFINITION, &[lib]));
            }
        }

        for (index, root) in input.root_names.iter().enumerate() {
            if !self.add_file(root, FileIncludeReason::RootFile { index }, false) {
                self.graph
                    .options_diagnostics
                    .push(Diagnostic::from_message(&messages::FILE_NOT_FOUND, &[root]));
            }
        }

        self.add_project_references();
        self.add_automatic_type_directives();

        while let Some(file) = self.pending.pop_front() {
            self.add_references_of(&file);
        }
        self.graph
    }

    fn add_project_references(&mut self) {
        let input = self.input;
        for (index, reference) in input.project_references.iter().enumerate() {
            let config_directory = directory_path(&reference.config);
            for root in &reference.root_names {
                let output = reference.out_dir.as_ref().map(|out_dir| {
                    let relative = convert_to_relative_path(root, &config_directory, |s| s.to_string());
                    change_extension(&format!("{out_dir}/{relative}"), ".d.ts")
                });
                let reason = |kind| FileIncludeReason::ProjectReferenceFile {
                    kind,
                    config: reference.config.clone(),
                    index,
                };
                let added_output = output.is_some_and(|output| {
                    self.host.file_exists(&output)
                        && self.add_file(&output, reason(ProjectReferenceKind::Output), true)
                });
                if !added_output && !self.add_file(root, reason(ProjectReferenceKind::Source), true) {
                    self.graph
                        .options_diagnostics
                        .push(Diagnostic::from_message(&messages::FILE_NOT_FOUND, &[root]));
                }
            }
        }
    }

    fn add_automatic_type_directives(&mut self) {
        let options = &self.input.options;
        let current_directory = self.current_directory.clone();
        let type_roots = match &options.type_roots {
            Some(roots) => roots.clone(),
            None => resolver::default_type_roots(self.host, &current_directory),
        };
        let (names, explicit) = match &options.types {
            Some(types) => (types.clone(), true),
            None => (resolver::automatic_type_directive_names(self.host, &type_roots), false),
        };
        for name in names {
            match resolver::resolve_type_reference(self.host, &name, &current_directory, &type_roots) {
                Some(resolved) => {
                    self.add_file(
                        &resolved.file_name,
                        FileIncludeReason::AutomaticTypeDirectiveFile {
                            type_reference: name,
                            package_id: resolved.package_id,
                        },
                        true,
                    );
                }
                None if explicit => self.graph.options_diagnostics.push(Diagnostic::from_message(
                    &messages::CANNOT_FIND_TYPE_DEFINITION_FILE,
                    &[&name],
                )),
                None => log::debug!("type root entry without typings: {name}"),
            }
        }
    }

    fn add_references_of(&mut self, file: &Rc<SourceFile>) {
        let type_roots = self.input.options.type_roots.clone().unwrap_or_default();
        let mut ordinals: HashMap<ReferenceKind, usize> = HashMap::new();

        for reference in file.references() {
            let ordinal = ordinals.entry(reference.kind).or_insert(0);
            let index = *ordinal;
            *ordinal += 1;

            let specifier = reference.specifier.as_str();
            let (resolved, message) = match reference.kind {
                ReferenceKind::Import => (
                    resolver::resolve_module(self.host, specifier, file.file_name())
                        .map(|r| (r.file_name, r.package_id)),
                    &messages::CANNOT_FIND_MODULE,
                ),
                ReferenceKind::ReferenceFile => (
                    resolver::resolve_reference_path(self.host, specifier, file.file_name())
                        .map(|name| (name, None)),
                    &messages::FILE_NOT_FOUND,
                ),
                ReferenceKind::TypeReferenceDirective => (
                    resolver::resolve_type_reference(
                        self.host,
                        specifier,
                        &directory_path(file.file_name()),
                        &type_roots,
                    )
                    .map(|r| (r.file_name, r.package_id)),
                    &messages::CANNOT_FIND_TYPE_DEFINITION_FILE,
                ),
                ReferenceKind::LibReferenceDirective => {
                    let lib = resolver::lib_file_name(self.host, specifier);
                    (
                        self.host.file_exists(&lib).then_some((lib, None)),
                        &messages::CANNOT_FIND_LIB_DEFINITION,
                    )
                }
            };

            let found = resolved.is_some_and(|(file_name, package_id)| {
                let external = package_id.is_some()
                    || reference.kind == ReferenceKind::LibReferenceDirective
                    || file_name.contains("/node_modules/");
                self.add_file(
                    &file_name,
                    FileIncludeReason::ReferencedFile {
                        kind: reference.kind,
                        file: file.path().to_string(),
                        index,
                        range: reference.range,
                        package_id,
                    },
                    external,
                )
            });
            if !found {
                self.graph.semantic_diagnostics.push(Diagnostic::located(
                    file,
                    reference.range.pos,
                    reference.range.len(),
                    message,
                    &[specifier],
                ));
            }
        }
    }

    /// Load `file_name` once and record `reason`. False when it does not exist.
    fn add_file(&mut self, file_name: &str, reason: FileIncludeReason, external: bool) -> bool {
        let file_name = normalized_absolute_path(file_name, &self.current_directory);
        let known = self.host.canonical_file_name(&file_name);
        if self.graph.by_path.contains_key(&known) {
            self.graph.reasons.add(known, reason);
            return true;
        }
        if !self.host.file_exists(&file_name) {
            return false;
        }

        let mut read_errors = Vec::new();
        let file = self
            .host
            .get_source_file(&file_name, &mut |message: &str| read_errors.push(message.to_string()));
        for message in read_errors {
            self.graph.options_diagnostics.push(Diagnostic::from_message(
                &messages::CANNOT_READ_FILE,
                &[&file_name, &message],
            ));
        }
        let Some(file) = file else {
            return false;
        };

        let file = match self.redirect_target(&file_name) {
            Some(real) => match Rc::try_unwrap(file) {
                Ok(file) => Rc::new(file.with_redirect_target(real)),
                Err(shared) => shared,
            },
            None => file,
        };

        let path = file.path().to_string();
        log::trace!("loaded {file_name}");
        if external {
            self.graph.external.insert(path.clone());
        }
        self.graph.reasons.add(path.clone(), reason);
        self.graph.by_path.insert(path, Rc::clone(&file));
        self.graph.files.push(Rc::clone(&file));
        self.pending.push_back(file);
        true
    }

    /// Real path of `file_name` when it is reached through a link.
    ///
    /// Links above the current directory are not redirects.
    fn redirect_target(&self, file_name: &str) -> Option<String> {
        let real = self.host.realpath(file_name);
        if real == file_name {
            return None;
        }
        let expected = file_name
            .strip_prefix(self.current_directory.as_str())
            .filter(|rest| rest.starts_with('/'))
            .map(|rest| format!("{}{rest}", self.real_current_directory.trim_end_matches('/')));
        (expected.as_deref() != Some(real.as_str())).then_some(real)
    }
}
