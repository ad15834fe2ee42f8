//! Program host and compiler host adapter
//!
//! [`ProgramHost`] maps a [`System`] onto the operations a program needs,
//! defaulting every capability the system lacks. [`CompilerHostAdapter`]
//! layers per-build options on top: timed reads and writes, directory
//! creation before writes, and hash-versioned source files.

use std::cell::OnceCell;
use std::rc::Rc;

use crate::domain::entities::SourceFile;
use crate::domain::ports::{CompilerHost, FsError, FsResult, System, Tracer};
use crate::domain::value_objects::path::{directory_path, normalize_path, normalized_absolute_path, root_length};
use crate::domain::value_objects::{string_hash, CompilerOptions, FileNameCasing};

use super::performance::PerformanceContext;

/// Capabilities of a system as seen by a program.
pub struct ProgramHost {
    system: System,
    current_directory: OnceCell<String>,
    tracer: Option<Rc<dyn Tracer>>,
}

impl ProgramHost {
    /// Bind to `system`. Tracing writes to the system output.
    pub fn new(system: System) -> Self {
        let output = Rc::clone(&system.output);
        let new_line = system.new_line_str();
        let tracer: Rc<dyn Tracer> = Rc::new(move |text: &str| output.write(&format!("{text}{new_line}")));
        Self {
            system,
            current_directory: OnceCell::new(),
            tracer: Some(tracer),
        }
    }

    pub fn without_trace(mut self) -> Self {
        self.tracer = None;
        self
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    /// Working directory, read once and cached.
    pub fn current_directory(&self) -> &str {
        self.current_directory
            .get_or_init(|| normalize_path(&self.system.current_directory()))
    }

    pub fn use_case_sensitive_file_names(&self) -> bool {
        self.system.use_case_sensitive_file_names
    }

    pub fn new_line(&self) -> &'static str {
        self.system.new_line_str()
    }

    /// `options.new_line` when set, otherwise the system newline.
    pub fn new_line_for(&self, options: &CompilerOptions) -> &'static str {
        options.new_line.map_or_else(|| self.new_line(), |kind| kind.as_str())
    }

    pub fn read_file(&self, path: &str, encoding: Option<&str>) -> FsResult<Option<String>> {
        match &self.system.reader {
            Some(reader) => reader.read_file(path, encoding),
            None => Ok(None),
        }
    }

    pub fn write_file(&self, path: &str, data: &str, write_byte_order_mark: bool) -> FsResult<()> {
        match &self.system.writer {
            Some(writer) => writer.write_file(path, data, write_byte_order_mark),
            None => Err(FsError::Other(format!("host cannot write '{path}'"))),
        }
    }

    pub fn create_directory(&self, path: &str) -> FsResult<()> {
        match &self.system.writer {
            Some(writer) => writer.create_directory(path),
            None => Err(FsError::Other(format!("host cannot create directory '{path}'"))),
        }
    }

    pub fn file_exists(&self, path: &str) -> bool {
        match &self.system.directories {
            Some(directories) => directories.file_exists(path),
            None => matches!(self.read_file(path, None), Ok(Some(_))),
        }
    }

    /// `None` when the system cannot answer directory queries.
    pub fn directory_exists(&self, path: &str) -> Option<bool> {
        self.system.directories.as_ref().map(|d| d.directory_exists(path))
    }

    pub fn get_directories(&self, path: &str) -> Vec<String> {
        self.system
            .directories
            .as_ref()
            .map(|d| d.get_directories(path))
            .unwrap_or_default()
    }

    pub fn read_directory(&self, path: &str, extensions: &[String]) -> Vec<String> {
        self.system
            .directories
            .as_ref()
            .map(|d| d.read_directory(path, extensions))
            .unwrap_or_default()
    }

    pub fn realpath(&self, path: &str) -> Option<String> {
        self.system.realpath.as_ref().map(|r| r.realpath(path))
    }

    pub fn get_environment_variable(&self, name: &str) -> Option<String> {
        self.system
            .environment
            .as_ref()
            .and_then(|env| env.get_environment_variable(name))
    }

    pub fn create_hash(&self, data: &str) -> Option<String> {
        self.system.hasher.as_ref().map(|h| h.create_hash(data))
    }

    pub fn trace(&self, text: &str) {
        if let Some(tracer) = &self.tracer {
            tracer.trace(text);
        }
    }

    pub fn has_trace(&self) -> bool {
        self.tracer.is_some()
    }
}

/// Compiler-facing host for one set of compiler options.
pub struct CompilerHostAdapter {
    host: Rc<ProgramHost>,
    options: CompilerOptions,
    casing: FileNameCasing,
    performance: Rc<PerformanceContext>,
    hash_versioned: bool,
}

impl CompilerHostAdapter {
    pub fn new(host: Rc<ProgramHost>, options: CompilerOptions, performance: Rc<PerformanceContext>) -> Self {
        let casing = FileNameCasing::new(host.use_case_sensitive_file_names());
        Self {
            host,
            options,
            casing,
            performance,
            hash_versioned: false,
        }
    }

    /// Give every source file a version: the host hash of its text, or a
    /// djb2 hash when the host has no hasher.
    pub fn set_source_file_as_hash_versioned(&mut self) {
        self.hash_versioned = true;
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn performance(&self) -> &PerformanceContext {
        &self.performance
    }

    fn to_path(&self, file_name: &str) -> String {
        self.casing
            .canonicalize(&normalized_absolute_path(file_name, self.host.current_directory()))
    }

    fn write_file_ensuring_directories(&self, file_name: &str, text: &str, write_byte_order_mark: bool) -> FsResult<()> {
        if self.host.write_file(file_name, text, write_byte_order_mark).is_ok() {
            return Ok(());
        }
        self.ensure_directories_exist(&directory_path(&normalize_path(file_name)))?;
        self.host.write_file(file_name, text, write_byte_order_mark)
    }

    fn ensure_directories_exist(&self, directory: &str) -> FsResult<()> {
        if directory.len() > root_length(directory) && self.host.directory_exists(directory) != Some(true) {
            self.ensure_directories_exist(&directory_path(directory))?;
            self.host.create_directory(directory)?;
        }
        Ok(())
    }
}

impl CompilerHost for CompilerHostAdapter {
    fn get_source_file(&self, file_name: &str, on_error: &mut dyn FnMut(&str)) -> Option<Rc<SourceFile>> {
        let read = {
            let _measure = self.performance.measure("I/O Read");
            self.host.read_file(file_name, self.options.charset.as_deref())
        };
        let text = match read {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(err) => {
                log::debug!("read failed for {file_name}: {err}");
                on_error(&err.to_string());
                String::new()
            }
        };

        let mut file = SourceFile::new(file_name, self.to_path(file_name), text);
        if self.hash_versioned {
            let version = self
                .host
                .create_hash(file.text())
                .unwrap_or_else(|| string_hash(file.text()));
            file = file.with_version(version);
        }
        Some(Rc::new(file))
    }

    fn write_file(&self, file_name: &str, text: &str, write_byte_order_mark: bool, on_error: &mut dyn FnMut(&str)) {
        let _measure = self.performance.measure("I/O Write");
        if let Err(err) = self.write_file_ensuring_directories(file_name, text, write_byte_order_mark) {
            log::debug!("write failed for {file_name}: {err}");
            on_error(&err.to_string());
        }
    }

    fn current_directory(&self) -> String {
        self.host.current_directory().to_string()
    }

    fn use_case_sensitive_file_names(&self) -> bool {
        self.casing.is_case_sensitive()
    }

    fn canonical_file_name(&self, file_name: &str) -> String {
        self.casing.canonicalize(file_name)
    }

    fn new_line(&self) -> &'static str {
        self.host.new_line_for(&self.options)
    }

    fn file_exists(&self, path: &str) -> bool {
        self.host.file_exists(path)
    }

    fn read_file(&self, path: &str) -> Option<String> {
        self.host.read_file(path, None).ok().flatten()
    }

    fn directory_exists(&self, path: &str) -> Option<bool> {
        self.host.directory_exists(path)
    }

    fn get_directories(&self, path: &str) -> Vec<String> {
        self.host.get_directories(path)
    }

    fn read_directory(&self, path: &str, extensions: &[String]) -> Vec<String> {
        self.host.read_directory(path, extensions)
    }

    fn realpath(&self, path: &str) -> String {
        self.host.realpath(path).unwrap_or_else(|| path.to_string())
    }

    fn get_environment_variable(&self, name: &str) -> String {
        self.host.get_environment_variable(name).unwrap_or_default()
    }

    fn create_hash(&self, data: &str) -> Option<String> {
        self.host.create_hash(data)
    }

    fn trace(&self, text: &str) {
        self.host.trace(text);
    }
}
