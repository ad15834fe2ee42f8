//! Test doubles shared by the unit tests
//!
//! An in-memory file system, a capturing output, a fixed clock, a recording
//! watch/timer host and a spy program.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::entities::{
    Diagnostic, EmitResult, FileIncludeReason, FileIncludeReasons, SourceFile,
};
use crate::domain::ports::{
    CancellationToken, Clock, DirectoryReader, DirectoryWatcherCallback, EmitRequest, Environment,
    FileReader, FileWatcher, FileWatcherCallback, FileWatcherEventKind, FileWriter, FsError,
    FsResult, Output, Program, Realpath, Screen, System, TimerId, Timers, WatchDirectory,
    WatchFile,
};
use crate::domain::value_objects::path::{directory_path, normalize_path};
use crate::domain::value_objects::{CompilerOptions, NewLineKind};

/// Remove ANSI escape sequences.
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Default)]
pub struct MemoryFs {
    files: RefCell<BTreeMap<String, String>>,
    directories: RefCell<BTreeSet<String>>,
    unreadable: RefCell<HashSet<String>>,
    links: RefCell<HashMap<String, String>>,
}

impl MemoryFs {
    pub fn add_directory(&self, path: &str) {
        let mut dir = normalize_path(path);
        loop {
            self.directories.borrow_mut().insert(dir.clone());
            let parent = directory_path(&dir);
            if parent.is_empty() || parent == dir {
                break;
            }
            dir = parent;
        }
    }

    pub fn add_file(&self, path: &str, text: &str) {
        self.add_directory(&directory_path(path));
        self.files.borrow_mut().insert(path.to_string(), text.to_string());
    }

    pub fn remove(&self, path: &str) {
        self.files.borrow_mut().remove(path);
    }

    pub fn make_unreadable(&self, path: &str) {
        self.unreadable.borrow_mut().insert(path.to_string());
    }

    /// Make `link` resolve to `target` through `realpath`.
    pub fn add_link(&self, link: &str, target: &str) {
        self.links.borrow_mut().insert(link.to_string(), target.to_string());
    }

    pub fn read(&self, path: &str) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    pub fn has_directory(&self, path: &str) -> bool {
        self.directories.borrow().contains(path)
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl FileReader for MemoryFs {
    fn read_file(&self, path: &str, _encoding: Option<&str>) -> FsResult<Option<String>> {
        if self.unreadable.borrow().contains(path) {
            return Err(FsError::PermissionDenied(path.to_string()));
        }
        Ok(self.read(path))
    }
}

impl FileWriter for MemoryFs {
    fn write_file(&self, path: &str, data: &str, write_byte_order_mark: bool) -> FsResult<()> {
        let parent = directory_path(path);
        if !self.has_directory(&parent) {
            return Err(FsError::NotFound(parent));
        }
        let text = if write_byte_order_mark {
            format!("\u{feff}{data}")
        } else {
            data.to_string()
        };
        self.files.borrow_mut().insert(path.to_string(), text);
        Ok(())
    }

    fn create_directory(&self, path: &str) -> FsResult<()> {
        let parent = directory_path(path);
        if !self.has_directory(&parent) {
            return Err(FsError::NotFound(parent));
        }
        self.directories.borrow_mut().insert(path.to_string());
        Ok(())
    }
}

impl DirectoryReader for MemoryFs {
    fn file_exists(&self, path: &str) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn directory_exists(&self, path: &str) -> bool {
        self.has_directory(path)
    }

    fn get_directories(&self, path: &str) -> Vec<String> {
        self.directories
            .borrow()
            .iter()
            .filter(|dir| directory_path(dir) == path && dir.as_str() != path)
            .map(|dir| dir.rsplit('/').next().unwrap_or(dir).to_string())
            .collect()
    }

    fn read_directory(&self, path: &str, extensions: &[String]) -> Vec<String> {
        let prefix = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        };
        self.files
            .borrow()
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .filter(|name| {
                extensions
                    .iter()
                    .any(|ext| name.ends_with(&format!(".{ext}")))
            })
            .cloned()
            .collect()
    }
}

impl Realpath for MemoryFs {
    fn realpath(&self, path: &str) -> String {
        self.links
            .borrow()
            .get(path)
            .cloned()
            .unwrap_or_else(|| path.to_string())
    }
}

#[derive(Default)]
struct CapturingOutput {
    text: RefCell<String>,
}

impl Output for CapturingOutput {
    fn write(&self, text: &str) {
        self.text.borrow_mut().push_str(text);
    }
}

#[derive(Default)]
struct CountingScreen {
    clears: Cell<usize>,
}

impl Screen for CountingScreen {
    fn clear_screen(&self) {
        self.clears.set(self.clears.get() + 1);
    }
}

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(0, 0).expect("epoch is representable")
    }
}

struct MapEnvironment(HashMap<String, String>);

impl Environment for MapEnvironment {
    fn get_environment_variable(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

struct RecordedWatcher {
    closed: Rc<Cell<bool>>,
}

impl FileWatcher for RecordedWatcher {
    fn close(&self) {
        self.closed.set(true);
    }
}

type PendingTimer = (TimerId, Duration, Box<dyn FnOnce()>);

/// Records watches and timers and lets tests fire them.
#[derive(Default)]
pub struct FakeWatch {
    files: RefCell<Vec<(String, FileWatcherCallback, Rc<Cell<bool>>)>>,
    directories: RefCell<Vec<(String, DirectoryWatcherCallback, Rc<Cell<bool>>)>>,
    timers: RefCell<Vec<PendingTimer>>,
    next_timer: Cell<u64>,
    cleared: Cell<usize>,
}

impl FakeWatch {
    /// Paths with an open file watch, in registration order.
    pub fn watched_files(&self) -> Vec<String> {
        self.files
            .borrow()
            .iter()
            .filter(|(_, _, closed)| !closed.get())
            .map(|(path, _, _)| path.clone())
            .collect()
    }

    pub fn watched_directories(&self) -> Vec<String> {
        self.directories
            .borrow()
            .iter()
            .filter(|(_, _, closed)| !closed.get())
            .map(|(path, _, _)| path.clone())
            .collect()
    }

    /// Invoke the open watches of `path`.
    pub fn trigger_file(&self, path: &str, kind: FileWatcherEventKind) {
        let callbacks: Vec<FileWatcherCallback> = self
            .files
            .borrow()
            .iter()
            .filter(|(p, _, closed)| p == path && !closed.get())
            .map(|(_, callback, _)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(path, kind);
        }
    }

    /// Invoke the open directory watches containing `file`.
    pub fn trigger_directory(&self, file: &str) {
        let callbacks: Vec<DirectoryWatcherCallback> = self
            .directories
            .borrow()
            .iter()
            .filter(|(dir, _, closed)| file.starts_with(&format!("{dir}/")) && !closed.get())
            .map(|(_, callback, _)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(file);
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn cleared_timers(&self) -> usize {
        self.cleared.get()
    }

    /// Delay of the most recently scheduled pending timer.
    pub fn last_delay(&self) -> Option<Duration> {
        self.timers.borrow().last().map(|(_, delay, _)| *delay)
    }

    /// Fire every timer pending right now; timers they schedule stay pending.
    pub fn run_timers(&self) -> usize {
        let due: Vec<PendingTimer> = self.timers.borrow_mut().drain(..).collect();
        let count = due.len();
        for (_, _, callback) in due {
            callback();
        }
        count
    }
}

impl WatchFile for FakeWatch {
    fn watch_file(
        &self,
        path: &str,
        callback: FileWatcherCallback,
        _polling_interval: Option<Duration>,
    ) -> Box<dyn FileWatcher> {
        let closed = Rc::new(Cell::new(false));
        self.files
            .borrow_mut()
            .push((path.to_string(), callback, Rc::clone(&closed)));
        Box::new(RecordedWatcher { closed })
    }
}

impl WatchDirectory for FakeWatch {
    fn watch_directory(
        &self,
        path: &str,
        callback: DirectoryWatcherCallback,
        _recursive: bool,
    ) -> Box<dyn FileWatcher> {
        let closed = Rc::new(Cell::new(false));
        self.directories
            .borrow_mut()
            .push((path.to_string(), callback, Rc::clone(&closed)));
        Box::new(RecordedWatcher { closed })
    }
}

impl Timers for FakeWatch {
    fn set_timeout(&self, callback: Box<dyn FnOnce()>, delay: Duration) -> Option<TimerId> {
        let id = TimerId(self.next_timer.get());
        self.next_timer.set(id.0 + 1);
        self.timers.borrow_mut().push((id, delay, callback));
        Some(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        let mut timers = self.timers.borrow_mut();
        let before = timers.len();
        timers.retain(|(timer, _, _)| *timer != id);
        if timers.len() != before {
            self.cleared.set(self.cleared.get() + 1);
        }
    }
}

/// Builder for a [`System`] backed by test doubles.
pub struct TestSystem {
    current_directory: String,
    fs: Rc<MemoryFs>,
    output: Rc<CapturingOutput>,
    screen: Option<Rc<CountingScreen>>,
    watch: Option<Rc<FakeWatch>>,
    environment: HashMap<String, String>,
    case_sensitive: bool,
}

impl TestSystem {
    pub fn new(current_directory: &str) -> Self {
        let fs = Rc::new(MemoryFs::default());
        fs.add_directory(current_directory);
        Self {
            current_directory: current_directory.to_string(),
            fs,
            output: Rc::new(CapturingOutput::default()),
            screen: None,
            watch: None,
            environment: HashMap::new(),
            case_sensitive: true,
        }
    }

    pub fn with_file(self, path: &str, text: &str) -> Self {
        self.fs.add_file(path, text);
        self
    }

    pub fn with_screen(mut self) -> Self {
        self.screen = Some(Rc::new(CountingScreen::default()));
        self
    }

    pub fn with_watch(mut self) -> Self {
        self.watch = Some(Rc::new(FakeWatch::default()));
        self
    }

    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        self.environment.insert(name.to_string(), value.to_string());
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    pub fn system(&self) -> System {
        let output: Rc<dyn Output> = self.output.clone();
        let current_directory = self.current_directory.clone();
        let mut system = System::new(output, Rc::new(move || current_directory.clone()))
            .with_new_line(NewLineKind::Lf)
            .with_case_sensitive_file_names(self.case_sensitive)
            .with_reader(self.fs.clone())
            .with_writer(self.fs.clone())
            .with_directories(self.fs.clone())
            .with_realpath(self.fs.clone())
            .with_environment(Rc::new(MapEnvironment(self.environment.clone())))
            .with_clock(Rc::new(FixedClock));
        if let Some(screen) = &self.screen {
            system = system.with_screen(screen.clone());
        }
        if let Some(watch) = &self.watch {
            system = system
                .with_watch_file(watch.clone())
                .with_watch_directory(watch.clone())
                .with_timers(watch.clone());
        }
        system
    }

    pub fn output(&self) -> String {
        self.output.text.borrow().clone()
    }

    /// Return and forget everything written so far.
    pub fn take_output(&self) -> String {
        std::mem::take(&mut *self.output.text.borrow_mut())
    }

    pub fn clear_count(&self) -> usize {
        self.screen.as_ref().map_or(0, |s| s.clears.get())
    }

    pub fn fs(&self) -> &MemoryFs {
        &self.fs
    }

    pub fn watch(&self) -> &FakeWatch {
        self.watch.as_deref().expect("TestSystem built without with_watch()")
    }
}

/// Diagnostic-producing phase of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ConfigFile,
    Syntactic,
    Options,
    Global,
    Semantic,
    Declaration,
}

/// What the last `emit` call was given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordedEmitRequest {
    pub had_write_file: bool,
    pub emit_only_dts_files: bool,
    pub had_custom_transformers: bool,
    pub cancelled: bool,
}

/// A program with canned results that counts how it is queried.
pub struct SpyProgram {
    current_directory: String,
    options: CompilerOptions,
    files: Vec<Rc<SourceFile>>,
    reasons: FileIncludeReasons,
    diagnostics: HashMap<Stage, Vec<Diagnostic>>,
    calls: RefCell<HashMap<Stage, usize>>,
    emit_result: EmitResult,
    emit_calls: Cell<usize>,
    last_emit: Cell<RecordedEmitRequest>,
}

impl SpyProgram {
    pub fn new(current_directory: &str) -> Self {
        Self {
            current_directory: current_directory.to_string(),
            options: CompilerOptions::default(),
            files: Vec::new(),
            reasons: FileIncludeReasons::new(),
            diagnostics: HashMap::new(),
            calls: RefCell::new(HashMap::new()),
            emit_result: EmitResult::default(),
            emit_calls: Cell::new(0),
            last_emit: Cell::new(RecordedEmitRequest::default()),
        }
    }

    pub fn add_file(&mut self, file_name: &str, text: &str) {
        self.files.push(Rc::new(SourceFile::new(file_name, file_name, text)));
    }

    pub fn add_redirected_file(&mut self, file_name: &str, text: &str, target: &str) {
        self.files.push(Rc::new(
            SourceFile::new(file_name, file_name, text).with_redirect_target(target),
        ));
    }

    pub fn add_reason(&mut self, path: &str, reason: FileIncludeReason) {
        self.reasons.add(path, reason);
    }

    pub fn set_options(&mut self, options: CompilerOptions) {
        self.options = options;
    }

    pub fn set_diagnostics(&mut self, stage: Stage, diagnostics: Vec<Diagnostic>) {
        self.diagnostics.insert(stage, diagnostics);
    }

    pub fn set_emit_result(&mut self, result: EmitResult) {
        self.emit_result = result;
    }

    pub fn calls(&self, stage: Stage) -> usize {
        self.calls.borrow().get(&stage).copied().unwrap_or(0)
    }

    pub fn emit_calls(&self) -> usize {
        self.emit_calls.get()
    }

    pub fn last_emit_request(&self) -> RecordedEmitRequest {
        self.last_emit.get()
    }

    fn record(&self, stage: Stage) -> Vec<Diagnostic> {
        *self.calls.borrow_mut().entry(stage).or_default() += 1;
        self.diagnostics.get(&stage).cloned().unwrap_or_default()
    }
}

impl Program for SpyProgram {
    fn current_directory(&self) -> String {
        self.current_directory.clone()
    }

    fn canonical_file_name(&self, file_name: &str) -> String {
        file_name.to_string()
    }

    fn compiler_options(&self) -> &CompilerOptions {
        &self.options
    }

    fn source_files(&self) -> &[Rc<SourceFile>] {
        &self.files
    }

    fn source_file_by_path(&self, path: &str) -> Option<Rc<SourceFile>> {
        self.files.iter().find(|f| f.path() == path).cloned()
    }

    fn file_include_reasons(&self) -> &FileIncludeReasons {
        &self.reasons
    }

    fn config_file_parsing_diagnostics(&self) -> Vec<Diagnostic> {
        self.record(Stage::ConfigFile)
    }

    fn syntactic_diagnostics(&self, _: Option<&CancellationToken>) -> Vec<Diagnostic> {
        self.record(Stage::Syntactic)
    }

    fn options_diagnostics(&self, _: Option<&CancellationToken>) -> Vec<Diagnostic> {
        self.record(Stage::Options)
    }

    fn global_diagnostics(&self, _: Option<&CancellationToken>) -> Vec<Diagnostic> {
        self.record(Stage::Global)
    }

    fn semantic_diagnostics(&self, _: Option<&CancellationToken>) -> Vec<Diagnostic> {
        self.record(Stage::Semantic)
    }

    fn declaration_diagnostics(&self, _: Option<&CancellationToken>) -> Vec<Diagnostic> {
        self.record(Stage::Declaration)
    }

    fn emit(&self, request: EmitRequest<'_>) -> EmitResult {
        self.emit_calls.set(self.emit_calls.get() + 1);
        self.last_emit.set(RecordedEmitRequest {
            had_write_file: request.write_file.is_some(),
            emit_only_dts_files: request.emit_only_dts_files,
            had_custom_transformers: request.custom_transformers.is_some(),
            cancelled: request.cancellation.is_some_and(CancellationToken::is_cancellation_requested),
        });
        self.emit_result.clone()
    }
}
