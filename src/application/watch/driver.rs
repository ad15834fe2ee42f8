//! Watch driver
//!
//! Owns one watch session: the initial build, the watches over every input,
//! and the debounced rebuild that follows a change. All state lives on the
//! event loop thread; watch and timer callbacks hold weak references so a
//! dropped driver simply stops reacting.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::application::config_file::ParsedCommandLine;
use crate::application::emit::EmitOutcome;
use crate::config::WatchConfig;
use crate::domain::entities::Diagnostic;
use crate::domain::ports::{FileWatcher, FileWatcherEventKind, Program, TimerId};
use crate::domain::value_objects::{messages, CompilerOptions};

use super::cache::ContentCache;
use super::compiler_host::WatchCompilerHost;
use super::event::WatchEvent;

/// Receives session milestones, e.g. for NDJSON output.
pub type WatchObserver = Rc<dyn Fn(&WatchEvent)>;

pub struct WatchDriver {
    state: Rc<DriverState>,
}

struct DriverState {
    host: WatchCompilerHost,
    observer: RefCell<Option<WatchObserver>>,
    parsed: RefCell<Option<ParsedCommandLine>>,
    program: RefCell<Option<Rc<dyn Program>>>,
    last_outcome: RefCell<Option<EmitOutcome>>,
    cache: RefCell<ContentCache>,
    file_watchers: RefCell<BTreeMap<String, Box<dyn FileWatcher>>>,
    directory_watchers: RefCell<BTreeMap<String, Box<dyn FileWatcher>>>,
    timer: Cell<Option<TimerId>>,
    reload: Cell<bool>,
    changed: RefCell<BTreeSet<String>>,
    fatal: RefCell<Option<Diagnostic>>,
    cycles: Cell<usize>,
}

impl WatchDriver {
    pub fn new(host: WatchCompilerHost) -> Self {
        Self {
            state: Rc::new(DriverState {
                host,
                observer: RefCell::new(None),
                parsed: RefCell::new(None),
                program: RefCell::new(None),
                last_outcome: RefCell::new(None),
                cache: RefCell::new(ContentCache::new()),
                file_watchers: RefCell::new(BTreeMap::new()),
                directory_watchers: RefCell::new(BTreeMap::new()),
                timer: Cell::new(None),
                reload: Cell::new(false),
                changed: RefCell::new(BTreeSet::new()),
                fatal: RefCell::new(None),
                cycles: Cell::new(0),
            }),
        }
    }

    pub fn with_observer(self, observer: WatchObserver) -> Self {
        *self.state.observer.borrow_mut() = Some(observer);
        self
    }

    /// Parse the input, build once and start watching.
    ///
    /// An unrecoverable config ends the session before anything is built;
    /// its diagnostic has already been reported.
    pub fn start(&self) -> Result<(), Diagnostic> {
        let state = &self.state;
        let parsed = state.host.parse().inspect_err(|diagnostic| {
            *state.fatal.borrow_mut() = Some(diagnostic.clone());
        })?;
        state
            .host
            .on_watch_status_change(&messages::STARTING_COMPILATION_IN_WATCH_MODE, &[], &parsed.options);
        *state.parsed.borrow_mut() = Some(parsed);

        state.build();
        state.notify(&WatchEvent::WatchStarted {
            config: state.config_file_name(),
            watching: self.watched_files(),
        });
        Ok(())
    }

    /// The diagnostic that ended the session, if any.
    pub fn fatal(&self) -> Option<Diagnostic> {
        self.state.fatal.borrow().clone()
    }

    pub fn program(&self) -> Option<Rc<dyn Program>> {
        self.state.program.borrow().clone()
    }

    /// Error count of the most recent cycle.
    pub fn last_error_count(&self) -> Option<usize> {
        self.state
            .last_outcome
            .borrow()
            .as_ref()
            .map(EmitOutcome::error_count)
    }

    /// Completed build cycles, the initial build included.
    pub fn cycles(&self) -> usize {
        self.state.cycles.get()
    }

    pub fn has_pending_rebuild(&self) -> bool {
        self.state.timer.get().is_some()
    }

    pub fn watched_files(&self) -> Vec<String> {
        self.state.file_watchers.borrow().keys().cloned().collect()
    }

    pub fn watched_directories(&self) -> Vec<String> {
        self.state.directory_watchers.borrow().keys().cloned().collect()
    }

    /// Close every watch and cancel a pending rebuild.
    pub fn close(&self) {
        self.state.close_watches();
        self.state.notify(&WatchEvent::Shutdown);
    }
}

impl DriverState {
    fn notify(&self, event: &WatchEvent) {
        let observer = self.observer.borrow().clone();
        if let Some(observer) = observer {
            observer(event);
        }
    }

    fn current_options(&self) -> CompilerOptions {
        self.parsed
            .borrow()
            .as_ref()
            .map(|parsed| parsed.options.clone())
            .unwrap_or_default()
    }

    fn debounce(&self) -> Duration {
        self.parsed
            .borrow()
            .as_ref()
            .map_or_else(|| WatchConfig::default().debounce(), |parsed| parsed.watch.debounce())
    }

    fn config_file_name(&self) -> Option<String> {
        self.parsed
            .borrow()
            .as_ref()
            .and_then(|parsed| parsed.config_file_name.clone())
    }

    /// Build a program from the current input, emit it and refresh watches.
    fn build(self: &Rc<Self>) {
        let program = {
            let parsed = self.parsed.borrow();
            let Some(parsed) = parsed.as_ref() else {
                return;
            };
            self.host.create_program(parsed)
        };
        let outcome = self.host.after_program_create(program.as_ref());

        {
            let config_file_name = self.config_file_name();
            let mut cache = self.cache.borrow_mut();
            let files = program.source_files();
            cache.retain(|name| files.iter().any(|file| file.file_name() == name));
            for file in files {
                cache.update(file.file_name(), file.text());
            }
            if let Some(name) = config_file_name {
                if let Ok(Some(text)) = self.host.program_host().read_file(&name, None) {
                    cache.update(&name, &text);
                }
            }
        }
        self.update_watches(program.as_ref());

        let cycles = self.cycles.get() + 1;
        self.cycles.set(cycles);
        log::info!(
            "watch cycle {cycles}: {} file(s), {} error(s)",
            program.source_files().len(),
            outcome.error_count()
        );
        self.notify(&WatchEvent::CycleComplete {
            errors: outcome.error_count(),
            emitted: outcome
                .emit_result
                .emitted_files
                .as_ref()
                .map_or(0, Vec::len),
        });
        *self.program.borrow_mut() = Some(program);
        *self.last_outcome.borrow_mut() = Some(outcome);
    }

    fn update_watches(self: &Rc<Self>, program: &dyn Program) {
        let mut wanted: BTreeSet<String> = program
            .source_files()
            .iter()
            .map(|file| file.file_name().to_string())
            .collect();
        if let Some(config_file_name) = self.config_file_name() {
            wanted.insert(config_file_name);
        }

        let stale: Vec<Box<dyn FileWatcher>> = {
            let mut watchers = self.file_watchers.borrow_mut();
            let names: Vec<String> = watchers
                .keys()
                .filter(|name| !wanted.contains(*name))
                .cloned()
                .collect();
            names.iter().filter_map(|name| watchers.remove(name)).collect()
        };
        for watcher in stale {
            watcher.close();
        }

        let missing: Vec<String> = {
            let watchers = self.file_watchers.borrow();
            wanted.into_iter().filter(|name| !watchers.contains_key(name)).collect()
        };
        for name in missing {
            let weak = Rc::downgrade(self);
            let watcher = self.host.watch_host().watch_file(
                &name,
                Rc::new(move |path: &str, kind: FileWatcherEventKind| {
                    if let Some(state) = weak.upgrade() {
                        state.on_file_change(path, kind);
                    }
                }),
                None,
            );
            self.file_watchers.borrow_mut().insert(name, watcher);
        }

        let directories: BTreeSet<String> = self
            .parsed
            .borrow()
            .as_ref()
            .map(|parsed| parsed.wildcard_directories.iter().cloned().collect())
            .unwrap_or_default();
        let stale: Vec<Box<dyn FileWatcher>> = {
            let mut watchers = self.directory_watchers.borrow_mut();
            let names: Vec<String> = watchers
                .keys()
                .filter(|name| !directories.contains(*name))
                .cloned()
                .collect();
            names.iter().filter_map(|name| watchers.remove(name)).collect()
        };
        for watcher in stale {
            watcher.close();
        }
        for directory in directories {
            if self.directory_watchers.borrow().contains_key(&directory) {
                continue;
            }
            let weak = Rc::downgrade(self);
            let watcher = self.host.watch_host().watch_directory(
                &directory,
                Rc::new(move |path: &str| {
                    if let Some(state) = weak.upgrade() {
                        state.on_directory_change(path);
                    }
                }),
                true,
            );
            self.directory_watchers.borrow_mut().insert(directory, watcher);
        }
    }

    fn on_file_change(self: &Rc<Self>, path: &str, kind: FileWatcherEventKind) {
        let changed = match kind {
            FileWatcherEventKind::Deleted => {
                self.cache.borrow_mut().invalidate(path);
                true
            }
            FileWatcherEventKind::Created | FileWatcherEventKind::Changed => {
                match self.host.program_host().read_file(path, None) {
                    Ok(Some(text)) => self.cache.borrow_mut().observe(path, &text),
                    Ok(None) | Err(_) => {
                        self.cache.borrow_mut().invalidate(path);
                        true
                    }
                }
            }
        };
        if !changed {
            log::trace!("ignoring save without content change: {path}");
            return;
        }

        log::debug!("{kind:?}: {path}");
        if self.config_file_name().as_deref() == Some(path) {
            self.reload.set(true);
        }
        self.record_change(path);
    }

    fn on_directory_change(self: &Rc<Self>, path: &str) {
        if self.file_watchers.borrow().contains_key(path) {
            return;
        }
        let matches = self
            .parsed
            .borrow()
            .as_ref()
            .is_some_and(|parsed| parsed.matches_wildcard(path));
        if !matches {
            log::trace!("ignoring directory event: {path}");
            return;
        }

        log::debug!("wildcard directory change: {path}");
        self.reload.set(true);
        self.record_change(path);
    }

    fn record_change(self: &Rc<Self>, path: &str) {
        if self.changed.borrow_mut().insert(path.to_string()) {
            self.notify(&WatchEvent::FileChanged {
                path: path.to_string(),
            });
        }
        self.schedule_rebuild();
    }

    fn schedule_rebuild(self: &Rc<Self>) {
        if let Some(id) = self.timer.take() {
            self.host.watch_host().clear_timeout(id);
        }
        let weak: Weak<Self> = Rc::downgrade(self);
        let id = self.host.watch_host().set_timeout(
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    state.on_rebuild_timer();
                }
            }),
            self.debounce(),
        );
        self.timer.set(id);
    }

    fn on_rebuild_timer(self: &Rc<Self>) {
        self.timer.set(None);
        self.host
            .on_watch_status_change(&messages::FILE_CHANGE_DETECTED, &[], &self.current_options());
        let changed = std::mem::take(&mut *self.changed.borrow_mut());
        log::debug!("rebuilding after {} change(s)", changed.len());

        if self.reload.replace(false) {
            match self.host.parse() {
                Ok(parsed) => *self.parsed.borrow_mut() = Some(parsed),
                Err(diagnostic) => {
                    log::warn!("config can no longer be used; stopping watch");
                    *self.fatal.borrow_mut() = Some(diagnostic);
                    self.close_watches();
                    return;
                }
            }
        }
        self.build();
    }

    fn close_watches(&self) {
        if let Some(id) = self.timer.take() {
            self.host.watch_host().clear_timeout(id);
        }
        let files = std::mem::take(&mut *self.file_watchers.borrow_mut());
        let directories = std::mem::take(&mut *self.directory_watchers.borrow_mut());
        for watcher in files.into_values().chain(directories.into_values()) {
            watcher.close();
        }
    }
}
