//! Watch host
//!
//! File and directory watches and timers for the watch driver. Whatever the
//! system cannot provide is replaced by a no-op, so callers never check for
//! support: on a system without watches the driver simply never wakes up.

use std::rc::Rc;
use std::time::Duration;

use crate::domain::entities::Diagnostic;
use crate::domain::ports::{
    DirectoryWatcherCallback, FileWatcher, FileWatcherCallback, NoopFileWatcher, System, TimerId,
    Timers, WatchDirectory, WatchFile,
};
use crate::domain::value_objects::CompilerOptions;

use super::watch_status::{ReportWatchStatus, WatchStatusReporter};

#[derive(Clone)]
pub struct WatchHost {
    on_watch_status_change: Rc<dyn ReportWatchStatus>,
    watch_file: Option<Rc<dyn WatchFile>>,
    watch_directory: Option<Rc<dyn WatchDirectory>>,
    timers: Option<Rc<dyn Timers>>,
}

impl WatchHost {
    /// Bind to `system`; status goes to `report_watch_status`, or to a plain
    /// [`WatchStatusReporter`] on the system when none is given.
    pub fn new(system: &System, report_watch_status: Option<Rc<dyn ReportWatchStatus>>) -> Self {
        let on_watch_status_change: Rc<dyn ReportWatchStatus> = match report_watch_status {
            Some(report) => report,
            None => Rc::new(WatchStatusReporter::new(system, false)),
        };
        Self {
            on_watch_status_change,
            watch_file: system.watch_file.clone(),
            watch_directory: system.watch_directory.clone(),
            timers: system.timers.clone(),
        }
    }

    pub fn on_watch_status_change(&self, diagnostic: &Diagnostic, new_line: &str, options: &CompilerOptions) -> bool {
        self.on_watch_status_change.report(diagnostic, new_line, options)
    }

    pub fn watch_file(
        &self,
        path: &str,
        callback: FileWatcherCallback,
        polling_interval: Option<Duration>,
    ) -> Box<dyn FileWatcher> {
        match &self.watch_file {
            Some(watch) => watch.watch_file(path, callback, polling_interval),
            None => Box::new(NoopFileWatcher),
        }
    }

    pub fn watch_directory(
        &self,
        path: &str,
        callback: DirectoryWatcherCallback,
        recursive: bool,
    ) -> Box<dyn FileWatcher> {
        match &self.watch_directory {
            Some(watch) => watch.watch_directory(path, callback, recursive),
            None => Box::new(NoopFileWatcher),
        }
    }

    /// `None` when the system has no timers; the callback is then dropped.
    pub fn set_timeout(&self, callback: Box<dyn FnOnce()>, delay: Duration) -> Option<TimerId> {
        self.timers.as_ref().and_then(|t| t.set_timeout(callback, delay))
    }

    pub fn clear_timeout(&self, id: TimerId) {
        if let Some(timers) = &self.timers {
            timers.clear_timeout(id);
        }
    }

    /// Whether file changes can ever trigger a rebuild.
    pub fn is_reactive(&self) -> bool {
        (self.watch_file.is_some() || self.watch_directory.is_some()) && self.timers.is_some()
    }
}
