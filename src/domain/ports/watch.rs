//! Watch and timer capabilities
//!
//! Callbacks are `Rc` closures invoked on the thread that owns the event
//! loop; nothing here is `Send`.

use std::rc::Rc;
use std::time::Duration;

/// What happened to a watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileWatcherEventKind {
    Created,
    Changed,
    Deleted,
}

pub type FileWatcherCallback = Rc<dyn Fn(&str, FileWatcherEventKind)>;

/// Called with the path of the entry that changed inside the directory.
pub type DirectoryWatcherCallback = Rc<dyn Fn(&str)>;

/// Handle to an active watch registration.
pub trait FileWatcher {
    fn close(&self);
}

/// Watch registration that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFileWatcher;

impl FileWatcher for NoopFileWatcher {
    fn close(&self) {}
}

pub trait WatchFile {
    fn watch_file(
        &self,
        path: &str,
        callback: FileWatcherCallback,
        polling_interval: Option<Duration>,
    ) -> Box<dyn FileWatcher>;
}

pub trait WatchDirectory {
    fn watch_directory(
        &self,
        path: &str,
        callback: DirectoryWatcherCallback,
        recursive: bool,
    ) -> Box<dyn FileWatcher>;
}

/// Identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

pub trait Timers {
    /// Run `callback` once after `delay`.
    fn set_timeout(&self, callback: Box<dyn FnOnce()>, delay: Duration) -> Option<TimerId>;

    /// Cancel a timer that has not fired yet; unknown ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}
