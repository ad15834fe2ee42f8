//! Event loop
//!
//! `notify` delivers file system events on its own thread; they are sent over
//! an mpsc channel and dispatched here, on the thread that owns the loop, so
//! every callback runs on the compiler thread. Timers live in a deadline
//! queue that the loop drains between events.

use std::cell::{Cell, RefCell};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use notify::event::EventKind;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::domain::ports::{
    DirectoryWatcherCallback, FileWatcher, FileWatcherCallback, FileWatcherEventKind, TimerId,
    Timers, WatchDirectory, WatchFile,
};
use crate::error::{KilnError, KilnResult};

use super::super::fs::to_file_name;

/// Longest the loop blocks before checking its stop conditions again.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

struct FileRegistration {
    name: String,
    path: PathBuf,
    canonical: PathBuf,
    callback: FileWatcherCallback,
}

struct DirectoryRegistration {
    name: String,
    canonical: PathBuf,
    callback: DirectoryWatcherCallback,
}

struct Inner {
    watcher: RefCell<RecommendedWatcher>,
    /// Native watch per (path, recursive) with its registration count
    native: RefCell<HashMap<(PathBuf, bool), usize>>,
    files: RefCell<HashMap<u64, FileRegistration>>,
    directories: RefCell<HashMap<u64, DirectoryRegistration>>,
    next_registration: Cell<u64>,
    deadlines: RefCell<BinaryHeap<Reverse<(Instant, u64)>>>,
    timers: RefCell<HashMap<u64, Box<dyn FnOnce()>>>,
    next_timer: Cell<u64>,
}

pub struct EventLoop {
    inner: Rc<Inner>,
    receiver: Receiver<notify::Result<Event>>,
}

impl EventLoop {
    pub fn new() -> KilnResult<Self> {
        let (sender, receiver) = channel();
        let watcher = RecommendedWatcher::new(
            move |event: notify::Result<Event>| {
                let _ = sender.send(event);
            },
            notify::Config::default(),
        )?;
        Ok(Self {
            inner: Rc::new(Inner {
                watcher: RefCell::new(watcher),
                native: RefCell::new(HashMap::new()),
                files: RefCell::new(HashMap::new()),
                directories: RefCell::new(HashMap::new()),
                next_registration: Cell::new(0),
                deadlines: RefCell::new(BinaryHeap::new()),
                timers: RefCell::new(HashMap::new()),
                next_timer: Cell::new(0),
            }),
            receiver,
        })
    }

    /// Dispatch events and timers until `running` clears or `stop` says so.
    pub fn run(&self, running: &AtomicBool, stop: impl Fn() -> bool) -> KilnResult<()> {
        while running.load(Ordering::SeqCst) && !stop() {
            self.turn(POLL_INTERVAL)?;
        }
        Ok(())
    }

    /// Wait at most `max_wait` for one event, then fire every due timer.
    pub fn turn(&self, max_wait: Duration) -> KilnResult<()> {
        let wait = match self.inner.next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()).min(max_wait),
            None => max_wait,
        };
        match self.receiver.recv_timeout(wait) {
            Ok(Ok(event)) => {
                self.inner.dispatch(&event);
                while let Ok(Ok(event)) = self.receiver.try_recv() {
                    self.inner.dispatch(&event);
                }
            }
            Ok(Err(e)) => log::warn!("watch error: {e}"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return Err(KilnError::Watch {
                    message: "file watcher stopped".to_string(),
                })
            }
        }
        self.inner.fire_due_timers();
        Ok(())
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.timers.borrow().len()
    }
}

impl Inner {
    fn next_registration(&self) -> u64 {
        let id = self.next_registration.get();
        self.next_registration.set(id + 1);
        id
    }

    fn add_native_watch(&self, path: &Path, recursive: bool) {
        let mut native = self.native.borrow_mut();
        let count = native.entry((path.to_path_buf(), recursive)).or_insert(0);
        if *count == 0 {
            let mode = if recursive {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            if let Err(e) = self.watcher.borrow_mut().watch(path, mode) {
                log::warn!("cannot watch {}: {e}", path.display());
            }
        }
        *count += 1;
    }

    fn remove_native_watch(&self, path: &Path, recursive: bool) {
        let mut native = self.native.borrow_mut();
        let key = (path.to_path_buf(), recursive);
        let Some(count) = native.get_mut(&key) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            native.remove(&key);
            if let Err(e) = self.watcher.borrow_mut().unwatch(path) {
                log::debug!("unwatch {}: {e}", path.display());
            }
        }
    }

    fn dispatch(&self, event: &Event) {
        if matches!(event.kind, EventKind::Access(_)) {
            return;
        }
        for path in &event.paths {
            let kind = match event.kind {
                EventKind::Create(_) => FileWatcherEventKind::Created,
                EventKind::Remove(_) => FileWatcherEventKind::Deleted,
                _ if path.exists() => FileWatcherEventKind::Changed,
                _ => FileWatcherEventKind::Deleted,
            };
            log::trace!("{kind:?} {}", path.display());

            let file_callbacks: Vec<(String, FileWatcherCallback)> = self
                .files
                .borrow()
                .values()
                .filter(|r| r.canonical == *path || r.path == *path)
                .map(|r| (r.name.clone(), Rc::clone(&r.callback)))
                .collect();
            for (name, callback) in file_callbacks {
                callback(&name, kind);
            }

            let directory_callbacks: Vec<(String, DirectoryWatcherCallback)> = self
                .directories
                .borrow()
                .values()
                .filter_map(|r| {
                    let relative = path.strip_prefix(&r.canonical).ok()?;
                    let relative = to_file_name(relative);
                    Some((format!("{}/{}", r.name, relative), Rc::clone(&r.callback)))
                })
                .collect();
            for (name, callback) in directory_callbacks {
                callback(&name);
            }
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        let timers = self.timers.borrow();
        let mut deadlines = self.deadlines.borrow_mut();
        while let Some(Reverse((deadline, id))) = deadlines.peek().copied() {
            if timers.contains_key(&id) {
                return Some(deadline);
            }
            deadlines.pop();
        }
        None
    }

    fn fire_due_timers(&self) {
        let now = Instant::now();
        loop {
            let due = {
                let mut deadlines = self.deadlines.borrow_mut();
                match deadlines.peek().copied() {
                    Some(Reverse((deadline, id))) if deadline <= now => {
                        deadlines.pop();
                        Some(id)
                    }
                    _ => None,
                }
            };
            let Some(id) = due else {
                break;
            };
            let callback = self.timers.borrow_mut().remove(&id);
            if let Some(callback) = callback {
                callback();
            }
        }
    }
}

/// Handle for one registration; closing is idempotent.
struct Registration {
    inner: Weak<Inner>,
    id: u64,
    directory: bool,
    closed: Cell<bool>,
}

impl FileWatcher for Registration {
    fn close(&self) {
        if self.closed.replace(true) {
            return;
        }
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        if self.directory {
            let removed = inner.directories.borrow_mut().remove(&self.id);
            if let Some(registration) = removed {
                inner.remove_native_watch(&registration.canonical, true);
            }
        } else {
            let removed = inner.files.borrow_mut().remove(&self.id);
            if let Some(registration) = removed {
                inner.remove_native_watch(&parent_of(&registration.canonical), false);
            }
        }
    }
}

fn parent_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

impl WatchFile for EventLoop {
    /// Watches the parent directory so editors that replace files on save
    /// keep reporting changes. Polling is not supported; the interval is
    /// ignored.
    fn watch_file(
        &self,
        path: &str,
        callback: FileWatcherCallback,
        _polling_interval: Option<Duration>,
    ) -> Box<dyn FileWatcher> {
        let native = PathBuf::from(path);
        let parent = canonical(&parent_of(&native));
        let canonical_path = match native.file_name() {
            Some(name) => parent.join(name),
            None => native.clone(),
        };
        self.inner.add_native_watch(&parent, false);

        let id = self.inner.next_registration();
        self.inner.files.borrow_mut().insert(
            id,
            FileRegistration {
                name: path.to_string(),
                path: native,
                canonical: canonical_path,
                callback,
            },
        );
        Box::new(Registration {
            inner: Rc::downgrade(&self.inner),
            id,
            directory: false,
            closed: Cell::new(false),
        })
    }
}

impl WatchDirectory for EventLoop {
    /// Directory watches are always recursive.
    fn watch_directory(
        &self,
        path: &str,
        callback: DirectoryWatcherCallback,
        _recursive: bool,
    ) -> Box<dyn FileWatcher> {
        let canonical_path = canonical(Path::new(path));
        self.inner.add_native_watch(&canonical_path, true);

        let id = self.inner.next_registration();
        self.inner.directories.borrow_mut().insert(
            id,
            DirectoryRegistration {
                name: path.trim_end_matches('/').to_string(),
                canonical: canonical_path,
                callback,
            },
        );
        Box::new(Registration {
            inner: Rc::downgrade(&self.inner),
            id,
            directory: true,
            closed: Cell::new(false),
        })
    }
}

impl Timers for EventLoop {
    fn set_timeout(&self, callback: Box<dyn FnOnce()>, delay: Duration) -> Option<TimerId> {
        let id = self.inner.next_timer.get();
        self.inner.next_timer.set(id + 1);
        self.inner.timers.borrow_mut().insert(id, callback);
        self.inner
            .deadlines
            .borrow_mut()
            .push(Reverse((Instant::now() + delay, id)));
        Some(TimerId(id))
    }

    fn clear_timeout(&self, id: TimerId) {
        self.inner.timers.borrow_mut().remove(&id.0);
    }
}
