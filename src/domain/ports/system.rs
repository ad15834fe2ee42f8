//! System capability set
//!
//! [`System`] bundles what a host process offers the compiler: an output sink
//! and working directory (always present) plus optional capabilities. A
//! missing capability is `None`; adapters substitute no-ops for it.

use std::rc::Rc;

use chrono::{DateTime, Utc};

use super::file_system::{DirectoryReader, FileReader, FileWriter, Realpath};
use super::watch::{Timers, WatchDirectory, WatchFile};
use crate::domain::value_objects::NewLineKind;

/// Text sink for everything the compiler prints.
pub trait Output {
    fn write(&self, text: &str);
}

pub trait WorkingDirectory {
    fn current_directory(&self) -> String;
}

pub trait Screen {
    fn clear_screen(&self);
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub trait Environment {
    fn get_environment_variable(&self, name: &str) -> Option<String>;
}

pub trait Hasher {
    fn create_hash(&self, data: &str) -> String;
}

pub trait Tracer {
    fn trace(&self, text: &str);
}

impl<F: Fn(&str)> Output for F {
    fn write(&self, text: &str) {
        self(text)
    }
}

impl<F: Fn() -> String> WorkingDirectory for F {
    fn current_directory(&self) -> String {
        self()
    }
}

impl<F: Fn(&str)> Tracer for F {
    fn trace(&self, text: &str) {
        self(text)
    }
}

/// Host process capabilities.
#[derive(Clone)]
pub struct System {
    pub new_line: NewLineKind,
    pub use_case_sensitive_file_names: bool,
    pub output: Rc<dyn Output>,
    pub working_directory: Rc<dyn WorkingDirectory>,
    pub reader: Option<Rc<dyn FileReader>>,
    pub writer: Option<Rc<dyn FileWriter>>,
    pub directories: Option<Rc<dyn DirectoryReader>>,
    pub realpath: Option<Rc<dyn Realpath>>,
    pub environment: Option<Rc<dyn Environment>>,
    pub hasher: Option<Rc<dyn Hasher>>,
    pub screen: Option<Rc<dyn Screen>>,
    pub clock: Option<Rc<dyn Clock>>,
    pub watch_file: Option<Rc<dyn WatchFile>>,
    pub watch_directory: Option<Rc<dyn WatchDirectory>>,
    pub timers: Option<Rc<dyn Timers>>,
}

impl System {
    /// A system with only an output sink and a working directory.
    pub fn new(output: Rc<dyn Output>, working_directory: Rc<dyn WorkingDirectory>) -> Self {
        Self {
            new_line: NewLineKind::platform(),
            use_case_sensitive_file_names: true,
            output,
            working_directory,
            reader: None,
            writer: None,
            directories: None,
            realpath: None,
            environment: None,
            hasher: None,
            screen: None,
            clock: None,
            watch_file: None,
            watch_directory: None,
            timers: None,
        }
    }

    pub fn with_new_line(mut self, new_line: NewLineKind) -> Self {
        self.new_line = new_line;
        self
    }

    pub fn with_case_sensitive_file_names(mut self, case_sensitive: bool) -> Self {
        self.use_case_sensitive_file_names = case_sensitive;
        self
    }

    pub fn with_reader(mut self, reader: Rc<dyn FileReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn with_writer(mut self, writer: Rc<dyn FileWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn with_directories(mut self, directories: Rc<dyn DirectoryReader>) -> Self {
        self.directories = Some(directories);
        self
    }

    pub fn with_realpath(mut self, realpath: Rc<dyn Realpath>) -> Self {
        self.realpath = Some(realpath);
        self
    }

    pub fn with_environment(mut self, environment: Rc<dyn Environment>) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_hasher(mut self, hasher: Rc<dyn Hasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn with_screen(mut self, screen: Rc<dyn Screen>) -> Self {
        self.screen = Some(screen);
        self
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_watch_file(mut self, watch_file: Rc<dyn WatchFile>) -> Self {
        self.watch_file = Some(watch_file);
        self
    }

    pub fn with_watch_directory(mut self, watch_directory: Rc<dyn WatchDirectory>) -> Self {
        self.watch_directory = Some(watch_directory);
        self
    }

    pub fn with_timers(mut self, timers: Rc<dyn Timers>) -> Self {
        self.timers = Some(timers);
        self
    }

    pub fn new_line_str(&self) -> &'static str {
        self.new_line.as_str()
    }

    pub fn write(&self, text: &str) {
        self.output.write(text);
    }

    /// Write `text` followed by the system line terminator.
    pub fn write_line(&self, text: &str) {
        self.output.write(&format!("{}{}", text, self.new_line_str()));
    }

    pub fn current_directory(&self) -> String {
        self.working_directory.current_directory()
    }
}
