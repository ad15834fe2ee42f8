//! The local process as a [`System`]
//!
//! Standard output, the process working directory and environment, the local
//! disk, SHA-256 content hashes and a crossterm screen. No clock is injected,
//! so status times are local wall time. Watch capabilities are added by the
//! caller when it runs an event loop.

use std::io::Write;
use std::rc::Rc;

use crossterm::{cursor, execute, terminal};

use crate::domain::ports::{Environment, Hasher, Output, Screen, System};
use crate::domain::value_objects::{ContentHash, NewLineKind};

use super::fs::{to_file_name, LocalFs};

struct Stdout;

impl Output for Stdout {
    fn write(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            log::warn!("failed to write to stdout: {e}");
        }
    }
}

struct TerminalScreen;

impl Screen for TerminalScreen {
    fn clear_screen(&self) {
        if let Err(e) = execute!(
            std::io::stdout(),
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        ) {
            log::debug!("could not clear the screen: {e}");
        }
    }
}

struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn get_environment_variable(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn create_hash(&self, data: &str) -> String {
        ContentHash::from_content(data).hex().to_string()
    }
}

fn current_directory() -> String {
    match std::env::current_dir() {
        Ok(dir) => to_file_name(&dir),
        Err(e) => {
            log::warn!("cannot read the working directory: {e}");
            ".".to_string()
        }
    }
}

/// Whether file names on this platform compare case-sensitively.
pub fn platform_is_case_sensitive() -> bool {
    !(cfg!(windows) || cfg!(target_os = "macos"))
}

/// The local process without watch capabilities.
pub fn local_system() -> System {
    let fs = Rc::new(LocalFs::new());
    System::new(Rc::new(Stdout), Rc::new(current_directory))
        .with_new_line(NewLineKind::platform())
        .with_case_sensitive_file_names(platform_is_case_sensitive())
        .with_reader(fs.clone())
        .with_writer(fs.clone())
        .with_directories(fs.clone())
        .with_realpath(fs)
        .with_environment(Rc::new(ProcessEnvironment))
        .with_hasher(Rc::new(Sha256Hasher))
        .with_screen(Rc::new(TerminalScreen))
}
