//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Local file system (reader, writer, directory listing, realpath)
//! - `system` - Process-level capabilities assembled into a `System`
//! - `watch/` - notify-backed event loop with file, directory and timer watches
//! - `program/` - Bundled file-system program backend

pub mod fs;
pub mod program;
pub mod system;
pub mod watch;

pub use fs::LocalFs;
pub use program::{FsProgram, FsProgramFactory};
pub use system::{local_system, platform_is_case_sensitive};
pub use watch::EventLoop;
