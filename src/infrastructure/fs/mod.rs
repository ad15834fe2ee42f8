//! File System Implementations
//!
//! The local disk behind the file system ports.

mod local;

pub use local::{to_file_name, LocalFs};
