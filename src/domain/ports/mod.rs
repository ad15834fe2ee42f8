//! Domain Ports (Interfaces)
//!
//! Capability traits the driver consumes. Infrastructure provides the local
//! implementations; tests provide in-memory ones.

pub mod cancellation;
pub mod file_system;
pub mod program;
pub mod system;
pub mod watch;

pub use cancellation::{is_cancelled, CancellationToken};
pub use file_system::{DirectoryReader, FileReader, FileWriter, FsError, FsResult, Realpath};
pub use program::{
    CompilerHost, CustomTransformers, EmitRequest, Program, ProgramFactory, ProgramInput,
    ProjectReference, Transformer, WriteFileCallback,
};
pub use system::{Clock, Environment, Hasher, Output, Screen, System, Tracer, WorkingDirectory};
pub use watch::{
    DirectoryWatcherCallback, FileWatcher, FileWatcherCallback, FileWatcherEventKind,
    NoopFileWatcher, TimerId, Timers, WatchDirectory, WatchFile,
};
