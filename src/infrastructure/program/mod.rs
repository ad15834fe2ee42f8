//! Bundled program backend
//!
//! A file-system program that resolves imports and reference directives,
//! reports what a single scan can detect, and writes its inputs to the
//! output layout. It is what `kiln build` and `kiln watch` compile with.

mod builder;
mod emitter;
mod fs_program;
mod resolver;

pub use fs_program::{FsProgram, FsProgramFactory};
pub use resolver::LIB_DIR_ENV;
