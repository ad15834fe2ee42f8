//! Domain Layer
//!
//! The compiler-facing model of kiln without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Diagnostics, source files, inclusion provenance, emit results
//! - `value_objects/` - Messages, paths, hashes, compiler options
//! - `services/` - The source scanner
//! - `ports/` - Capability traits implemented by infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system directly
//! 2. **Capabilities, not hosts** - Each host operation is its own trait so a
//!    missing one can be replaced by a no-op
//! 3. **Single-threaded** - Handles are `Rc`, mutable state is `RefCell`

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
