//! Watch mode
//!
//! A watch session builds once, then rebuilds whenever an input changes:
//!
//! - [`WatchCompilerHost`] - program host, watch host and reporters for a session
//! - [`WatchDriver`] - initial build, watches, debounced rebuilds
//! - [`ContentCache`] - filters saves that leave a file unchanged
//! - [`WatchEvent`] - session milestones for machine-readable output

mod cache;
mod compiler_host;
mod driver;
mod event;

#[cfg(test)]
mod tests;

pub use cache::ContentCache;
pub use compiler_host::{WatchCompilerHost, WatchInput};
pub use driver::{WatchDriver, WatchObserver};
pub use event::WatchEvent;
