//! Local watch capabilities
//!
//! A single-threaded event loop over `notify` that provides file watches,
//! directory watches and timers to a watch session.

mod event_loop;

pub use event_loop::EventLoop;
