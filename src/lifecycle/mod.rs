//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build cache → Start watcher → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → server drains, watcher exits
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then cache and watcher, then listener
//! - A watcher that cannot start is fatal; the listener never binds
//! - One broadcast channel reaches every long-running task

pub mod shutdown;

pub use shutdown::Shutdown;
