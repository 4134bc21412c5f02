//! Command implementations.

pub mod watch;
