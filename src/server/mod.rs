//! TCP accept loop and per-connection task dispatch.

pub mod listener;

pub use listener::{Server, ShutdownHandle};
