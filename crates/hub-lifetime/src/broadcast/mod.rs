//! Invocation broadcasting
//!
//! Distributes invocations from the lifetime manager to connections.

mod dispatcher;

pub use dispatcher::{fan_out, FanOutReport};
