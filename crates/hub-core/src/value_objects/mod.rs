//! Value objects - immutable types that represent hub concepts

mod connection_id;
mod invocation;

pub use connection_id::ConnectionId;
pub use invocation::Invocation;
