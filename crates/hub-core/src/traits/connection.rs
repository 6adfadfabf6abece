//! Connection capability (port)
//!
//! The transport layer owns connections; the lifetime core only stores shared
//! references and hands invocations to them.

use std::sync::Arc;

use crate::error::DeliveryError;
use crate::value_objects::{ConnectionId, Invocation};

/// A single attached client connection
///
/// Implementations must make `send_invocation` a non-blocking hand-off:
/// queue the invocation for the peer and return. Fan-out calls this once per
/// recipient, so a blocking implementation would let one slow peer delay the
/// others. Sending to a torn-down peer must fail with
/// [`DeliveryError::Closed`], never panic.
pub trait HubConnection: Send + Sync {
    /// Process-unique identifier of this connection
    fn connection_id(&self) -> &ConnectionId;

    /// Queue an invocation for delivery to the remote peer
    fn send_invocation(&self, invocation: Arc<Invocation>) -> Result<(), DeliveryError>;

    /// Whether the peer has gone away
    fn is_closed(&self) -> bool {
        false
    }
}

/// Shared handle to a connection, as stored by registries
pub type SharedConnection = Arc<dyn HubConnection>;
