//! Delivery errors - reasons a connection refused an invocation hand-off

use thiserror::Error;

/// Why a connection could not accept an invocation
///
/// Lifetime managers swallow these; they exist so that a manager can log the
/// failure and, when configured, evict closed members from groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Connection is closed")]
    Closed,

    #[error("Connection send buffer is full")]
    Full,
}

impl DeliveryError {
    /// Whether the peer is gone for good
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
