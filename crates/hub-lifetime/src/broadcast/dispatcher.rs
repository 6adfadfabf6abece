//! Invocation fan-out
//!
//! Hands one shared invocation to each recipient of a snapshot. Recipients
//! are visited after every registry lock has been released, and each hand-off
//! is a non-blocking queue push, so one slow peer cannot delay the others.

use hub_core::{DeliveryError, Invocation, SharedConnection};
use std::sync::Arc;

/// Outcome of a single fan-out
///
/// Kept for logging and cleanup; never surfaced to `invoke_*` callers.
#[derive(Default)]
pub struct FanOutReport {
    /// Recipients that accepted the invocation
    pub sent: usize,
    /// Recipients skipped by exclusion
    pub skipped: usize,
    /// Recipients whose queue was full
    pub full: usize,
    /// Recipients whose peer had gone away
    pub closed: Vec<SharedConnection>,
}

impl FanOutReport {
    /// Total refused hand-offs
    pub fn failed(&self) -> usize {
        self.full + self.closed.len()
    }
}

impl std::fmt::Debug for FanOutReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanOutReport")
            .field("sent", &self.sent)
            .field("skipped", &self.skipped)
            .field("full", &self.full)
            .field("closed", &self.closed.len())
            .finish()
    }
}

/// Deliver `invocation` to every recipient whose ID is not in `excluded`
pub fn fan_out<I>(recipients: I, invocation: &Arc<Invocation>, excluded: &[&str]) -> FanOutReport
where
    I: IntoIterator<Item = SharedConnection>,
{
    let mut report = FanOutReport::default();

    for connection in recipients {
        let connection_id = connection.connection_id().as_str();
        if excluded.iter().any(|id| *id == connection_id) {
            report.skipped += 1;
            continue;
        }

        match connection.send_invocation(Arc::clone(invocation)) {
            Ok(()) => report.sent += 1,
            Err(DeliveryError::Full) => {
                tracing::debug!(
                    connection_id = %connection.connection_id(),
                    target = %invocation.target,
                    "Dropped invocation, send buffer full"
                );
                report.full += 1;
            }
            Err(DeliveryError::Closed) => {
                tracing::trace!(
                    connection_id = %connection.connection_id(),
                    target = %invocation.target,
                    "Skipped invocation to closed connection"
                );
                report.closed.push(connection);
            }
        }
    }

    report
}
