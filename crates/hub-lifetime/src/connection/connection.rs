//! Channel-backed hub connection
//!
//! The transport owns the receiving half and drains it into the socket; the
//! lifetime core only sees the `HubConnection` side.

use hub_core::{ConnectionId, DeliveryError, HubConnection, Invocation};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// A connection whose outbound invocations are queued on a bounded channel
pub struct ChannelConnection {
    /// Unique connection ID
    connection_id: ConnectionId,

    /// Queue drained by the transport's writer task
    sender: mpsc::Sender<Arc<Invocation>>,

    /// Invocations accepted so far
    sent: AtomicU64,

    /// Invocations refused (queue full or closed)
    dropped: AtomicU64,

    /// Connection creation time
    created_at: Instant,
}

impl ChannelConnection {
    /// Wrap an existing sender
    pub fn new(connection_id: ConnectionId, sender: mpsc::Sender<Arc<Invocation>>) -> Arc<Self> {
        Arc::new(Self {
            connection_id,
            sender,
            sent: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            created_at: Instant::now(),
        })
    }

    /// Create a connection together with the receiving half of its queue
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn channel(
        connection_id: ConnectionId,
        capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<Arc<Invocation>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(connection_id, tx), rx)
    }

    /// Number of invocations handed to the queue
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    /// Number of invocations refused
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Get connection age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl HubConnection for ChannelConnection {
    fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    fn send_invocation(&self, invocation: Arc<Invocation>) -> Result<(), DeliveryError> {
        match self.sender.try_send(invocation) {
            Ok(()) => {
                self.sent.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(match e {
                    mpsc::error::TrySendError::Full(_) => DeliveryError::Full,
                    mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
                })
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for ChannelConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConnection")
            .field("connection_id", &self.connection_id)
            .field("sent", &self.sent.load(Ordering::Relaxed))
            .field("dropped", &self.dropped.load(Ordering::Relaxed))
            .field("created_at", &self.created_at)
            .finish()
    }
}
