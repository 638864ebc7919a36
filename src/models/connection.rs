//! Live observer handle

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Frames buffered per observer before it counts as unreachable
pub const OUTBOX_CAPACITY: usize = 32;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Monotonic identifier for one observer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Why a send to an observer failed.
#[derive(Debug, thiserror::Error)]
pub enum SendFailure {
    #[error("observer channel closed")]
    Closed,
    #[error("observer outbox full")]
    Backlogged,
}

/// Handle to one connected observer.
///
/// The registry holds the sending side; the WebSocket session task owns
/// the receiving side and the underlying socket. Dropping the receiver
/// makes every later send fail with [`SendFailure::Closed`].
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    outbox: mpsc::Sender<String>,
}

impl Connection {
    /// Create a connection with a bounded outbox, returning the drain side.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        let id = ConnectionId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
        (Self { id, outbox: tx }, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Non-blocking send of one serialized frame.
    pub fn send(&self, payload: String) -> Result<(), SendFailure> {
        self.outbox.try_send(payload).map_err(|e| match e {
            TrySendError::Closed(_) => SendFailure::Closed,
            TrySendError::Full(_) => SendFailure::Backlogged,
        })
    }
}
