//! Cross-context change notification.
//!
//! Every execution context in one process family attaches to the same
//! [`ChangeBus`]. Publishing is fire-and-forget with no acknowledgment
//! and no ordering guarantee across rapid writes; the payload is
//! advisory, and the prescribed reaction to any notice is a full reload
//! from the durable store.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

const BUS_CAPACITY: usize = 64;

static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

/// Process-family-unique tag for one execution context.
pub(crate) fn next_origin() -> u64 {
    NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed)
}

/// Notification that a durable key was rewritten in some context.
#[derive(Debug, Clone)]
pub struct ChangeNotice {
    /// The durable key that changed.
    pub key: String,
    /// The new serialized value. Advisory only: consumers reload from
    /// the durable store instead of trusting this copy.
    pub payload: String,
    pub(crate) origin: u64,
}

/// Broadcast channel shared by every context of one process family.
pub struct ChangeBus {
    tx: broadcast::Sender<ChangeNotice>,
}

impl ChangeBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        ChangeBus { tx }
    }

    /// Fire-and-forget publish. An error only means no context is
    /// currently listening, which is fine.
    pub(crate) fn publish(&self, notice: ChangeNotice) {
        let _ = self.tx.send(notice);
    }

    pub(crate) fn subscribe(&self, origin: u64) -> ChangeFeed {
        ChangeFeed {
            rx: self.tx.subscribe(),
            origin,
        }
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        ChangeBus::new()
    }
}

/// Notices published by *other* contexts on the same bus.
///
/// A context never observes its own broadcasts, matching the way
/// browser storage events skip the originating tab.
pub struct ChangeFeed {
    rx: broadcast::Receiver<ChangeNotice>,
    origin: u64,
}

impl ChangeFeed {
    /// Wait for the next external change. Returns `None` once the bus
    /// is gone.
    pub async fn next(&mut self) -> Option<ChangeNotice> {
        loop {
            match self.rx.recv().await {
                Ok(notice) if notice.origin == self.origin => continue,
                Ok(notice) => return Some(notice),
                // A lagged feed only needs to know *something* changed;
                // the reload reads the latest durable value anyway
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`next`](ChangeFeed::next). Returns
    /// `None` when no external change is queued.
    pub fn try_next(&mut self) -> Option<ChangeNotice> {
        loop {
            match self.rx.try_recv() {
                Ok(notice) if notice.origin == self.origin => continue,
                Ok(notice) => return Some(notice),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
