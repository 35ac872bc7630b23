//! Timer notification queue
//!
//! The alarm interrupt only records that the deadline passed; the duty
//! scheduler runs in the single task that consumes this queue. The queue is a
//! pending count rather than a flag so back-to-back notifications are never
//! merged: every recorded notification is handed out exactly once.

use portable_atomic::{AtomicU32, Ordering};

/// Single-producer (interrupt), single-consumer (scheduler task) counter of
/// undelivered timer notifications
#[derive(Debug)]
pub struct ExpiryQueue {
    pending: AtomicU32,
}

impl ExpiryQueue {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
        }
    }

    /// Records one notification. Safe to call from interrupt context.
    pub fn notify(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    /// Removes and returns every pending notification.
    pub fn take(&self) -> u32 {
        self.pending.swap(0, Ordering::AcqRel)
    }

    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for ExpiryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_accumulate() {
        let queue = ExpiryQueue::new();
        assert_eq!(queue.take(), 0);

        queue.notify();
        queue.notify();
        queue.notify();
        assert_eq!(queue.pending(), 3);
        assert_eq!(queue.take(), 3);
        assert_eq!(queue.take(), 0);
    }
}
