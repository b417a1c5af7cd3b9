//! Bounded rolling window of recent readings.
//!
//! The window keeps the last N readings in arrival order for trend delta
//! computation. Pushing is always accepted; the oldest entry is evicted
//! once capacity is reached.

use std::collections::VecDeque;

use riskwatch_types::Reading;

/// Default window capacity (entries).
pub const DEFAULT_WINDOW_CAPACITY: usize = 20;

/// Fixed-capacity FIFO buffer of recent readings.
///
/// Insertion order is significant: [`snapshot`](Self::snapshot) returns
/// entries oldest first, most-recent last.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    buf: VecDeque<Reading>,
    capacity: usize,
}

impl RollingWindow {
    /// Create a window with the given capacity. A capacity of zero is
    /// clamped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of readings currently held.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the window holds no readings.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Push a reading, evicting the oldest entry on overflow.
    pub fn push(&mut self, reading: Reading) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(reading);
    }

    /// The most recent reading, if any.
    pub fn latest(&self) -> Option<&Reading> {
        self.buf.back()
    }

    /// Ordered copy of the window contents, most-recent last.
    pub fn snapshot(&self) -> Vec<Reading> {
        self.buf.iter().copied().collect()
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reading(co2: u16) -> Reading {
        Reading::builder().co2(co2).build()
    }

    #[test]
    fn push_and_snapshot_preserve_order() {
        let mut window = RollingWindow::new(5);
        for co2 in [400, 420, 440] {
            window.push(reading(co2));
        }
        let snap = window.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap[0].co2, 400);
        assert_eq!(snap[2].co2, 440);
        assert_eq!(window.latest().unwrap().co2, 440);
    }

    #[test]
    fn overflow_evicts_oldest() {
        let mut window = RollingWindow::new(3);
        for co2 in [1, 2, 3, 4, 5] {
            window.push(reading(co2));
        }
        let snap = window.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.iter().map(|r| r.co2).collect::<Vec<_>>(), [3, 4, 5]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut window = RollingWindow::new(0);
        assert_eq!(window.capacity(), 1);
        window.push(reading(400));
        window.push(reading(500));
        assert_eq!(window.len(), 1);
        assert_eq!(window.latest().unwrap().co2, 500);
    }

    #[test]
    fn default_capacity() {
        let window = RollingWindow::default();
        assert_eq!(window.capacity(), DEFAULT_WINDOW_CAPACITY);
        assert!(window.is_empty());
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity(capacity in 1usize..32, count in 0usize..100) {
            let mut window = RollingWindow::new(capacity);
            for i in 0..count {
                window.push(reading(i as u16));
            }
            prop_assert!(window.len() <= capacity);
            prop_assert_eq!(window.len(), count.min(capacity));

            // The retained entries are exactly the last `len` pushes, in order.
            let snap = window.snapshot();
            let first = count - snap.len();
            for (offset, r) in snap.iter().enumerate() {
                prop_assert_eq!(r.co2, (first + offset) as u16);
            }
        }
    }
}
