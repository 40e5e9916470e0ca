//! Ring Buffer Implementation

use std::collections::VecDeque;

/// Default window capacity (10 frames)
pub const DEFAULT_CAPACITY: usize = 10;

/// Fixed-capacity FIFO window
///
/// Holds at most `capacity` samples; a push into a full window drops the
/// oldest one first.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Stored samples, oldest at the front
    data: VecDeque<T>,
    /// Maximum number of samples kept
    capacity: usize,
    /// Total samples ever pushed (for statistics)
    total_written: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with given capacity (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
            total_written: 0,
        }
    }

    /// Push a sample, evicting the oldest one if the window is full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.data.len() >= self.capacity {
            self.data.pop_front()
        } else {
            None
        };
        self.data.push_back(item);
        self.total_written += 1;
        evicted
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Get total samples written (for statistics)
    pub fn total_written(&self) -> usize {
        self.total_written
    }
}

impl RingBuffer<f64> {
    /// Arithmetic mean of the window, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        if self.data.is_empty() {
            return None;
        }
        Some(self.data.iter().sum::<f64>() / self.data.len() as f64)
    }

    /// Median of the window, `None` when empty
    ///
    /// Even-sized windows average the two middle samples.
    pub fn median(&self) -> Option<f64> {
        if self.data.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = self.data.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_and_read() {
        let mut buffer = RingBuffer::new(10);

        for i in 0..5 {
            buffer.push(i as f64 * 100.0);
        }

        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.iter().next(), Some(&0.0));
        assert_eq!(buffer.iter().last(), Some(&400.0));
    }

    #[test]
    fn test_overwrite_oldest() {
        let mut buffer = RingBuffer::new(5);

        for i in 0..10 {
            buffer.push(i);
        }

        assert_eq!(buffer.len(), buffer.capacity());
        let held: Vec<i32> = buffer.iter().copied().collect();
        assert_eq!(held, vec![5, 6, 7, 8, 9]);
        assert_eq!(buffer.total_written(), 10);
    }

    #[test]
    fn test_push_reports_eviction() {
        let mut buffer = RingBuffer::new(2);
        assert_eq!(buffer.push(1), None);
        assert_eq!(buffer.push(2), None);
        assert_eq!(buffer.push(3), Some(1));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut buffer = RingBuffer::new(0);
        buffer.push(1.0);
        buffer.push(2.0);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.mean(), Some(2.0));
    }

    #[test]
    fn test_statistics_on_partial_window() {
        let mut buffer = RingBuffer::new(DEFAULT_CAPACITY);
        assert_eq!(buffer.mean(), None);
        assert_eq!(buffer.median(), None);

        buffer.push(3.0);
        assert_eq!(buffer.median(), Some(3.0));

        buffer.push(1.0);
        assert_eq!(buffer.median(), Some(2.0));
        assert_eq!(buffer.mean(), Some(2.0));
    }

    #[test]
    fn test_median_rejects_single_spike() {
        let mut buffer = RingBuffer::new(5);
        for v in [10.0, 11.0, 10.0, 100.0, 10.0] {
            buffer.push(v);
        }
        assert_eq!(buffer.median(), Some(10.0));
        assert!(buffer.mean().unwrap() > 20.0);
    }

    proptest! {
        #[test]
        fn prop_len_never_exceeds_capacity(cap in 1usize..32, values in prop::collection::vec(-1e6f64..1e6, 0..100)) {
            let mut buffer = RingBuffer::new(cap);
            for v in &values {
                buffer.push(*v);
                prop_assert!(buffer.len() <= cap);
            }
            prop_assert_eq!(buffer.len(), values.len().min(cap));
        }

        #[test]
        fn prop_median_and_mean_within_bounds(values in prop::collection::vec(-180f64..180.0, 1..10)) {
            let mut buffer = RingBuffer::new(DEFAULT_CAPACITY);
            for v in &values {
                buffer.push(*v);
            }
            let min = values.iter().cloned().fold(f64::MAX, f64::min);
            let max = values.iter().cloned().fold(f64::MIN, f64::max);
            let median = buffer.median().unwrap();
            let mean = buffer.mean().unwrap();
            prop_assert!(median >= min && median <= max);
            prop_assert!(mean >= min - 1e-9 && mean <= max + 1e-9);
        }
    }
}
