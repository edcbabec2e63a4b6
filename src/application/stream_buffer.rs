// Bounded streaming buffer - bound-and-trim FIFO of data points
use crate::domain::metric::DataPoint;
use std::collections::VecDeque;

/// Default number of retained points.
pub const MAX_POINTS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct StreamBuffer {
    points: VecDeque<DataPoint>,
    capacity: usize,
    total_appended: u64,
    total_evicted: u64,
}

impl StreamBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            total_appended: 0,
            total_evicted: 0,
        }
    }

    /// Create a buffer seeded with an initial snapshot (already trimmed to capacity).
    pub fn with_snapshot(capacity: usize, initial: Vec<DataPoint>) -> Self {
        let mut buffer = Self::new(capacity);
        buffer.append(initial);
        buffer
    }

    /// Append to the tail, evicting the oldest points beyond capacity.
    pub fn append(&mut self, points: Vec<DataPoint>) {
        self.total_appended += points.len() as u64;
        self.points.extend(points);

        let excess = self.points.len().saturating_sub(self.capacity);
        if excess > 0 {
            self.points.drain(..excess);
            self.total_evicted += excess as u64;
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    pub fn total_evicted(&self) -> u64 {
        self.total_evicted
    }

    /// Ordered copy of everything retained, oldest first.
    pub fn snapshot(&self) -> Vec<DataPoint> {
        self.points.iter().cloned().collect()
    }

    /// The most recent `n` points, oldest first.
    pub fn latest(&self, n: usize) -> Vec<DataPoint> {
        let skip = self.points.len().saturating_sub(n);
        self.points.iter().skip(skip).cloned().collect()
    }
}

impl Default for StreamBuffer {
    fn default() -> Self {
        Self::new(MAX_POINTS)
    }
}
