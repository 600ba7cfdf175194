// ============================================================================
// SCAN BUFFER
// ============================================================================

use crate::geometry::Point;

/// Sliding window over the latest `capacity` points, in arrival order.
///
/// Storage is allocated once; when full each push overwrites the oldest slot.
#[derive(Debug, Clone)]
pub struct ScanBuffer {
    points: Vec<Point>,
    capacity: usize,
    /// Slot the next push writes to once the buffer is full (also the oldest point)
    head: usize,
}

impl ScanBuffer {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.points.len() == self.capacity
    }

    /// Append a point, evicting the oldest one if the buffer is full.
    pub fn push(&mut self, point: Point) {
        if self.points.len() < self.capacity {
            self.points.push(point);
        } else {
            self.points[self.head] = point;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.head = 0;
    }

    /// Read-only view of the window, oldest to newest.
    pub fn snapshot(&self) -> Snapshot<'_> {
        let (newer, older) = self.points.split_at(self.head);
        Snapshot { older, newer }
    }
}

/// Borrowed, ordered view of a [`ScanBuffer`] (oldest first).
///
/// The ring is stored as two contiguous runs; iteration walks `older` then `newer`.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    older: &'a [Point],
    newer: &'a [Point],
}

impl<'a> Snapshot<'a> {
    pub fn len(&self) -> usize {
        self.older.len() + self.newer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a Point> + Clone + 'a {
        self.older.iter().chain(self.newer.iter())
    }

    pub fn newest(&self) -> Option<&'a Point> {
        self.newer.last().or_else(|| self.older.last())
    }

    pub fn oldest(&self) -> Option<&'a Point> {
        self.older.first().or_else(|| self.newer.first())
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.iter().copied().collect()
    }
}

impl<'a> From<&'a [Point]> for Snapshot<'a> {
    fn from(points: &'a [Point]) -> Self {
        Snapshot {
            older: points,
            newer: &[],
        }
    }
}

impl<'a> IntoIterator for Snapshot<'a> {
    type Item = &'a Point;
    type IntoIter = std::iter::Chain<std::slice::Iter<'a, Point>, std::slice::Iter<'a, Point>>;

    fn into_iter(self) -> Self::IntoIter {
        self.older.iter().chain(self.newer.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: usize) -> Point {
        Point::new(i as f64, -(i as f64))
    }

    #[test]
    fn fills_in_arrival_order() {
        let mut buffer = ScanBuffer::new(4);
        for i in 0..3 {
            buffer.push(p(i));
        }
        assert_eq!(buffer.len(), 3);
        assert!(!buffer.is_full());
        assert_eq!(buffer.snapshot().to_vec(), vec![p(0), p(1), p(2)]);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let capacity = 5;
        let extra = 7;
        let mut buffer = ScanBuffer::new(capacity);
        for i in 0..capacity + extra {
            buffer.push(p(i));
        }
        assert_eq!(buffer.len(), capacity);
        let expected: Vec<Point> = (extra..capacity + extra).map(p).collect();
        assert_eq!(buffer.snapshot().to_vec(), expected);
        assert_eq!(buffer.snapshot().oldest(), Some(&p(extra)));
        assert_eq!(buffer.snapshot().newest(), Some(&p(capacity + extra - 1)));
    }

    #[test]
    fn wraps_exactly_at_capacity() {
        let mut buffer = ScanBuffer::new(3);
        for i in 0..6 {
            buffer.push(p(i));
        }
        // head is back at slot 0, so the whole window is one run
        assert_eq!(buffer.snapshot().to_vec(), vec![p(3), p(4), p(5)]);
    }

    #[test]
    fn single_slot_buffer_keeps_newest() {
        let mut buffer = ScanBuffer::new(1);
        buffer.push(p(1));
        buffer.push(p(2));
        assert_eq!(buffer.snapshot().to_vec(), vec![p(2)]);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut buffer = ScanBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.push(p(9));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn empty_snapshot() {
        let buffer = ScanBuffer::new(8);
        let snapshot = buffer.snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.newest(), None);
        assert_eq!(snapshot.oldest(), None);
        assert_eq!(snapshot.iter().count(), 0);
    }

    #[test]
    fn snapshot_is_repeatable() {
        let mut buffer = ScanBuffer::new(3);
        for i in 0..5 {
            buffer.push(p(i));
        }
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.to_vec(), snapshot.to_vec());
        assert_eq!(snapshot.iter().rev().next(), Some(&p(4)));
    }

    #[test]
    fn clear_resets_window() {
        let mut buffer = ScanBuffer::new(2);
        for i in 0..5 {
            buffer.push(p(i));
        }
        buffer.clear();
        assert!(buffer.is_empty());
        buffer.push(p(7));
        assert_eq!(buffer.snapshot().to_vec(), vec![p(7)]);
    }
}
