//! Typed min-heap

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Min-heap over any ordered type.
///
/// `BinaryHeap` is a max-heap; entries are wrapped in `Reverse` for min-heap
/// behavior.
#[derive(Debug)]
pub struct MinHeap<T: Ord> {
    heap: BinaryHeap<Reverse<T>>,
}

impl<T: Ord> MinHeap<T> {
    /// Create an empty heap
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    /// Add a value
    pub fn push(&mut self, value: T) {
        self.heap.push(Reverse(value));
    }

    /// Remove and return the minimum value
    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|Reverse(value)| value)
    }

    /// Number of values held
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the heap is empty
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T: Ord> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_returns_minimum() {
        let mut heap = MinHeap::new();
        heap.push(5u64);
        heap.push(1);
        heap.push(3);

        assert_eq!(heap.pop(), Some(1));
        assert_eq!(heap.pop(), Some(3));
        assert_eq!(heap.pop(), Some(5));
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn test_pop_empty() {
        let mut heap: MinHeap<u64> = MinHeap::new();
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn test_len_and_is_empty() {
        let mut heap = MinHeap::new();
        assert!(heap.is_empty());

        heap.push(7u64);
        heap.push(2);
        assert_eq!(heap.len(), 2);
        assert!(!heap.is_empty());

        heap.pop();
        heap.pop();
        assert!(heap.is_empty());
    }

    #[test]
    fn test_interleaved_push_pop() {
        let mut heap = MinHeap::new();
        heap.push(10u64);
        heap.push(4);
        assert_eq!(heap.pop(), Some(4));

        heap.push(1);
        heap.push(7);
        assert_eq!(heap.pop(), Some(1));
        assert_eq!(heap.pop(), Some(7));
        assert_eq!(heap.pop(), Some(10));
    }

    #[test]
    fn test_duplicates_pop_individually() {
        let mut heap = MinHeap::new();
        heap.push(2u64);
        heap.push(2);
        heap.push(1);

        assert_eq!(heap.pop(), Some(1));
        assert_eq!(heap.pop(), Some(2));
        assert_eq!(heap.pop(), Some(2));
        assert_eq!(heap.pop(), None);
    }
}
