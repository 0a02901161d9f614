//! Fixed-capacity response history
//!
//! Indices are slot numbers, not ages: after the buffer wraps, `get(i)`
//! returns whatever record most recently landed on slot `i`. The shell
//! advertises each response under the slot number it was stored at
//! (`r0`..`r9`), so slot identity is exactly what users see and type back.

use thiserror::Error;

/// Access to a slot that has never been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("uninitialized history access at index {0}")]
pub struct UninitializedAccess(pub usize);

/// Not threadsafe; single owner by design.
#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    cursor: Option<usize>,
    written: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be positive");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            cursor: None,
            written: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of distinct slots ever written, capped at capacity.
    pub fn initialized_len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Slot index of the most recent push, or `None` if nothing was pushed.
    pub fn index(&self) -> Option<usize> {
        self.cursor
    }

    /// The most recently pushed element, if any.
    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|i| self.slots[i].as_ref())
    }

    pub fn readable_index(&self, i: usize) -> bool {
        i < self.written
    }

    pub fn get(&self, i: usize) -> Result<&T, UninitializedAccess> {
        if !self.readable_index(i) {
            return Err(UninitializedAccess(i));
        }
        self.slots[i].as_ref().ok_or(UninitializedAccess(i))
    }

    pub fn push(&mut self, elem: T) {
        let next = match self.cursor {
            None => 0,
            Some(i) if i + 1 == self.slots.len() => 0,
            Some(i) => i + 1,
        };
        self.slots[next] = Some(elem);
        self.cursor = Some(next);
        if self.written < next + 1 {
            self.written = next + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer() {
        let buf: RingBuffer<i32> = RingBuffer::new(3);
        assert!(buf.is_empty());
        assert_eq!(buf.index(), None);
        assert_eq!(buf.current(), None);
        assert!(!buf.readable_index(0));
        assert_eq!(buf.get(0), Err(UninitializedAccess(0)));
    }

    #[test]
    fn test_push_and_current() {
        let mut buf = RingBuffer::new(3);
        buf.push("a");
        assert_eq!(buf.current(), Some(&"a"));
        assert_eq!(buf.index(), Some(0));
        buf.push("b");
        assert_eq!(buf.current(), Some(&"b"));
        assert_eq!(buf.index(), Some(1));
    }

    #[test]
    fn test_readable_tracks_slots_touched() {
        let mut buf = RingBuffer::new(3);
        buf.push(1);
        buf.push(2);
        assert!(buf.readable_index(0));
        assert!(buf.readable_index(1));
        assert!(!buf.readable_index(2));
        assert_eq!(buf.initialized_len(), 2);
    }

    #[test]
    fn test_wraparound_keeps_slot_identity() {
        let mut buf = RingBuffer::new(3);
        for n in 1..=5 {
            buf.push(n);
        }
        // pushes landed on slots 0,1,2,0,1 - slot 0 now holds the 4th push
        assert_eq!(buf.get(0), Ok(&4));
        assert_eq!(buf.get(1), Ok(&5));
        assert_eq!(buf.get(2), Ok(&3));
        assert_eq!(buf.current(), Some(&5));
        assert_eq!(buf.index(), Some(1));
        assert_eq!(buf.initialized_len(), 3);
    }

    #[test]
    fn test_index_beyond_capacity_never_readable() {
        let mut buf = RingBuffer::new(3);
        for n in 0..10 {
            buf.push(n);
        }
        assert_eq!(buf.get(5), Err(UninitializedAccess(5)));
        assert!(!buf.readable_index(3));
    }

    #[test]
    fn test_cursor_wraps_to_zero() {
        let mut buf = RingBuffer::new(2);
        buf.push("a");
        buf.push("b");
        buf.push("c");
        assert_eq!(buf.index(), Some(0));
        assert_eq!(buf.get(0), Ok(&"c"));
        assert_eq!(buf.get(1), Ok(&"b"));
    }
}
