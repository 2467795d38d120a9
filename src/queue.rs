//! Fixed-capacity FIFO of `Copy` values over caller-supplied storage.
//!
//! # Overview
//! - Storage is any `S: AsRef<[T]> + AsMut<[T]>`: an owned array moved in, or a borrowed
//!   `&mut [T]` that must outlive the queue.
//! - One slot is kept free so that `head == tail` always means empty. A storage of `N` slots
//!   holds at most `N - 1` values; no element counter is stored.
//! - Nothing allocates, nothing blocks. `remove` is `O(size())`, everything else is `O(1)`.
//!
//! # Errors and panics
//! Running out of room or data is reported through the return value. Indexing past
//! `size()` is a caller bug and panics.

use core::marker::PhantomData;
use core::ops::{Index, IndexMut};

/// Fixed-capacity FIFO.
///
/// ```
/// use ph_fifo::FixedQueue;
///
/// let mut q = FixedQueue::new([0u8; 4]);
/// assert_eq!(q.capacity(), 3);
/// assert!(q.push(1).is_ok());
/// assert_eq!(q.pop(), Some(1));
/// ```
pub struct FixedQueue<T: Copy, S: AsRef<[T]> + AsMut<[T]>> {
    storage: S,
    head: usize,
    tail: usize,
    _marker: PhantomData<T>,
}

impl<T: Copy, S: AsRef<[T]> + AsMut<[T]>> FixedQueue<T, S> {
    /// Build an empty queue over `storage`. Usable capacity is `storage.len() - 1`.
    ///
    /// # Panics
    /// Panics if `storage` has fewer than 2 slots.
    pub fn new(storage: S) -> Self {
        assert!(
            storage.as_ref().len() >= 2,
            "FixedQueue storage needs at least 2 slots"
        );
        Self {
            storage,
            head: 0,
            tail: 0,
            _marker: PhantomData,
        }
    }

    #[inline(always)]
    fn slots(&self) -> usize {
        self.storage.as_ref().len()
    }

    #[inline(always)]
    fn wrap(&self, idx: usize) -> usize {
        idx % self.slots()
    }

    /// Maximum number of values the queue can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots() - 1
    }

    /// Number of stored values.
    #[inline]
    pub fn size(&self) -> usize {
        (self.tail + self.slots() - self.head) % self.slots()
    }

    #[inline]
    pub fn available_capacity(&self) -> usize {
        self.capacity() - self.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.size() == self.capacity()
    }

    /// Append `value`. Hands the value back if the queue is full.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        let tail = self.tail;
        self.storage.as_mut()[tail] = value;
        self.tail = self.wrap(tail + 1);
        Ok(())
    }

    /// Remove and return the oldest value.
    pub fn pop(&mut self) -> Option<T> {
        let v = self.peek()?;
        self.head = self.wrap(self.head + 1);
        Some(v)
    }

    /// Remove and return the oldest value.
    ///
    /// # Panics
    /// Panics if the queue is empty.
    #[track_caller]
    pub fn take(&mut self) -> T {
        match self.pop() {
            Some(v) => v,
            None => panic!("take() on an empty FixedQueue"),
        }
    }

    /// Copy of the oldest value, without removing it.
    #[inline]
    pub fn peek(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        Some(self.storage.as_ref()[self.head])
    }

    /// Forget all values. Storage contents are left as they are.
    #[inline]
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
    }

    /// Remove every value equal to `value`, keeping the order of the rest.
    /// Returns how many were removed.
    pub fn remove(&mut self, value: &T) -> usize
    where
        T: PartialEq,
    {
        let slots = self.slots();
        let data = self.storage.as_mut();
        let mut removed = 0;
        let mut read = self.head;
        let mut write = self.head;
        while read != self.tail {
            let v = data[read];
            if v == *value {
                removed += 1;
            } else {
                data[write] = v;
                write = (write + 1) % slots;
            }
            read = (read + 1) % slots;
        }
        self.tail = write;
        removed
    }

    /// Value at logical offset `index` from the oldest one.
    ///
    /// # Panics
    /// Panics if `index >= size()`.
    #[track_caller]
    pub fn at(&self, index: usize) -> &T {
        let size = self.size();
        assert!(index < size, "index {index} out of range for queue of size {size}");
        &self.storage.as_ref()[self.wrap(self.head + index)]
    }

    /// Mutable form of [`at`](Self::at).
    ///
    /// # Panics
    /// Panics if `index >= size()`.
    #[track_caller]
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        let size = self.size();
        assert!(index < size, "index {index} out of range for queue of size {size}");
        let slot = self.wrap(self.head + index);
        &mut self.storage.as_mut()[slot]
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        (index < self.size()).then(|| &self.storage.as_ref()[self.wrap(self.head + index)])
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.size() {
            return None;
        }
        let slot = self.wrap(self.head + index);
        Some(&mut self.storage.as_mut()[slot])
    }

    /// Oldest value.
    ///
    /// # Panics
    /// Panics if the queue is empty.
    #[track_caller]
    pub fn front(&self) -> &T {
        self.at(0)
    }

    /// # Panics
    /// Panics if the queue is empty.
    #[track_caller]
    pub fn front_mut(&mut self) -> &mut T {
        self.at_mut(0)
    }

    /// Newest value.
    ///
    /// # Panics
    /// Panics if the queue is empty.
    #[track_caller]
    pub fn back(&self) -> &T {
        let last = self.size().wrapping_sub(1);
        self.at(last)
    }

    /// # Panics
    /// Panics if the queue is empty.
    #[track_caller]
    pub fn back_mut(&mut self) -> &mut T {
        let last = self.size().wrapping_sub(1);
        self.at_mut(last)
    }

    /// Whether any stored value equals `value`.
    pub fn find(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|v| v == value)
    }

    /// Values from oldest to newest.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            data: self.storage.as_ref(),
            pos: self.head,
            left: self.size(),
        }
    }

    /// Give the storage back.
    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<T: Copy, S: AsRef<[T]> + AsMut<[T]>> Index<usize> for FixedQueue<T, S> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        self.at(index)
    }
}

impl<T: Copy, S: AsRef<[T]> + AsMut<[T]>> IndexMut<usize> for FixedQueue<T, S> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.at_mut(index)
    }
}

impl<'a, T: Copy, S: AsRef<[T]> + AsMut<[T]>> IntoIterator for &'a FixedQueue<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Iterator over a [`FixedQueue`], oldest first.
pub struct Iter<'a, T> {
    data: &'a [T],
    pos: usize,
    left: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.left == 0 {
            return None;
        }
        let v = &self.data[self.pos];
        self.pos = (self.pos + 1) % self.data.len();
        self.left -= 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T: Copy + core::fmt::Debug, S: AsRef<[T]> + AsMut<[T]>> core::fmt::Debug
    for FixedQueue<T, S>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::FixedQueue;
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::vec::Vec;

    fn contents<S: AsRef<[i32]> + AsMut<[i32]>>(q: &FixedQueue<i32, S>) -> Vec<i32> {
        q.iter().copied().collect()
    }

    #[test]
    fn new_queue_is_empty() {
        let q = FixedQueue::new([0i32; 6]);
        assert!(q.is_empty());
        assert!(!q.is_full());
        assert_eq!(q.capacity(), 5);
        assert_eq!(q.size(), 0);
        assert_eq!(q.available_capacity(), 5);
        assert_eq!(q.peek(), None);
    }

    #[test]
    #[should_panic]
    fn single_slot_storage_panics() {
        let _ = FixedQueue::new([0u8; 1]);
    }

    #[test]
    fn full_queue_rejects_then_accepts_after_pop() {
        let mut q = FixedQueue::new([0i32; 6]);
        for v in 0..5 {
            assert!(q.push(v).is_ok());
        }
        assert_eq!(contents(&q), [0, 1, 2, 3, 4]);
        assert!(q.is_full());
        assert_eq!(q.push(5), Err(5));

        assert_eq!(q.take(), 0);
        assert_eq!(q.take(), 1);
        assert_eq!(contents(&q), [2, 3, 4]);

        assert!(q.push(5).is_ok());
        assert_eq!(contents(&q), [2, 3, 4, 5]);
    }

    #[test]
    fn remove_compacts_across_wrap() {
        let mut q = FixedQueue::new([0i32; 6]);
        for v in 0..5 {
            q.push(v).unwrap();
        }
        q.pop();
        q.pop();
        q.push(5).unwrap();
        q.push(2).unwrap();
        // Stored region now wraps past the end of the array.
        assert_eq!(contents(&q), [2, 3, 4, 5, 2]);

        assert_eq!(q.remove(&2), 2);
        assert_eq!(contents(&q), [3, 4, 5]);
        assert_eq!(*q.front(), 3);
        assert_eq!(*q.back(), 5);
        assert_eq!(q.remove(&9), 0);
        assert_eq!(q.size(), 3);

        q.clear();
        assert_eq!(q.size(), 0);
        assert!(q.is_empty());
    }

    #[test]
    fn remove_everything() {
        let mut q = FixedQueue::new([0i32; 4]);
        for _ in 0..3 {
            q.push(7).unwrap();
        }
        assert_eq!(q.remove(&7), 3);
        assert!(q.is_empty());
        assert!(q.push(1).is_ok());
        assert_eq!(contents(&q), [1]);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut q = FixedQueue::new([0i32; 3]);
        q.push(10).unwrap();
        assert_eq!(q.peek(), Some(10));
        assert_eq!(q.size(), 1);
        assert_eq!(q.pop(), Some(10));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn indexed_access_and_find() {
        let mut q = FixedQueue::new([0i32; 5]);
        q.push(1).unwrap();
        q.push(2).unwrap();
        q.push(3).unwrap();
        q[1] = 20;
        *q.back_mut() += 1;
        assert_eq!(q[0], 1);
        assert_eq!(*q.at(1), 20);
        assert_eq!(q.get(2), Some(&4));
        assert_eq!(q.get(3), None);
        assert!(q.find(&20));
        assert!(!q.find(&2));
    }

    #[test]
    #[should_panic]
    fn index_past_size_panics() {
        let mut q = FixedQueue::new([0i32; 5]);
        q.push(1).unwrap();
        let _v: i32 = q[1];
    }

    #[test]
    #[should_panic]
    fn take_on_empty_panics() {
        let mut q = FixedQueue::new([0i32; 5]);
        q.take();
    }

    #[test]
    fn borrowed_storage() {
        let mut buf = [0u16; 3];
        {
            let mut q = FixedQueue::new(&mut buf[..]);
            q.push(0xAA).unwrap();
            q.push(0xBB).unwrap();
            assert_eq!(q.push(0xCC), Err(0xCC));
        }
        assert_eq!(buf[..2], [0xAA, 0xBB]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Push(i32),
        Pop,
        Remove(i32),
        Clear,
    }

    proptest! {
        #[test]
        fn matches_vecdeque(ops in prop::collection::vec(
            prop_oneof![
                (0i32..4).prop_map(Op::Push),
                Just(Op::Pop),
                (0i32..4).prop_map(Op::Remove),
                Just(Op::Clear),
            ],
            1..200,
        )) {
            const CAPACITY: usize = 5;
            let mut q = FixedQueue::new([0i32; CAPACITY + 1]);
            let mut model: VecDeque<i32> = VecDeque::new();

            for op in ops {
                match op {
                    Op::Push(v) => {
                        let res = q.push(v);
                        if model.len() == CAPACITY {
                            prop_assert_eq!(res, Err(v));
                        } else {
                            prop_assert!(res.is_ok());
                            model.push_back(v);
                        }
                    }
                    Op::Pop => prop_assert_eq!(q.pop(), model.pop_front()),
                    Op::Remove(v) => {
                        let before = model.len();
                        model.retain(|x| *x != v);
                        prop_assert_eq!(q.remove(&v), before - model.len());
                    }
                    Op::Clear => {
                        q.clear();
                        model.clear();
                    }
                }
                prop_assert_eq!(q.size() + q.available_capacity(), q.capacity());
                prop_assert_eq!(q.is_full(), q.size() == q.capacity());
                prop_assert_eq!(q.is_empty(), q.size() == 0);
                prop_assert_eq!(contents(&q), model.iter().copied().collect::<Vec<_>>());
            }
        }
    }
}
