//! A lock-free, append-only bucket used as the observation buffer's backing queue.

use crossbeam_epoch::{pin as epoch_pin, Atomic, Guard, Owned, Shared};
use std::{
    cell::UnsafeCell,
    mem, slice,
    sync::atomic::{AtomicUsize, Ordering},
};

#[cfg(target_pointer_width = "16")]
const BLOCK_SIZE: usize = 16;
#[cfg(target_pointer_width = "32")]
const BLOCK_SIZE: usize = 32;
#[cfg(target_pointer_width = "64")]
const BLOCK_SIZE: usize = 64;

/// Discrete chunk of values with atomic read/write access.
struct Block<T> {
    write: AtomicUsize,
    read: AtomicUsize,
    slots: [UnsafeCell<T>; BLOCK_SIZE],
    prev: Atomic<Block<T>>,
}

impl<T> Block<T> {
    fn new() -> Self {
        Block { write: AtomicUsize::new(0), read: AtomicUsize::new(0), slots: unsafe { mem::zeroed() }, prev: Atomic::null() }
    }

    fn prev_len(&self, guard: &Guard) -> usize {
        let tail = self.prev.load(Ordering::Acquire, guard);
        if tail.is_null() {
            return 0;
        }
        unsafe { tail.deref() }.len()
    }

    fn len(&self) -> usize {
        self.read.load(Ordering::Acquire).trailing_ones() as usize
    }

    fn data(&self) -> &[T] {
        let len = self.len();
        let head = self.slots[0].get();
        unsafe { slice::from_raw_parts(head as *const T, len) }
    }

    fn set_prev(&self, prev: Shared<Block<T>>, guard: &Guard) {
        match self.prev.compare_exchange(Shared::null(), prev, Ordering::AcqRel, Ordering::Relaxed, guard) {
            Ok(_) => {}
            Err(_) => unreachable!("a freshly allocated block cannot already have a `prev`"),
        }
    }

    fn push(&self, value: T) -> Result<(), T> {
        let index = self.write.fetch_add(1, Ordering::AcqRel);
        if index >= BLOCK_SIZE {
            return Err(value);
        }
        unsafe {
            self.slots[index].get().write(value);
        }
        self.read.fetch_or(1 << index, Ordering::AcqRel);
        Ok(())
    }
}

unsafe impl<T> Send for Block<T> {}
unsafe impl<T> Sync for Block<T> {}

impl<T> Drop for Block<T> {
    fn drop(&mut self) {
        let guard = &epoch_pin();
        let prev = self.prev.swap(Shared::null(), Ordering::AcqRel, guard);
        if !prev.is_null() {
            unsafe {
                guard.defer_destroy(prev);
            }
            guard.flush();
        }
    }
}

/// An atomic, append-only bucket with whole-structure snapshot/clear semantics.
///
/// Implemented as a singly-linked list of small fixed-size blocks; writers append without
/// ever blocking a reader, and a reader walks the whole structure rather than draining it
/// element by element. [`AtomicBucket::clear_with`] swaps the block list out atomically so
/// that in-flight writers never observe a torn clear.
#[derive(Debug)]
pub struct AtomicBucket<T> {
    tail: Atomic<Block<T>>,
}

impl<T> AtomicBucket<T> {
    /// Creates a new, empty bucket.
    pub fn new() -> Self {
        AtomicBucket { tail: Atomic::null() }
    }

    /// Whether the bucket currently holds no elements.
    pub fn is_empty(&self) -> bool {
        let guard = &epoch_pin();
        let tail = self.tail.load(Ordering::Acquire, guard);
        if tail.is_null() {
            return true;
        }
        let tail_block = unsafe { tail.deref() };
        tail_block.len() == 0 && tail_block.prev_len(guard) == 0
    }

    /// Appends an element, allocating a new block if the current tail is full.
    pub fn push(&self, value: T) {
        let mut original = value;
        loop {
            let guard = &epoch_pin();
            let mut tail = self.tail.load(Ordering::Acquire, guard);
            if tail.is_null() {
                match self.tail.compare_exchange(
                    Shared::null(),
                    Owned::new(Block::new()),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                    guard,
                ) {
                    Ok(ptr) => tail = ptr,
                    Err(e) => tail = e.current,
                }
            }

            let tail_block = unsafe { tail.deref() };
            match tail_block.push(original) {
                Ok(()) => return,
                Err(value) => {
                    match self.tail.compare_exchange(
                        tail,
                        Owned::new(Block::new()),
                        Ordering::AcqRel,
                        Ordering::Acquire,
                        guard,
                    ) {
                        Ok(ptr) => {
                            let new_tail = unsafe { ptr.deref() };
                            new_tail.set_prev(tail, guard);
                            match new_tail.push(value) {
                                Ok(()) => return,
                                Err(value) => {
                                    original = value;
                                    continue;
                                }
                            }
                        }
                        Err(_) => {
                            original = value;
                            continue;
                        }
                    }
                }
            }
        }
    }

    /// Collects every element currently in the bucket into a `Vec`.
    pub fn data(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut values = Vec::new();
        self.data_with(|block| values.extend_from_slice(block));
        values
    }

    /// Iterates every element currently in the bucket, invoking `f` once per block.
    pub fn data_with<F>(&self, mut f: F)
    where
        F: FnMut(&[T]),
    {
        let guard = &epoch_pin();
        let mut block_ptr = self.tail.load(Ordering::Acquire, guard);
        while !block_ptr.is_null() {
            let block = unsafe { block_ptr.deref() };
            f(block.data());
            block_ptr = block.prev.load(Ordering::Acquire, guard);
        }
    }

    /// Atomically empties the bucket, invoking `f` with the data that was cleared.
    ///
    /// Writers that overlap the clear either land in the emptied structure (and are
    /// seen on the *next* clear) or finish before it (and are included in `f`): never split.
    pub fn clear_with<F>(&self, mut f: F)
    where
        F: FnMut(&[T]),
    {
        let guard = &epoch_pin();
        let tail = self.tail.load(Ordering::Acquire, guard);
        if !tail.is_null()
            && self
                .tail
                .compare_exchange(tail, Shared::null(), Ordering::SeqCst, Ordering::Relaxed, guard)
                .is_ok()
        {
            let mut block_ptr = tail;
            while !block_ptr.is_null() {
                let block = unsafe { block_ptr.deref() };
                f(block.data());
                block_ptr = block.prev.load(Ordering::Acquire, guard);
            }
            unsafe {
                guard.defer_destroy(tail);
            }
            guard.flush();
        }
    }
}

impl<T> Default for AtomicBucket<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{AtomicBucket, BLOCK_SIZE};
    use crossbeam_utils::thread::scope;

    #[test]
    fn write_then_read() {
        let bucket = AtomicBucket::new();
        bucket.push(42);
        assert_eq!(bucket.data(), vec![42]);
    }

    #[test]
    fn multiple_blocks_write_then_read() {
        let bucket = AtomicBucket::new();
        let target = (BLOCK_SIZE * 3 + BLOCK_SIZE / 2) as u64;
        let mut total = 0;
        for i in 0..target {
            bucket.push(i);
            total += i;
        }
        let snapshot = bucket.data();
        assert_eq!(snapshot.len(), target as usize);
        assert_eq!(snapshot.iter().sum::<u64>(), total);
    }

    #[test]
    fn concurrent_push_preserves_every_value() {
        let bucket = AtomicBucket::new();
        let result = scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|_| {
                        let mut total = 0u64;
                        for i in 0..(BLOCK_SIZE as u64 * 50) {
                            bucket.push(i);
                            total += i;
                        }
                        total
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum::<u64>()
        })
        .unwrap();

        let snapshot = bucket.data();
        assert_eq!(snapshot.len(), 4 * BLOCK_SIZE * 50);
        assert_eq!(snapshot.iter().sum::<u64>(), result);
    }

    #[test]
    fn clear_with_sees_everything_pushed_before_it() {
        let bucket = AtomicBucket::new();
        for i in 0..(BLOCK_SIZE * 4) {
            bucket.push(i);
        }
        let mut total = 0;
        bucket.clear_with(|xs| total += xs.iter().sum::<usize>());
        assert_eq!(total, (0..BLOCK_SIZE * 4).sum::<usize>());
        assert!(bucket.is_empty());
    }
}
