//! Lock-free single-producer single-consumer ring buffer.
//!
//! Every inter-stage hop in the pipeline (ingest -> strategy -> risk ->
//! executor -> audit) goes through one of these. Grounded on the corpus's
//! `ringmpsc` ring: unbounded monotonic `u64` sequence counters (so there is
//! no ABA problem and no explicit empty/full bit), cache-line separated
//! head/tail so the producer and consumer never bounce the same line, and a
//! producer/consumer-local cache of the *other side's* counter so the common
//! case touches only local memory.
//!
//! Capacity is a runtime construction parameter (power of two), not a type
//! parameter: `run(config, ...)` takes ring capacities as plain config
//! values, and a single pipeline wires three differently-sized rings
//! (tick/pre-risk/approved) without three monomorphizations.
//!
//! Unlike the `ringmpsc` source (which exposes a batched reservation API for
//! zero-copy writes), this ring's call sites each move exactly one record
//! per call most of the time, so the public surface is the simpler
//! `try_write`/`try_read`, with `try_write_batch`/`try_read_batch` for the
//! cases that do want to move several at once.

use crossbeam_utils::CachePadded;
use std::cell::Cell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU64, Ordering};

/// A single producer, single consumer ring buffer over `capacity` slots of `T`.
pub struct SpscRing<T> {
    slots: Box<[MaybeUninit<T>]>,
    mask: u64,
    head: CachePadded<AtomicU64>,
    tail: CachePadded<AtomicU64>,
    /// Producer's private cache of the last-observed `head`, avoiding a
    /// cross-core read of `head` on every write once there's headroom.
    cached_head: CachePadded<Cell<u64>>,
    /// Consumer's private cache of the last-observed `tail`.
    cached_tail: CachePadded<Cell<u64>>,
}

unsafe impl<T: Send> Send for SpscRing<T> {}
unsafe impl<T: Send> Sync for SpscRing<T> {}

impl<T> SpscRing<T> {
    /// `capacity` must be a nonzero power of two.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity > 0 && capacity.is_power_of_two(),
            "ring capacity must be a nonzero power of two, got {capacity}"
        );
        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(MaybeUninit::uninit());
        }
        Self {
            slots: slots.into_boxed_slice(),
            mask: (capacity - 1) as u64,
            head: CachePadded::new(AtomicU64::new(0)),
            tail: CachePadded::new(AtomicU64::new(0)),
            cached_head: CachePadded::new(Cell::new(0)),
            cached_tail: CachePadded::new(Cell::new(0)),
        }
    }

    #[inline]
    fn index(&self, seq: u64) -> usize {
        (seq & self.mask) as usize
    }

    #[inline]
    fn capacity_u64(&self) -> u64 {
        self.mask + 1
    }

    /// Producer side only. Returns `false` (and drops nothing) if the ring is
    /// full; the caller decides whether that's a stall or a dropped record.
    pub fn try_write(&self, value: T) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail - self.cached_head.get() >= self.capacity_u64() {
            // Refresh the cache once; only re-check after a real acquire load.
            self.cached_head.set(self.head.load(Ordering::Acquire));
            if tail - self.cached_head.get() >= self.capacity_u64() {
                return false;
            }
        }
        let idx = self.index(tail);
        unsafe {
            let slot = self.slots.as_ptr().add(idx) as *mut MaybeUninit<T>;
            (*slot).write(value);
        }
        self.tail.store(tail + 1, Ordering::Release);
        true
    }

    /// Consumer side only. Returns `None` if the ring is empty.
    pub fn try_read(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);
        if head >= self.cached_tail.get() {
            self.cached_tail.set(self.tail.load(Ordering::Acquire));
            if head >= self.cached_tail.get() {
                return None;
            }
        }
        let idx = self.index(head);
        let value = unsafe {
            let slot = self.slots.as_ptr().add(idx) as *const MaybeUninit<T>;
            (*slot).assume_init_read()
        };
        self.head.store(head + 1, Ordering::Release);
        Some(value)
    }

    /// Consumer side only: number of records currently readable. Approximate
    /// under concurrent writes (the producer may be mid-publish), exact once
    /// the producer is quiescent.
    pub fn readable_len(&self) -> u64 {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.saturating_sub(head)
    }

    pub fn is_empty(&self) -> bool {
        self.readable_len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Writes as many of `values` as fit, in order; returns the count written.
    /// Stops at the first slot that doesn't fit rather than partially filling
    /// past a full ring.
    pub fn try_write_batch(&self, values: impl IntoIterator<Item = T>) -> usize {
        let mut n = 0;
        for v in values {
            if !self.try_write(v) {
                break;
            }
            n += 1;
        }
        n
    }

    /// Reads up to `max` elements into `out`; returns the count read.
    pub fn try_read_batch(&self, out: &mut Vec<T>, max: usize) -> usize {
        let mut n = 0;
        while n < max {
            match self.try_read() {
                Some(v) => {
                    out.push(v);
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    /// Consumer side only: resets both sequence counters. Only valid when no
    /// producer or consumer is concurrently active, per the ring's contract.
    pub fn clear(&self) {
        self.head.store(0, Ordering::Relaxed);
        self.tail.store(0, Ordering::Relaxed);
        self.cached_head.set(0);
        self.cached_tail.set(0);
    }
}

impl<T: Copy> SpscRing<T> {
    /// Consumer side only: reads the next element without advancing `head`.
    pub fn peek(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head >= tail {
            return None;
        }
        let idx = self.index(head);
        unsafe {
            let slot = self.slots.as_ptr().add(idx) as *const MaybeUninit<T>;
            Some((*slot).assume_init_read())
        }
    }
}

impl<T> Drop for SpscRing<T> {
    fn drop(&mut self) {
        while self.try_read().is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn write_then_read_round_trips() {
        let ring: SpscRing<u64> = SpscRing::new(8);
        assert!(ring.try_write(42));
        assert_eq!(ring.try_read(), Some(42));
        assert_eq!(ring.try_read(), None);
    }

    #[test]
    fn fills_to_capacity_then_rejects() {
        let ring: SpscRing<u64> = SpscRing::new(4);
        for i in 0..4 {
            assert!(ring.try_write(i));
        }
        assert!(!ring.try_write(99));
        assert_eq!(ring.try_read(), Some(0));
        assert!(ring.try_write(99));
    }

    #[test]
    fn capacity_minus_one_pending_then_exact_capacity_refused() {
        let ring: SpscRing<u64> = SpscRing::new(4);
        for i in 0..3 {
            assert!(ring.try_write(i));
        }
        assert!(ring.try_write(3));
        assert!(!ring.try_write(4));
    }

    #[test]
    fn peek_does_not_advance() {
        let ring: SpscRing<u64> = SpscRing::new(4);
        ring.try_write(7);
        assert_eq!(ring.peek(), Some(7));
        assert_eq!(ring.peek(), Some(7));
        assert_eq!(ring.try_read(), Some(7));
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn rejects_non_power_of_two_capacity() {
        let _ring: SpscRing<u64> = SpscRing::new(100);
    }

    #[test]
    fn concurrent_producer_consumer_preserves_order_and_count() {
        const N: u64 = 200_000;
        let ring: Arc<SpscRing<u64>> = Arc::new(SpscRing::new(1024));

        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                let mut i = 0u64;
                while i < N {
                    if ring.try_write(i) {
                        i += 1;
                    }
                }
            })
        };

        let consumer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                let mut expected = 0u64;
                while expected < N {
                    if let Some(v) = ring.try_read() {
                        assert_eq!(v, expected);
                        expected += 1;
                    }
                }
                expected
            })
        };

        producer.join().unwrap();
        assert_eq!(consumer.join().unwrap(), N);
    }
}
