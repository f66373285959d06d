//! Zero-allocation object pools for hot-path reuse. Adapted from the
//! teacher's `perf::pools` module: a bounded `ArrayQueue` of pre-built
//! values, handed out as a guard that returns its value to the pool on drop
//! instead of freeing it.

use crossbeam::queue::ArrayQueue;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

pub struct ObjectPool<T> {
    queue: Arc<ArrayQueue<T>>,
    factory: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T> ObjectPool<T> {
    pub fn new(capacity: usize, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        let queue = Arc::new(ArrayQueue::new(capacity));
        let factory = Arc::new(factory);
        for _ in 0..capacity {
            let _ = queue.push((factory)());
        }
        Self { queue, factory }
    }

    /// Pops a pooled value, or builds a fresh one if the pool is empty
    /// (never blocks, matching the hot-path no-allocation-on-the-happy-path
    /// discipline; the factory call on miss is the cold path).
    pub fn acquire(&self) -> PoolGuard<T> {
        let value = self.queue.pop().unwrap_or_else(|| (self.factory)());
        PoolGuard {
            value: Some(value),
            queue: Arc::clone(&self.queue),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

pub struct PoolGuard<T> {
    value: Option<T>,
    queue: Arc<ArrayQueue<T>>,
}

impl<T> Deref for PoolGuard<T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.value.as_ref().expect("value taken before drop")
    }
}

impl<T> DerefMut for PoolGuard<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().expect("value taken before drop")
    }
}

impl<T> Drop for PoolGuard<T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            let _ = self.queue.push(value);
        }
    }
}
