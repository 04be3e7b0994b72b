// src/pool/mod.rs
//! Bounded pool of reusable drawing resources.
//!
//! Renderers churn through path builders and scratch buffers every frame;
//! the pool keeps a bounded stash of returned instances so the hot path
//! allocates only on a miss. Storage is a lock-free bounded queue, so
//! `get`/`put` are safe from multiple threads without external locking. An
//! individual item is still single-owner between `get` and return.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::queue::ArrayQueue;
use tracing::trace;

/// Object pool failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The pool was disposed; no further items can be borrowed.
    #[error("object pool used after dispose")]
    Disposed,
}

type BuildFn<T> = dyn Fn() -> T + Send + Sync;
type ResetFn<T> = dyn Fn(&mut T) -> bool + Send + Sync;

struct PoolInner<T> {
    items: ArrayQueue<T>,
    build: Box<BuildFn<T>>,
    reset: Option<Box<ResetFn<T>>>,
    disposed: AtomicBool,
}

impl<T> PoolInner<T> {
    /// Reclaims an item, dropping it when the pool is full, disposed, or
    /// the reset hook rejects it. A rejected item is dropped rather than
    /// silently leaked back into circulation.
    fn reclaim(&self, mut item: T) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }
        if let Some(reset) = &self.reset {
            if !reset(&mut item) {
                trace!("pool reset hook rejected item; dropping");
                return;
            }
        }
        // push returns the item when the queue is at capacity; the excess
        // item is dropped exactly once here.
        let _ = self.items.push(item);
    }
}

/// Generic bounded pool of reusable objects.
pub struct ObjectPool<T> {
    inner: Arc<PoolInner<T>>,
}

impl<T> Clone for ObjectPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> ObjectPool<T> {
    /// Creates a pool holding at most `max_size` idle items, building new
    /// ones with `build` on a miss.
    pub fn new<F>(max_size: usize, build: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(PoolInner {
                items: ArrayQueue::new(max_size.max(1)),
                build: Box::new(build),
                reset: None,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Like [`ObjectPool::new`], with a reset hook run on every reuse and
    /// every return. A hook returning `false` drops the item instead of
    /// recycling it.
    pub fn with_reset<F, R>(max_size: usize, build: F, reset: R) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        R: Fn(&mut T) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(PoolInner {
                items: ArrayQueue::new(max_size.max(1)),
                build: Box::new(build),
                reset: Some(Box::new(reset)),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Borrows a ready-to-use item, preferring a previously returned one.
    /// The item goes back to the pool when the handle drops.
    pub fn get(&self) -> Result<PooledItem<T>, PoolError> {
        if self.inner.disposed.load(Ordering::Acquire) {
            return Err(PoolError::Disposed);
        }
        // Reused items are reset before hand-out; ones the hook rejects
        // are dropped and the next candidate tried.
        while let Some(mut item) = self.inner.items.pop() {
            match &self.inner.reset {
                Some(reset) if !reset(&mut item) => continue,
                _ => {
                    return Ok(PooledItem {
                        item: Some(item),
                        pool: Arc::clone(&self.inner),
                    });
                }
            }
        }
        Ok(PooledItem {
            item: Some((self.inner.build)()),
            pool: Arc::clone(&self.inner),
        })
    }

    /// Returns an item that was detached from its handle.
    pub fn put(&self, item: T) {
        self.inner.reclaim(item);
    }

    /// Drops every idle item.
    pub fn clear(&self) {
        while self.inner.items.pop().is_some() {}
    }

    /// Drains the pool and rejects all further `get` calls. Items still
    /// out on loan are dropped when their handles drop.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::Release);
        self.clear();
    }

    /// Number of idle items currently held.
    pub fn available(&self) -> usize {
        self.inner.items.len()
    }

    /// Maximum number of idle items the pool retains.
    pub fn capacity(&self) -> usize {
        self.inner.items.capacity()
    }
}

/// Scoped handle that returns its item to the pool on drop.
pub struct PooledItem<T> {
    item: Option<T>,
    pool: Arc<PoolInner<T>>,
}

impl<T> PooledItem<T> {
    /// Takes the item out of the handle, skipping the return-to-pool.
    pub fn detach(mut self) -> T {
        self.item.take().expect("pooled item already detached")
    }
}

impl<T> Deref for PooledItem<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.item.as_ref().expect("pooled item already detached")
    }
}

impl<T> DerefMut for PooledItem<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().expect("pooled item already detached")
    }
}

impl<T> Drop for PooledItem<T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.reclaim(item);
        }
    }
}
