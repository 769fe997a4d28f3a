use crate::common::{Contention, Queue};
use crate::config::Config;
use crossbeam_epoch::{self as epoch, Atomic, Owned, Shared};
use crossbeam_utils::CachePadded;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::Ordering::{AcqRel, Acquire, Relaxed, Release};

struct Node<T> {
    value: T,
    next: Atomic<Node<T>>,
}

/// Lock-free FIFO queue without a dummy node.
///
/// Both pointers are null exactly when the queue is empty. Enqueue is wait-free; dequeue takes
/// the head node exclusively by swapping `head` to null and may wait for an enqueuer that has
/// swung `tail` but not yet linked its predecessor.
///
/// Dequeued nodes are dropped by whichever thread collects the epoch garbage, so reading and
/// removing require `T: Send + 'static`:
///
/// ```compile_fail
/// use simple_lockfree_core::TwoPointerQueue;
///
/// let owner = String::from("borrowed");
/// let queue = TwoPointerQueue::new();
/// queue.enqueue(owner.as_str());
/// let _ = queue.dequeue();
/// ```
pub struct TwoPointerQueue<T> {
    head: CachePadded<Atomic<Node<T>>>,
    tail: CachePadded<Atomic<Node<T>>>,
    config: Config,
}

impl<T> Debug for TwoPointerQueue<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoPointerQueue")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T> Default for TwoPointerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for TwoPointerQueue<T> {
    fn drop(&mut self) {
        unsafe {
            let guard = epoch::unprotected();
            let mut current = self.head.load(Relaxed, guard);
            while let Some(node) = current.as_ref() {
                let next = node.next.load(Relaxed, guard);
                drop(current.into_owned());
                current = next;
            }
        }
    }
}

impl<T> TwoPointerQueue<T> {
    /// Create an empty queue with the default [`Config`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty queue.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        TwoPointerQueue {
            head: CachePadded::new(Atomic::null()),
            tail: CachePadded::new(Atomic::null()),
            config,
        }
    }

    /// The config this queue retries with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Append an element to the tail.
    ///
    /// Takes effect at the swap of `tail`, the predecessor is linked afterwards.
    pub fn enqueue(&self, item: T) {
        let guard = &epoch::pin();
        let node = Owned::new(Node {
            value: item,
            next: Atomic::null(),
        })
        .into_shared(guard);
        let last = self.tail.swap(node, AcqRel, guard);
        match unsafe { last.as_ref() } {
            None => self.head.store(node, Release),
            // the dequeuer owning `last` keeps it alive until this link shows up
            Some(last) => last.next.store(node, Release),
        }
    }

    /// Returns `true` if the queue holds no element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tail.load(Acquire, &epoch::pin()).is_null()
    }
}

impl<T: Clone + Send + 'static> TwoPointerQueue<T> {
    /// Get a clone of the oldest element without removing it.
    ///
    /// Spins while a dequeuer holds the head node.
    #[must_use]
    pub fn head(&self) -> Option<T> {
        let guard = &epoch::pin();
        let mut contention = Contention::new("TwoPointerQueue::head", &self.config);
        loop {
            if let Some(first) = unsafe { self.head.load(Acquire, guard).as_ref() } {
                return Some(first.value.clone());
            }
            if self.tail.load(Acquire, guard).is_null() {
                return None;
            }
            contention.retry();
        }
    }

    /// Remove and return the oldest element.
    ///
    /// Takes effect at the swap that takes the head node out of `head`.
    pub fn dequeue(&self) -> Option<T> {
        let guard = &epoch::pin();
        let mut contention = Contention::new("TwoPointerQueue::dequeue", &self.config);
        let first = loop {
            let first = self.head.swap(Shared::null(), AcqRel, guard);
            if !first.is_null() {
                break first;
            }
            if self.tail.load(Acquire, guard).is_null() {
                return None;
            }
            contention.retry();
        };
        // this thread owns `first` exclusively from here on
        let node = unsafe { first.deref() };
        let second = node.next.load(Acquire, guard);
        if !second.is_null() {
            self.head.store(second, Release);
        } else if self
            .tail
            .compare_exchange(first, Shared::null(), AcqRel, Acquire, guard)
            .is_err()
        {
            crate::trace!("dequeue waits for an in-flight enqueue to link");
            let mut contention = Contention::new("TwoPointerQueue::dequeue::link", &self.config);
            let second = loop {
                let second = node.next.load(Acquire, guard);
                if !second.is_null() {
                    break second;
                }
                contention.retry();
            };
            self.head.store(second, Release);
        }
        // `head()` callers may have loaded `first` before it was taken,
        // `guard` keeps it alive for the clone below
        unsafe { guard.defer_destroy(first) };
        Some(node.value.clone())
    }
}

impl<T: Clone + Send + 'static> Queue<T> for TwoPointerQueue<T> {
    fn is_empty(&self) -> bool {
        TwoPointerQueue::is_empty(self)
    }

    fn head(&self) -> Option<T> {
        TwoPointerQueue::head(self)
    }

    fn enqueue(&self, item: T) {
        TwoPointerQueue::enqueue(self, item);
    }

    fn dequeue(&self) -> Option<T> {
        TwoPointerQueue::dequeue(self)
    }
}
