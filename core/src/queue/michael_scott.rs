use crate::common::{Contention, Queue};
use crate::config::Config;
use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};
use crossbeam_utils::CachePadded;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::Ordering::{AcqRel, Acquire, Relaxed, Release};

/// A node of the list. The node `head` points to is the dummy: its value is null.
struct Node<T> {
    value: Atomic<T>,
    next: Atomic<Node<T>>,
}

impl<T> Node<T> {
    fn dummy() -> Self {
        Node {
            value: Atomic::null(),
            next: Atomic::null(),
        }
    }

    fn new(value: T) -> Self {
        Node {
            value: Atomic::new(value),
            next: Atomic::null(),
        }
    }
}

/// Michael-Scott lock-free FIFO queue.
///
/// `head` and `tail` are never null. Real elements live in `head.next` up to `tail`, and `tail`
/// may lag one node behind the last linked node until somebody swings it.
///
/// Removed elements and nodes are dropped by whichever thread collects the epoch garbage, so
/// reading and removing require `T: Send + 'static`:
///
/// ```compile_fail
/// use simple_lockfree_core::MsQueue;
/// use std::rc::Rc;
///
/// let queue = MsQueue::new();
/// queue.enqueue(Rc::new(1));
/// let _ = queue.dequeue();
/// ```
pub struct MsQueue<T> {
    head: CachePadded<Atomic<Node<T>>>,
    tail: CachePadded<Atomic<Node<T>>>,
    config: Config,
}

impl<T> Debug for MsQueue<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MsQueue")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T> Default for MsQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for MsQueue<T> {
    fn drop(&mut self) {
        unsafe {
            let guard = epoch::unprotected();
            let mut current = self.head.load(Relaxed, guard);
            while let Some(node) = current.as_ref() {
                let next = node.next.load(Relaxed, guard);
                let value = node.value.load(Relaxed, guard);
                if !value.is_null() {
                    drop(value.into_owned());
                }
                drop(current.into_owned());
                current = next;
            }
        }
    }
}

impl<T> MsQueue<T> {
    /// Create an empty queue with the default [`Config`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty queue: a single dummy node referenced by both `head` and `tail`.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let dummy = Owned::new(Node::dummy()).into_shared(unsafe { epoch::unprotected() });
        MsQueue {
            head: CachePadded::new(Atomic::from(dummy)),
            tail: CachePadded::new(Atomic::from(dummy)),
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
    /// Takes effect at the CAS that links the node behind the current last node.
    pub fn enqueue(&self, item: T) {
        let guard = &epoch::pin();
        let node = Owned::new(Node::new(item)).into_shared(guard);
        let last = self.link(node, guard);
        // a helper may already have swung the tail past `last`
        _ = self.advance_tail(last, node, guard);
    }

    /// Link `node` behind the last node and return its predecessor, leaving `tail` untouched.
    fn link<'g>(&self, node: Shared<'g, Node<T>>, guard: &'g Guard) -> Shared<'g, Node<T>> {
        let mut contention = Contention::new("MsQueue::enqueue", &self.config);
        loop {
            let last = self.tail.load(Acquire, guard);
            // tail is never null
            let last_node = unsafe { last.deref() };
            let next_last = last_node.next.load(Acquire, guard);
            if last == self.tail.load(Acquire, guard) {
                if !next_last.is_null() {
                    crate::trace!("enqueue helps a lagging tail");
                    _ = self.advance_tail(last, next_last, guard);
                } else if last_node
                    .next
                    .compare_exchange(Shared::null(), node, Release, Relaxed, guard)
                    .is_ok()
                {
                    return last;
                }
            }
            contention.retry();
        }
    }

    /// Swing `tail` from `last` to `next`. Returns `false` if somebody else already moved it.
    fn advance_tail<'g>(
        &self,
        last: Shared<'g, Node<T>>,
        next: Shared<'g, Node<T>>,
        guard: &'g Guard,
    ) -> bool {
        self.tail
            .compare_exchange(last, next, Release, Relaxed, guard)
            .is_ok()
    }

}

impl<T: Send + 'static> MsQueue<T> {
    /// Swing `head` from `first` to `second` and retire `first` if this thread won.
    fn advance_head<'g>(
        &self,
        first: Shared<'g, Node<T>>,
        second: Shared<'g, Node<T>>,
        guard: &'g Guard,
    ) -> bool {
        if self
            .head
            .compare_exchange(first, second, Release, Relaxed, guard)
            .is_err()
        {
            return false;
        }
        // `tail` was already past `first`, nobody can reach it from the queue any more
        unsafe { guard.defer_destroy(first) };
        true
    }

    /// Run `f` on the oldest element, helping a lagging tail or a stale head on the way.
    fn peek_with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = &epoch::pin();
        let mut contention = Contention::new("MsQueue::head", &self.config);
        loop {
            let first = self.head.load(Acquire, guard);
            let last = self.tail.load(Acquire, guard);
            let second = unsafe { first.deref() }.next.load(Acquire, guard);
            if first == self.head.load(Acquire, guard) {
                if first == last {
                    if second.is_null() {
                        return None;
                    }
                    crate::trace!("head helps a lagging tail");
                    _ = self.advance_tail(last, second, guard);
                } else if let Some(next) = unsafe { second.as_ref() } {
                    if let Some(value) = unsafe { next.value.load(Acquire, guard).as_ref() } {
                        return Some(f(value));
                    }
                    // taken by a dequeuer after `head` was checked
                    crate::trace!("head helps advance a drained head");
                    _ = self.advance_head(first, second, guard);
                }
            }
            contention.retry();
        }
    }

    /// Returns `true` if the queue holds no element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peek_with(|_| ()).is_none()
    }
}

impl<T: Clone + Send + 'static> MsQueue<T> {
    /// Get a clone of the oldest element without removing it.
    #[must_use]
    pub fn head(&self) -> Option<T> {
        self.peek_with(T::clone)
    }

    /// Remove and return the oldest element.
    ///
    /// Takes effect at the CAS that moves `head` onto the node holding the element; that node
    /// becomes the new dummy once its value has been drained.
    pub fn dequeue(&self) -> Option<T> {
        let guard = &epoch::pin();
        let mut contention = Contention::new("MsQueue::dequeue", &self.config);
        loop {
            let first = self.head.load(Acquire, guard);
            let last = self.tail.load(Acquire, guard);
            let second = unsafe { first.deref() }.next.load(Acquire, guard);
            if first == self.head.load(Acquire, guard) {
                if first == last {
                    if second.is_null() {
                        return None;
                    }
                    crate::trace!("dequeue helps a lagging tail");
                    _ = self.advance_tail(last, second, guard);
                } else if let Some(next) = unsafe { second.as_ref() } {
                    if self.advance_head(first, second, guard) {
                        let value = next.value.swap(Shared::null(), AcqRel, guard);
                        if let Some(item) = unsafe { value.as_ref() } {
                            // concurrent `head()` callers may still be cloning the original,
                            // `guard` keeps it alive for the clone below
                            unsafe { guard.defer_destroy(value) };
                            return Some(item.clone());
                        }
                    }
                }
            }
            contention.retry();
        }
    }
}

impl<T: Clone + Send + 'static> Queue<T> for MsQueue<T> {
    fn is_empty(&self) -> bool {
        MsQueue::is_empty(self)
    }

    fn head(&self) -> Option<T> {
        MsQueue::head(self)
    }

    fn enqueue(&self, item: T) {
        MsQueue::enqueue(self, item);
    }

    fn dequeue(&self) -> Option<T> {
        MsQueue::dequeue(self)
    }
}
