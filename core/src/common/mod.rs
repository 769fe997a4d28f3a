use crate::config::Config;
use crossbeam_utils::Backoff;
use std::io::{Error, ErrorKind};

/// CI tools.
#[cfg(feature = "ci")]
pub mod ci;

/// Constants.
pub mod constants;

/// Logging macros gated on the `log` feature.
pub(crate) mod macros;

/// A FIFO shared by any number of producers and consumers.
///
/// The empty indicator is `None`; no operation blocks on a lock.
///
/// # Examples
///
/// ```
/// use simple_lockfree_core::{MsQueue, Queue, TwoPointerQueue};
///
/// fn drain<Q: Queue<u32>>(queue: &Q) -> Vec<u32> {
///     std::iter::from_fn(|| queue.dequeue()).collect()
/// }
///
/// let ms = MsQueue::new();
/// let simple = TwoPointerQueue::new();
/// for i in 0..3 {
///     Queue::enqueue(&ms, i);
///     Queue::enqueue(&simple, i);
/// }
/// assert_eq!(drain(&ms), drain(&simple));
/// ```
pub trait Queue<T> {
    /// Returns `true` if the queue holds no element.
    fn is_empty(&self) -> bool;

    /// Get the oldest element without removing it.
    fn head(&self) -> Option<T>;

    /// Append an element to the tail.
    fn enqueue(&self, item: T);

    /// Remove and return the oldest element.
    fn dequeue(&self) -> Option<T>;

    /// Append an element that may be absent.
    ///
    /// An absent element is rejected with [`ErrorKind::InvalidInput`] and the queue is not touched.
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_lockfree_core::{MsQueue, Queue};
    ///
    /// let queue = MsQueue::<&str>::new();
    /// let error = queue.try_enqueue(None).unwrap_err();
    /// assert_eq!(std::io::ErrorKind::InvalidInput, error.kind());
    /// assert!(queue.is_empty());
    /// queue.try_enqueue(Some("a")).unwrap();
    /// assert_eq!(queue.head(), Some("a"));
    /// ```
    fn try_enqueue(&self, item: Option<T>) -> std::io::Result<()> {
        let item = item.ok_or_else(|| Error::new(ErrorKind::InvalidInput, "value"))?;
        self.enqueue(item);
        Ok(())
    }
}

/// An indexed sequence shared by any number of threads.
///
/// Out-of-range indices are reported as `false` or `None`, never as an error.
pub trait Vector<T> {
    /// Returns `true` if the vector holds no element.
    fn is_empty(&self) -> bool;

    /// Get the number of elements.
    fn size(&self) -> usize;

    /// Get the element at `index`.
    fn get(&self, index: usize) -> Option<T>;

    /// Insert `item` at `index`, shifting the elements after it.
    /// Returns `false` if `index > size()`.
    fn insert(&self, item: T, index: usize) -> bool;

    /// Remove the element at `index`, shifting the elements after it.
    /// Returns `false` if `index >= size()`.
    fn remove(&self, index: usize) -> bool;

    /// Append an element.
    fn push(&self, item: T);

    /// Remove and return the last element.
    fn pop(&self) -> Option<T>;

    /// Drop every element.
    fn clear(&self);
}

/// Retry bookkeeping for one invocation of a lock-free operation.
#[derive(Debug)]
pub(crate) struct Contention<'c> {
    operation: &'static str,
    config: &'c Config,
    attempts: usize,
    backoff: Backoff,
}

impl<'c> Contention<'c> {
    pub(crate) fn new(operation: &'static str, config: &'c Config) -> Self {
        Contention {
            operation,
            config,
            attempts: 0,
            backoff: Backoff::new(),
        }
    }

    /// Record a failed attempt before looping again.
    pub(crate) fn retry(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
        if self.attempts == self.config.contention_threshold() {
            crate::warn!(
                "{} retried {} times under contention",
                self.operation,
                self.attempts
            );
        }
        if self.config.backoff() {
            self.backoff.spin();
        } else {
            std::hint::spin_loop();
        }
    }

    #[cfg(test)]
    pub(crate) fn attempts(&self) -> usize {
        self.attempts
    }
}

/// Install a `tracing` subscriber printing thread names and line numbers.
///
/// Calling it more than once, or after another subscriber was installed, is harmless.
#[cfg(feature = "log")]
pub fn init_log() {
    let _ = tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_line_number(true)
        .with_timer(tracing_subscriber::fmt::time::OffsetTime::new(
            time::UtcOffset::UTC,
            time::format_description::well_known::Rfc3339,
        ))
        .try_init();
    crate::info!("simple-lockfree log initialized");
}
