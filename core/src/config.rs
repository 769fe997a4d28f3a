use crate::common::constants::{DEFAULT_BACKOFF, DEFAULT_CONTENTION_THRESHOLD};

/// Tuning shared by every container's retry loop.
///
/// # Examples
///
/// ```
/// use simple_lockfree_core::{Config, MsQueue};
///
/// let mut config = Config::default();
/// _ = config.set_backoff(false).set_contention_threshold(64);
/// let queue = MsQueue::with_config(config);
/// queue.enqueue(1);
/// assert_eq!(queue.config().contention_threshold(), 64);
/// assert_eq!(queue.dequeue(), Some(1));
/// ```
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Config {
    backoff: bool,
    contention_threshold: usize,
}

impl Config {
    /// Create a new `Config`.
    ///
    /// # Panics
    /// if `contention_threshold` is 0.
    #[must_use]
    pub fn new(backoff: bool, contention_threshold: usize) -> Self {
        let mut config = Self {
            backoff,
            contention_threshold: DEFAULT_CONTENTION_THRESHOLD,
        };
        _ = config.set_contention_threshold(contention_threshold);
        config
    }

    /// Whether a failed attempt spins with exponential backoff before retrying.
    #[must_use]
    pub fn backoff(&self) -> bool {
        self.backoff
    }

    /// Number of retries of one operation after which a warning is logged.
    #[must_use]
    pub fn contention_threshold(&self) -> usize {
        self.contention_threshold
    }

    /// Enable or disable the spin backoff between retries.
    pub fn set_backoff(&mut self, backoff: bool) -> &mut Self {
        self.backoff = backoff;
        self
    }

    /// Set the contention warning threshold.
    ///
    /// # Panics
    /// if `contention_threshold` is 0.
    pub fn set_contention_threshold(&mut self, contention_threshold: usize) -> &mut Self {
        assert!(
            contention_threshold > 0,
            "contention_threshold must be greater than 0"
        );
        self.contention_threshold = contention_threshold;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF, DEFAULT_CONTENTION_THRESHOLD)
    }
}
