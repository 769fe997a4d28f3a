/// Constructs an event at the trace level.
///
/// Helping and waiting events are hot, so they are compiled out of release builds.
#[allow(unused_macros)]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(all(debug_assertions, feature = "log"))]
        tracing::trace!($($arg)*);
    }
}

/// Constructs an event at the info level.
#[allow(unused_macros)]
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        tracing::info!($($arg)*);
    }
}

/// Constructs an event at the warn level.
#[allow(unused_macros)]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        tracing::warn!($($arg)*);
    }
}
