use once_cell::sync::Lazy;

/// Retries of a single operation after which a contention warning is logged.
pub const DEFAULT_CONTENTION_THRESHOLD: usize = 1024;

/// Whether retry loops spin with exponential backoff by default.
pub const DEFAULT_BACKOFF: bool = true;

/// Get the cpu count
#[must_use]
pub fn cpu_count() -> usize {
    static CPU_COUNT: Lazy<usize> = Lazy::new(num_cpus::get);
    *CPU_COUNT
}
