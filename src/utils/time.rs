use crate::config::constants::timing::NANOS_PER_SEC;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Time provider trait for dependency injection and testing
pub trait TimeProvider: Send + Sync {
    /// Current time in nanoseconds
    fn now_nanos(&self) -> u64;

    /// Current time in microseconds
    fn now_micros(&self) -> u64 {
        self.now_nanos() / 1000
    }
}

/// System time provider using the actual system clock
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_nanos(&self) -> u64 {
        current_timestamp_nanos()
    }
}

/// Mock time provider for deterministic testing
pub struct MockTimeProvider {
    current_time: AtomicU64,
}

impl MockTimeProvider {
    /// Create a mock clock starting at the given nanosecond timestamp
    pub fn new(initial_time_nanos: u64) -> Self {
        Self {
            current_time: AtomicU64::new(initial_time_nanos),
        }
    }

    /// Advance the mock clock
    pub fn advance_by(&self, nanos: u64) {
        self.current_time.fetch_add(nanos, Ordering::Relaxed);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_nanos(&self) -> u64 {
        self.current_time.load(Ordering::Relaxed)
    }
}

/// Wall-clock timestamp in nanoseconds since the Unix epoch
pub fn current_timestamp_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Duration of one sample at the given rate, in nanoseconds.
///
/// Returns `None` when the rate does not divide one second exactly;
/// callers that require bit-exact sizing must treat that as an error
/// rather than rounding.
pub fn sample_interval_nanos(sample_rate_hz: u32) -> Option<u64> {
    if sample_rate_hz == 0 || NANOS_PER_SEC % sample_rate_hz as u64 != 0 {
        return None;
    }
    Some(NANOS_PER_SEC / sample_rate_hz as u64)
}
