//! Common utility functions for the acquisition core
//!
//! - Time and timestamp helpers with a mockable clock
//! - Configuration parameter validation
//! - ADC count and unit conversions
//!
//! All utilities take their limits and factors from
//! [`config::constants`](crate::config::constants) rather than inline
//! magic numbers.

pub mod conversion;
pub mod time;
pub mod validation;

pub use conversion::{adc_to_millivolts, bytes_to_samples, samples_to_bytes};
pub use time::{current_timestamp_nanos, sample_interval_nanos, TimeProvider};
pub use validation::{
    validate_channel_count, validate_latency_ms, validate_sample_rate, ValidationError,
    ValidationResult,
};
