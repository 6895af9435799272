//! Validation utilities for configuration parameters
//!
//! Range checks used by [`AcquisitionConfig`](crate::config::AcquisitionConfig)
//! and the hardware seam before any driver call is made. Limits come
//! from [`config::constants`](crate::config::constants).

use crate::config::constants::{performance, signal};
use std::fmt;

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Value out of valid range
    OutOfRange {
        /// Offending field name
        field: &'static str,
        /// The rejected value
        value: String,
        /// Inclusive lower bound
        min: String,
        /// Inclusive upper bound
        max: String,
    },
    /// A value that must divide another exactly does not
    Inexact {
        /// Offending field name
        field: &'static str,
        /// What the exactness requirement is
        requirement: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "field '{}' value {} is out of range [{}, {}]",
                    field, value, min, max
                )
            }
            ValidationError::Inexact { field, requirement } => {
                write!(f, "field '{}' violates exactness: {}", field, requirement)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// Name of the field that failed validation
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::OutOfRange { field, .. } => field,
            ValidationError::Inexact { field, .. } => field,
        }
    }
}

/// Validate an acquisition rate against the supported range
pub fn validate_sample_rate(rate_hz: u32) -> ValidationResult<()> {
    if !(signal::MIN_SAMPLE_RATE_HZ..=signal::MAX_SAMPLE_RATE_HZ).contains(&rate_hz) {
        return Err(ValidationError::OutOfRange {
            field: "sample_rate_hz",
            value: rate_hz.to_string(),
            min: signal::MIN_SAMPLE_RATE_HZ.to_string(),
            max: signal::MAX_SAMPLE_RATE_HZ.to_string(),
        });
    }
    Ok(())
}

/// Validate a channel count against the hardware's analog inputs.
///
/// Counts above one pass validation so sizing can be derived, but
/// acquisition start rejects them separately — multi-channel
/// interleaving is unsupported.
pub fn validate_channel_count(count: usize) -> ValidationResult<()> {
    if count == 0 || count > signal::MAX_CHANNEL_COUNT {
        return Err(ValidationError::OutOfRange {
            field: "channel_count",
            value: count.to_string(),
            min: 1.to_string(),
            max: signal::MAX_CHANNEL_COUNT.to_string(),
        });
    }
    Ok(())
}

/// Validate a latency target in milliseconds
pub fn validate_latency_ms(latency_ms: u32) -> ValidationResult<()> {
    if latency_ms == 0 || latency_ms > performance::MAX_LATENCY_MS {
        return Err(ValidationError::OutOfRange {
            field: "latency_ms",
            value: latency_ms.to_string(),
            min: 1.to_string(),
            max: performance::MAX_LATENCY_MS.to_string(),
        });
    }
    Ok(())
}
