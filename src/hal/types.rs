// src/hal/types.rs
//! Core types for the ADC source abstraction

use crate::config::constants::hardware;
use thiserror::Error;

/// Error string reported by a sample source.
///
/// Mirrors the driver contract: every configuration call either
/// succeeds or carries an associated reason. The session layer wraps
/// these into [`AcquisitionError`](crate::error::AcquisitionError)
/// variants that say which call failed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct SourceError(pub String);

impl SourceError {
    /// Build an error from any displayable reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// A source that fails to come up maps onto the creation-failure arm of
/// the session error taxonomy
impl From<SourceError> for crate::error::AcquisitionError {
    fn from(err: SourceError) -> Self {
        crate::error::AcquisitionError::DriverCreation { reason: err.0 }
    }
}

/// Source identity and fixed properties, exposed at creation
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    /// Human-readable source name
    pub name: String,
    /// Size of the driver-owned sample region in bytes
    pub region_size_bytes: usize,
}

/// Configuration of one hardware sampling step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepConfig {
    /// Hardware step index; step 0 is the charging step and is never used
    pub step: u32,
    /// Input channel index routed to this step
    pub channel: u32,
    /// Hardware averaging setting
    pub averaging: u32,
    /// Sample delay in ADC clock cycles
    pub sample_delay: u32,
    /// Open delay in ADC clock cycles
    pub open_delay: u32,
}

impl StepConfig {
    /// Default step layout for the `index`-th active channel: steps start
    /// at 1, channels at AIN0, no averaging or delays.
    pub fn for_channel(index: u32) -> Self {
        Self {
            step: hardware::FIRST_STEP + index,
            channel: hardware::FIRST_CHANNEL + index,
            averaging: hardware::DEFAULT_AVERAGING,
            sample_delay: hardware::DEFAULT_SAMPLE_DELAY,
            open_delay: hardware::DEFAULT_OPEN_DELAY,
        }
    }
}

/// Parameters of the circular-capture configuration call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureConfig {
    /// Samples per step held in the driver region
    pub samples_per_step: u32,
    /// Bitmask of active hardware steps
    pub step_mask: u32,
    /// Duration of one sample in nanoseconds
    pub sample_interval_ns: u32,
}

impl CaptureConfig {
    /// Number of active steps encoded in the mask
    pub fn active_steps(&self) -> u32 {
        self.step_mask.count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_layout_skips_charging_step() {
        let step = StepConfig::for_channel(0);
        assert_eq!(step.step, 1);
        assert_eq!(step.channel, 0);

        let step = StepConfig::for_channel(2);
        assert_eq!(step.step, 3);
        assert_eq!(step.channel, 2);
    }

    #[test]
    fn test_active_steps_counts_mask_bits() {
        let capture = CaptureConfig {
            samples_per_step: 1024,
            step_mask: 0b0110,
            sample_interval_ns: 1_000_000,
        };
        assert_eq!(capture.active_steps(), 2);
    }
}
