// src/config/mod.rs
//! Configuration management for the acquisition core

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use crate::acquisition::SyncMode;
use crate::utils::validation::{
    validate_channel_count, validate_latency_ms, validate_sample_rate, ValidationError,
    ValidationResult,
};
use serde::{Deserialize, Serialize};

/// Complete configuration of one acquisition session
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AcquisitionConfig {
    /// Number of active ADC channels
    #[serde(default = "defaults::channel_count")]
    pub channel_count: usize,

    /// Acquisition rate in Hz
    #[serde(default = "defaults::sample_rate_hz")]
    pub sample_rate_hz: u32,

    /// Target latency between acquisition and availability, in ms
    #[serde(default = "defaults::latency_ms")]
    pub latency_ms: u32,

    /// Seconds of acquisition held in the public buffer
    #[serde(default = "defaults::seconds_in_buffer")]
    pub seconds_in_buffer: u32,

    /// Synchronization policy pacing the engine against a consumer
    #[serde(default = "defaults::sync_mode")]
    pub sync_mode: SyncMode,

    /// Interval of the hardware-progress poll loop, in ms
    #[serde(default = "defaults::poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Default value providers using constants
mod defaults {
    use crate::acquisition::SyncMode;
    use crate::config::constants::{performance, signal};

    pub fn channel_count() -> usize {
        signal::DEFAULT_CHANNEL_COUNT
    }
    pub fn sample_rate_hz() -> u32 {
        signal::DEFAULT_SAMPLE_RATE_HZ
    }
    pub fn latency_ms() -> u32 {
        performance::DEFAULT_LATENCY_MS
    }
    pub fn seconds_in_buffer() -> u32 {
        signal::DEFAULT_SECONDS_IN_BUFFER
    }
    pub fn sync_mode() -> SyncMode {
        SyncMode::Free
    }
    pub fn poll_interval_ms() -> u64 {
        performance::DEFAULT_POLL_INTERVAL_MS
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            channel_count: defaults::channel_count(),
            sample_rate_hz: defaults::sample_rate_hz(),
            latency_ms: defaults::latency_ms(),
            seconds_in_buffer: defaults::seconds_in_buffer(),
            sync_mode: defaults::sync_mode(),
            poll_interval_ms: defaults::poll_interval_ms(),
        }
    }
}

impl AcquisitionConfig {
    /// Validate all parameter ranges.
    ///
    /// This checks each field in isolation; the cross-field sizing rules
    /// (chunk divisibility, half-buffer bound) depend on the hardware
    /// region size and are enforced when the session is created.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_sample_rate(self.sample_rate_hz)?;
        validate_channel_count(self.channel_count)?;
        validate_latency_ms(self.latency_ms)?;

        if self.seconds_in_buffer == 0 {
            return Err(ValidationError::OutOfRange {
                field: "seconds_in_buffer",
                value: self.seconds_in_buffer.to_string(),
                min: 1.to_string(),
                max: u32::MAX.to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ValidationError::OutOfRange {
                field: "poll_interval_ms",
                value: self.poll_interval_ms.to_string(),
                min: 1.to_string(),
                max: u64::MAX.to_string(),
            });
        }
        Ok(())
    }

    /// Capacity of the public buffer in samples
    pub fn public_capacity(&self) -> usize {
        self.seconds_in_buffer as usize * self.sample_rate_hz as usize * self.channel_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AcquisitionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate_hz, 1_000);
        assert_eq!(config.channel_count, 1);
        assert_eq!(config.sync_mode, SyncMode::Free);
    }

    #[test]
    fn test_public_capacity_default() {
        let config = AcquisitionConfig::default();
        // 4 s * 1000 Hz * 1 channel
        assert_eq!(config.public_capacity(), 4_000);
    }

    #[test]
    fn test_serde_round_trip() {
        let config = AcquisitionConfig {
            sync_mode: SyncMode::Display,
            latency_ms: 20,
            ..Default::default()
        };
        let text = toml::to_string(&config).unwrap();
        let back: AcquisitionConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AcquisitionConfig = toml::from_str("latency_ms = 25\n").unwrap();
        assert_eq!(config.latency_ms, 25);
        assert_eq!(config.sample_rate_hz, 1_000);
        assert_eq!(config.sync_mode, SyncMode::Free);
    }

    #[test]
    fn test_zero_fields_rejected() {
        let mut config = AcquisitionConfig::default();
        config.seconds_in_buffer = 0;
        assert!(config.validate().is_err());

        let mut config = AcquisitionConfig::default();
        config.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AcquisitionConfig::default();
        config.channel_count = 0;
        assert!(config.validate().is_err());
    }
}
