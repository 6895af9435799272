// src/error.rs
//! Unified error handling for the acquisition core
//!
//! Every fallible operation in the crate surfaces an [`AcquisitionError`].
//! Initialization and startup errors are returned synchronously to the
//! caller; there is no retry policy inside the core. Runtime copy skips
//! caused by lock contention are deliberately not errors — they show up
//! in [`AcquisitionMetrics`](crate::acquisition::AcquisitionMetrics)
//! instead.

use thiserror::Error;

/// Unified error type for the acquisition core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AcquisitionError {
    /// The hardware driver reported an error on creation
    #[error("driver creation failed: {reason}")]
    DriverCreation {
        /// Error string reported by the driver
        reason: String,
    },

    /// A per-channel step configuration call failed
    #[error("step {step} configuration failed: {reason}")]
    StepConfiguration {
        /// Hardware step index that was being configured
        step: u32,
        /// Error string reported by the driver
        reason: String,
    },

    /// The driver rejected the acquisition configuration
    #[error("driver configuration failed: {reason}")]
    DriverConfiguration {
        /// Error string reported by the driver
        reason: String,
    },

    /// The driver failed to start circular capture
    #[error("capture start failed: {reason}")]
    CaptureStart {
        /// Error string reported by the driver
        reason: String,
    },

    /// Derived buffer sizing is inconsistent with the hardware region
    #[error("sizing violation in {field}: {reason}")]
    Sizing {
        /// Which derived quantity violated its bound
        field: &'static str,
        /// Why the sizing is rejected
        reason: String,
    },

    /// A configuration value failed validation before any hardware was touched
    #[error("invalid configuration for {field}: {reason}")]
    Configuration {
        /// Offending configuration field
        field: &'static str,
        /// Why the value is rejected
        reason: String,
    },

    /// A configuration the core does not support was requested
    #[error("unsupported configuration: {0}")]
    Unsupported(String),

    /// Spawning the background acquisition thread failed
    #[error("acquisition thread spawn failed: {reason}")]
    ThreadSpawn {
        /// OS error string
        reason: String,
    },

    /// A lifecycle operation was called from the wrong state
    #[error("invalid lifecycle transition: {operation} while {state}")]
    InvalidState {
        /// The attempted operation
        operation: &'static str,
        /// The state the session was actually in
        state: &'static str,
    },
}

/// Result type alias for acquisition operations
pub type Result<T> = std::result::Result<T, AcquisitionError>;
