//! EMG-Acquisition: real-time EMG sample acquisition core for prosthetic control
//!
//! This library continuously pulls analog samples from an ADC that writes
//! into a driver-owned circular region, and makes recent samples available
//! to a consumer with bounded latency. It features:
//!
//! - A background acquisition engine that tracks the hardware write
//!   position and copies fixed-size chunks without tearing
//! - A lock-guarded public sample buffer addressed by absolute index
//! - Free-running, display-paced, and externally-paced synchronization
//! - An explicit session lifecycle with fail-closed initialization
//! - A sample-source seam with a thread-backed simulator for development
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use emg_acquisition::config::AcquisitionConfig;
//! use emg_acquisition::hal::simulator::{SimulatedAdc, SimulatorConfig};
//! use emg_acquisition::acquisition::AcquisitionSession;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Bind a session to a simulated ADC
//!     let source = SimulatedAdc::new(SimulatorConfig::default())?;
//!     let config = AcquisitionConfig::default();
//!     let mut session = AcquisitionSession::new(config, Box::new(source))?;
//!
//!     // Acquire for a while
//!     session.start()?;
//!     std::thread::sleep(std::time::Duration::from_millis(200));
//!
//!     // Read the freshest chunk under the shared lock
//!     let mut window = vec![0u16; session.geometry().chunk_samples];
//!     session.read_latest(&mut window);
//!
//!     session.stop()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod acquisition;
pub mod config;
pub mod error;
pub mod hal;
pub mod utils;

// Re-export commonly used types for convenience
pub use acquisition::{
    AcquisitionMetrics, AcquisitionSession, DisplayHandle, ExternalPermit, PublicBuffer,
    SessionGeometry, SessionState, SyncMode,
};
pub use config::AcquisitionConfig;
pub use error::{AcquisitionError, Result};
pub use hal::{CaptureConfig, SampleSource, SourceError, SourceInfo, StepConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
