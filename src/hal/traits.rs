// src/hal/traits.rs
//! The sample source seam between the acquisition engine and the driver
//!
//! The hardware owns a circular sample region and a write-position
//! counter; this crate only observes both. The region never crosses the
//! seam as a pointer — callers address it by sample index and receive
//! copies, so all wrap arithmetic stays on this side of the boundary.

use crate::hal::types::{CaptureConfig, SourceError, SourceInfo, StepConfig};

/// Contract of a hardware (or simulated) ADC sample source.
///
/// Setup calls (`configure_step`, `configure`, `start_capture`) take
/// `&mut self` and happen before the acquisition engine exists; the
/// observation calls (`copy_region`, `write_index`) are `&self` and are
/// the only ones used while capture runs.
pub trait SampleSource: Send + Sync {
    /// Identity and fixed properties of this source
    fn info(&self) -> SourceInfo;

    /// Size of the driver-owned sample region in bytes
    fn region_size_bytes(&self) -> usize;

    /// Configure one hardware sampling step
    fn configure_step(&mut self, step: StepConfig) -> Result<(), SourceError>;

    /// Configure circular capture geometry and timing
    fn configure(&mut self, capture: CaptureConfig) -> Result<(), SourceError>;

    /// Start the autonomous circular capture
    fn start_capture(&mut self) -> Result<(), SourceError>;

    /// Copy `dst.len()` samples starting at sample offset `offset` out of
    /// the live region.
    ///
    /// The caller must keep `offset + dst.len()` within the configured
    /// region length; the acquisition geometry guarantees chunks never
    /// straddle the region end.
    fn copy_region(&self, offset: usize, dst: &mut [u16]);

    /// Current value of the hardware write-position counter, in samples,
    /// modulo the configured region length. Read-only progress indicator.
    fn write_index(&self) -> usize;
}
