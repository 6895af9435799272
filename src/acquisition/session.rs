// src/acquisition/session.rs
//! Acquisition session: sizing, lifecycle, and consumer access
//!
//! One [`AcquisitionSession`] per running acquisition. Construction
//! binds to a [`SampleSource`], derives the sizing relationships, and
//! fails closed on any inconsistency; `start`/`stop` drive the explicit
//! `Ready → Running → Stopped` state machine.

use crate::acquisition::buffer::PublicBuffer;
use crate::acquisition::engine::{self, EngineContext};
use crate::acquisition::sync::{DisplayHandle, ExternalPermit, SyncSignals};
use crate::config::constants::hardware::BYTES_PER_SAMPLE;
use crate::config::constants::timing::NANOS_PER_MS;
use crate::config::AcquisitionConfig;
use crate::error::{AcquisitionError, Result};
use crate::hal::{CaptureConfig, SampleSource, StepConfig};
use crate::utils::time::sample_interval_nanos;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initialized and bound to a source; engine not yet running
    Ready,
    /// Engine thread running
    Running,
    /// Engine stopped; the session is spent
    Stopped,
}

impl SessionState {
    fn as_str(self) -> &'static str {
        match self {
            SessionState::Ready => "ready",
            SessionState::Running => "running",
            SessionState::Stopped => "stopped",
        }
    }
}

/// Derived sizing of one session.
///
/// All positions are sample offsets into the abstract index space
/// `[region_start, region_end)`; raw region addresses never appear.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionGeometry {
    /// Number of active channels
    pub channel_count: usize,
    /// Acquisition rate in Hz
    pub sample_rate_hz: u32,
    /// Duration of one sample in nanoseconds
    pub sample_interval_ns: u64,
    /// Bitmask of active hardware steps
    pub channel_mask: u32,
    /// Upper bound on samples produced per second across channels
    pub total_index_per_second: usize,
    /// Samples in one half of the hardware double buffer
    pub half_samples: usize,
    /// Samples per step handed to the driver configuration call
    pub samples_per_step: u32,
    /// First valid sample offset of the hardware region
    pub region_start: usize,
    /// One past the last valid sample offset of the hardware region
    pub region_end: usize,
    /// Samples copied per acquisition iteration
    pub chunk_samples: usize,
    /// Capacity of the public buffer in samples
    pub public_capacity: usize,
}

impl SessionGeometry {
    /// Derive the session sizing from configuration and the size of the
    /// source's region. Every relationship must hold bit-for-bit; any
    /// mismatch is a fatal initialization error.
    pub fn derive(config: &AcquisitionConfig, region_size_bytes: usize) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AcquisitionError::Configuration {
                field: e.field(),
                reason: e.to_string(),
            })?;

        let channel_count = config.channel_count;
        let sample_interval_ns = sample_interval_nanos(config.sample_rate_hz).ok_or_else(|| {
            AcquisitionError::Sizing {
                field: "sample_interval_ns",
                reason: format!(
                    "one second is not an integer multiple of the {} Hz sample interval",
                    config.sample_rate_hz
                ),
            }
        })?;

        // Samples per latency window; the division must be exact or the
        // copied chunks drift against the latency target.
        let chunk_nanos = config.latency_ms as u64 * NANOS_PER_MS * channel_count as u64;
        if chunk_nanos % sample_interval_ns != 0 {
            return Err(AcquisitionError::Sizing {
                field: "chunk_samples",
                reason: format!(
                    "latency of {} ms is not a whole number of {} ns samples",
                    config.latency_ms, sample_interval_ns
                ),
            });
        }
        let chunk_samples = (chunk_nanos / sample_interval_ns) as usize;
        if chunk_samples == 0 {
            return Err(AcquisitionError::Sizing {
                field: "chunk_samples",
                reason: format!(
                    "latency of {} ms holds no samples at {} Hz",
                    config.latency_ms, config.sample_rate_hz
                ),
            });
        }

        let total_index_per_second = config.sample_rate_hz as usize * channel_count;

        // One half of the hardware double buffer, truncated to whole
        // per-channel scans.
        let region_samples = region_size_bytes / BYTES_PER_SAMPLE;
        let half_samples = ((region_samples / 2) / channel_count) * channel_count;
        if half_samples == 0 {
            return Err(AcquisitionError::Sizing {
                field: "half_samples",
                reason: format!(
                    "region of {} bytes holds no half buffer for {} channels",
                    region_size_bytes, channel_count
                ),
            });
        }
        if half_samples > total_index_per_second {
            return Err(AcquisitionError::Sizing {
                field: "half_samples",
                reason: format!(
                    "half buffer of {} samples exceeds the per-second bound of {}",
                    half_samples, total_index_per_second
                ),
            });
        }

        // A chunk must fit inside one half: the engine reads from one
        // half while the hardware fills the other, and the wrap-wait
        // protocol relies on that separation.
        if chunk_samples > half_samples {
            return Err(AcquisitionError::Sizing {
                field: "chunk_samples",
                reason: format!(
                    "chunk of {} samples exceeds the {}-sample half buffer",
                    chunk_samples, half_samples
                ),
            });
        }

        let region_len = half_samples * 2;
        if region_len % chunk_samples != 0 {
            return Err(AcquisitionError::Sizing {
                field: "region_len",
                reason: format!(
                    "region of {} samples does not divide into {}-sample chunks",
                    region_len, chunk_samples
                ),
            });
        }

        let public_capacity = config.public_capacity();
        if public_capacity % chunk_samples != 0 {
            return Err(AcquisitionError::Sizing {
                field: "public_capacity",
                reason: format!(
                    "public buffer of {} samples does not divide into {}-sample chunks",
                    public_capacity, chunk_samples
                ),
            });
        }

        // Step bits start at 1; bit 0 is the charging step
        let channel_mask = (0..channel_count as u32).fold(0u32, |mask, i| mask | 1 << (i + 1));

        Ok(Self {
            channel_count,
            sample_rate_hz: config.sample_rate_hz,
            sample_interval_ns,
            channel_mask,
            total_index_per_second,
            half_samples,
            samples_per_step: (region_len / channel_count) as u32,
            region_start: 0,
            region_end: region_len,
            chunk_samples,
            public_capacity,
        })
    }

    /// Length of the hardware region in samples
    pub fn region_len(&self) -> usize {
        self.region_end - self.region_start
    }

    /// Cursor position after one acquisition step from `read_cursor`,
    /// applying the wrap-to-start rule.
    pub fn step_target(&self, read_cursor: usize) -> usize {
        let target = read_cursor + self.chunk_samples;
        if target >= self.region_end {
            self.region_start
        } else {
            target
        }
    }
}

/// Counters shared between the engine thread and metric snapshots
#[derive(Default)]
pub(crate) struct EngineCounters {
    pub(crate) iterations: AtomicU64,
    pub(crate) chunks_copied: AtomicU64,
    pub(crate) chunks_skipped: AtomicU64,
}

/// Snapshot of the engine's progress counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionMetrics {
    /// Completed engine iterations
    pub iterations: u64,
    /// Chunks copied into the public buffer
    pub chunks_copied: u64,
    /// Chunks dropped because the buffer lock was contended
    pub chunks_skipped: u64,
}

/// One acquisition session bound to a sample source
pub struct AcquisitionSession {
    config: AcquisitionConfig,
    geometry: SessionGeometry,
    source: Arc<dyn SampleSource>,
    buffer: Arc<Mutex<PublicBuffer>>,
    signals: SyncSignals,
    stop: Arc<Mutex<bool>>,
    counters: Arc<EngineCounters>,
    state: SessionState,
    engine: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for AcquisitionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquisitionSession")
            .field("config", &self.config)
            .field("geometry", &self.geometry)
            .field("state", &self.state)
            .field("engine_running", &self.engine.is_some())
            .finish()
    }
}

impl AcquisitionSession {
    /// Initialize a session: derive sizing, configure the source's
    /// steps and capture geometry, and start the hardware capture.
    ///
    /// On any error the source is dropped and no session exists; the
    /// caller is expected not to retry without fixing the
    /// configuration.
    pub fn new(config: AcquisitionConfig, mut source: Box<dyn SampleSource>) -> Result<Self> {
        let geometry = SessionGeometry::derive(&config, source.region_size_bytes())?;

        for index in 0..geometry.channel_count as u32 {
            let step = StepConfig::for_channel(index);
            source
                .configure_step(step)
                .map_err(|e| AcquisitionError::StepConfiguration {
                    step: step.step,
                    reason: e.to_string(),
                })?;
        }

        source
            .configure(CaptureConfig {
                samples_per_step: geometry.samples_per_step,
                step_mask: geometry.channel_mask,
                sample_interval_ns: geometry.sample_interval_ns as u32,
            })
            .map_err(|e| AcquisitionError::DriverConfiguration {
                reason: e.to_string(),
            })?;

        source
            .start_capture()
            .map_err(|e| AcquisitionError::CaptureStart {
                reason: e.to_string(),
            })?;

        let buffer = Arc::new(Mutex::new(PublicBuffer::new(geometry.public_capacity)?));
        let signals = SyncSignals::for_mode(config.sync_mode);

        debug!(
            chunk = geometry.chunk_samples,
            half = geometry.half_samples,
            region = geometry.region_len(),
            capacity = geometry.public_capacity,
            "session geometry derived"
        );

        Ok(Self {
            config,
            geometry,
            source: Arc::from(source),
            buffer,
            signals,
            stop: Arc::new(Mutex::new(false)),
            counters: Arc::new(EngineCounters::default()),
            state: SessionState::Ready,
            engine: None,
        })
    }

    /// Spawn the acquisition engine. Valid only from `Ready`.
    ///
    /// Multi-channel interleaving is unverified and rejected here
    /// rather than producing silently garbled data.
    pub fn start(&mut self) -> Result<()> {
        if self.state != SessionState::Ready {
            return Err(AcquisitionError::InvalidState {
                operation: "start",
                state: self.state.as_str(),
            });
        }
        if self.geometry.channel_count > 1 {
            return Err(AcquisitionError::Unsupported(format!(
                "{} channels requested; interleaved acquisition supports exactly 1",
                self.geometry.channel_count
            )));
        }

        let context = EngineContext {
            source: Arc::clone(&self.source),
            buffer: Arc::clone(&self.buffer),
            signals: self.signals.clone_refs(),
            stop: Arc::clone(&self.stop),
            counters: Arc::clone(&self.counters),
            region_start: self.geometry.region_start,
            region_end: self.geometry.region_end,
            chunk_samples: self.geometry.chunk_samples,
            public_capacity: self.geometry.public_capacity,
            poll_interval: Duration::from_millis(self.config.poll_interval_ms),
        };

        let handle = std::thread::Builder::new()
            .name("acquisition-engine".to_string())
            .spawn(move || engine::run(context))
            .map_err(|e| AcquisitionError::ThreadSpawn {
                reason: e.to_string(),
            })?;

        self.engine = Some(handle);
        self.state = SessionState::Running;
        info!(
            mode = ?self.config.sync_mode,
            rate = self.geometry.sample_rate_hz,
            chunk = self.geometry.chunk_samples,
            "acquisition started"
        );
        Ok(())
    }

    /// Request the engine to stop and wait for it to exit. Valid only
    /// from `Running`; the wake signal guarantees a blocked engine
    /// observes the request.
    pub fn stop(&mut self) -> Result<()> {
        if self.state != SessionState::Running {
            return Err(AcquisitionError::InvalidState {
                operation: "stop",
                state: self.state.as_str(),
            });
        }

        {
            let mut stop = self.stop.lock();
            *stop = true;
        }
        self.signals.wake_for_stop();

        if let Some(handle) = self.engine.take() {
            if handle.join().is_err() {
                warn!("acquisition engine panicked before stop");
            }
        }
        self.state = SessionState::Stopped;
        info!("acquisition stopped");
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Derived sizing of this session
    pub fn geometry(&self) -> &SessionGeometry {
        &self.geometry
    }

    /// Snapshot of the engine's progress counters
    pub fn metrics(&self) -> AcquisitionMetrics {
        AcquisitionMetrics {
            iterations: self.counters.iterations.load(Ordering::Relaxed),
            chunks_copied: self.counters.chunks_copied.load(Ordering::Relaxed),
            chunks_skipped: self.counters.chunks_skipped.load(Ordering::Relaxed),
        }
    }

    /// Consumer handle for a `Display`-mode session; `None` otherwise
    pub fn display_handle(&self) -> Option<DisplayHandle> {
        match &self.signals {
            SyncSignals::Display {
                permission,
                data_ready,
            } => Some(DisplayHandle {
                permission: Arc::clone(permission),
                data_ready: Arc::clone(data_ready),
                buffer: Arc::clone(&self.buffer),
                chunk_samples: self.geometry.chunk_samples,
                capacity: self.geometry.public_capacity,
                next_offset: 0,
            }),
            _ => None,
        }
    }

    /// Grant handle for an `External`-mode session; `None` otherwise
    pub fn external_permit(&self) -> Option<ExternalPermit> {
        match &self.signals {
            SyncSignals::External { permission } => Some(ExternalPermit {
                permission: Arc::clone(permission),
            }),
            _ => None,
        }
    }

    /// Copy `out.len()` samples ending at the freshest published sample
    /// into `out`, under the shared lock.
    ///
    /// Freshness is read from the progress counters, so a chunk that
    /// lands between the counter read and the lock acquisition shifts
    /// the window by one chunk — acceptable for telemetry reads.
    pub fn read_latest(&self, out: &mut [u16]) {
        let capacity = self.geometry.public_capacity;
        let published =
            self.counters.iterations.load(Ordering::Relaxed) as usize * self.geometry.chunk_samples;
        let end = published % capacity;
        let start = (end + capacity - (out.len() % capacity)) % capacity;
        let buffer = self.buffer.lock();
        buffer.read_window(start, out);
    }

    /// Copy a window starting at absolute sample index `start`, under
    /// the shared lock
    pub fn read_window(&self, start: usize, out: &mut [u16]) {
        let buffer = self.buffer.lock();
        buffer.read_window(start, out);
    }
}

impl Drop for AcquisitionSession {
    fn drop(&mut self) {
        if self.state == SessionState::Running {
            let _ = self.stop();
        }
    }
}
