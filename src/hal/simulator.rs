// src/hal/simulator.rs
//! Simulated ADC source
//!
//! Stands in for the hardware driver during development and testing: an
//! autonomous producer thread writes a synthetic waveform into a shared
//! region at the configured sample interval and advances a write-position
//! counter, exactly the contract the acquisition engine observes. The
//! region is a vector of atomics so the producer and the engine never
//! race in the language sense; per-sample tearing cannot occur.

use crate::config::constants::hardware::BYTES_PER_SAMPLE;
use crate::config::constants::signal::ADC_FULL_SCALE;
use crate::hal::traits::SampleSource;
use crate::hal::types::{CaptureConfig, SourceError, SourceInfo, StepConfig};
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// Interval of the producer thread's write bursts
const TICK: Duration = Duration::from_millis(1);

/// Waveform written by the simulated producer
#[derive(Debug, Clone, PartialEq)]
pub enum SignalPattern {
    /// Sample value equals the low 16 bits of the absolute write count.
    /// Exact and verifiable; used by tests that check copied data
    /// against hardware progress. Deliberately exceeds the 12-bit range
    /// a real converter produces.
    Ramp,
    /// Sine around the 12-bit midpoint with additive uniform noise,
    /// clamped to the converter's full scale
    Sine {
        /// Waveform frequency in Hz
        frequency_hz: f64,
        /// Peak amplitude in ADC counts
        amplitude: u16,
        /// Peak noise excursion in ADC counts
        noise: u16,
    },
}

impl Default for SignalPattern {
    fn default() -> Self {
        SignalPattern::Sine {
            frequency_hz: 10.0,
            amplitude: 800,
            noise: 20,
        }
    }
}

/// Simulated source configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Size of the simulated driver region in bytes
    pub region_size_bytes: usize,
    /// Waveform the producer writes
    pub pattern: SignalPattern,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            region_size_bytes: crate::config::constants::hardware::DEFAULT_REGION_BYTES,
            pattern: SignalPattern::default(),
        }
    }
}

/// Shared state between the simulator handle and its producer thread
struct Region {
    samples: Vec<AtomicU16>,
    write_index: AtomicUsize,
}

impl Region {
    fn new(len: usize) -> Self {
        let mut samples = Vec::with_capacity(len);
        samples.resize_with(len, || AtomicU16::new(0));
        Self {
            samples,
            write_index: AtomicUsize::new(0),
        }
    }

    /// Store one sample, then publish the advanced write index. The
    /// release store pairs with the acquire load in `write_index()` so a
    /// reader that sees the new index also sees the sample.
    fn write_next(&self, value: u16, region_len: usize) {
        let idx = self.write_index.load(Ordering::Relaxed);
        self.samples[idx].store(value, Ordering::Relaxed);
        self.write_index
            .store((idx + 1) % region_len, Ordering::Release);
    }
}

/// Thread-backed simulated ADC
pub struct SimulatedAdc {
    config: SimulatorConfig,
    region: Arc<Region>,
    running: Arc<AtomicBool>,
    producer: Option<JoinHandle<()>>,
    steps: Vec<StepConfig>,
    capture: Option<CaptureConfig>,
}

impl SimulatedAdc {
    /// Create a simulated source.
    ///
    /// Fails (the creation error indicator of the driver contract) when
    /// the region size cannot hold a double buffer of 16-bit samples.
    pub fn new(config: SimulatorConfig) -> Result<Self, SourceError> {
        if config.region_size_bytes == 0 || config.region_size_bytes % (2 * BYTES_PER_SAMPLE) != 0
        {
            return Err(SourceError::new(format!(
                "region size {} is not a positive multiple of {}",
                config.region_size_bytes,
                2 * BYTES_PER_SAMPLE
            )));
        }
        let region_samples = config.region_size_bytes / BYTES_PER_SAMPLE;
        Ok(Self {
            config,
            region: Arc::new(Region::new(region_samples)),
            running: Arc::new(AtomicBool::new(false)),
            producer: None,
            steps: Vec::new(),
            capture: None,
        })
    }

    /// Stop the producer thread and wait for it to exit
    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.producer.take() {
            let _ = handle.join();
        }
    }
}

impl SampleSource for SimulatedAdc {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "simulated-adc".to_string(),
            region_size_bytes: self.config.region_size_bytes,
        }
    }

    fn region_size_bytes(&self) -> usize {
        self.config.region_size_bytes
    }

    fn configure_step(&mut self, step: StepConfig) -> Result<(), SourceError> {
        if self.producer.is_some() {
            return Err(SourceError::new("capture already started"));
        }
        if step.step == 0 {
            return Err(SourceError::new("step 0 is the charging step"));
        }
        if self.steps.iter().any(|s| s.step == step.step) {
            return Err(SourceError::new(format!(
                "step {} configured twice",
                step.step
            )));
        }
        self.steps.push(step);
        Ok(())
    }

    fn configure(&mut self, capture: CaptureConfig) -> Result<(), SourceError> {
        if self.producer.is_some() {
            return Err(SourceError::new("capture already started"));
        }
        if self.steps.is_empty() {
            return Err(SourceError::new("no steps configured"));
        }
        if capture.active_steps() as usize != self.steps.len() {
            return Err(SourceError::new(format!(
                "mask encodes {} steps but {} are configured",
                capture.active_steps(),
                self.steps.len()
            )));
        }
        if capture.sample_interval_ns == 0 {
            return Err(SourceError::new("sample interval must be non-zero"));
        }
        let requested = (capture.samples_per_step * capture.active_steps()) as usize;
        let available = self.config.region_size_bytes / BYTES_PER_SAMPLE;
        if requested == 0 || requested > available {
            return Err(SourceError::new(format!(
                "capture length {} exceeds region of {} samples",
                requested, available
            )));
        }
        self.capture = Some(capture);
        Ok(())
    }

    fn start_capture(&mut self) -> Result<(), SourceError> {
        if self.producer.is_some() {
            return Err(SourceError::new("capture already started"));
        }
        let capture = self
            .capture
            .ok_or_else(|| SourceError::new("configure() not called"))?;
        let region_len = (capture.samples_per_step * capture.active_steps()) as usize;
        let interval_ns = capture.sample_interval_ns as u64;
        let pattern = self.config.pattern.clone();
        let region = Arc::clone(&self.region);
        let running = Arc::clone(&self.running);

        self.running.store(true, Ordering::Release);
        debug!(region_len, interval_ns, "starting simulated capture");

        let handle = thread::Builder::new()
            .name("sim-adc-producer".to_string())
            .spawn(move || {
                let mut rng = rand::thread_rng();
                let mut absolute: u64 = 0;
                // Paced off measured elapsed time, carrying the
                // sub-sample remainder, so the average rate stays exact
                // even when the thread oversleeps.
                let mut backlog_ns: u64 = 0;
                let mut last = std::time::Instant::now();
                while running.load(Ordering::Acquire) {
                    thread::sleep(TICK);
                    let now = std::time::Instant::now();
                    backlog_ns += (now - last).as_nanos() as u64;
                    last = now;
                    let due = backlog_ns / interval_ns;
                    backlog_ns %= interval_ns;
                    for _ in 0..due {
                        let value = match &pattern {
                            SignalPattern::Ramp => (absolute & 0xFFFF) as u16,
                            SignalPattern::Sine {
                                frequency_hz,
                                amplitude,
                                noise,
                            } => {
                                let t = absolute as f64 * interval_ns as f64 / 1e9;
                                let mid = (ADC_FULL_SCALE as f64 + 1.0) / 2.0;
                                let wave = mid
                                    + *amplitude as f64
                                        * (2.0 * std::f64::consts::PI * frequency_hz * t).sin();
                                let jitter = if *noise > 0 {
                                    rng.gen_range(-(*noise as i32)..=*noise as i32)
                                } else {
                                    0
                                };
                                (wave as i64 + jitter as i64).clamp(0, ADC_FULL_SCALE as i64)
                                    as u16
                            }
                        };
                        region.write_next(value, region_len);
                        absolute += 1;
                    }
                }
            })
            .map_err(|e| SourceError::new(format!("producer spawn failed: {}", e)))?;

        self.producer = Some(handle);
        Ok(())
    }

    fn copy_region(&self, offset: usize, dst: &mut [u16]) {
        // Acquire pairs with the producer's release publish
        let _ = self.region.write_index.load(Ordering::Acquire);
        for (i, slot) in dst.iter_mut().enumerate() {
            *slot = self.region.samples[offset + i].load(Ordering::Relaxed);
        }
    }

    fn write_index(&self) -> usize {
        self.region.write_index.load(Ordering::Acquire)
    }
}

impl Drop for SimulatedAdc {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(region_size_bytes: usize) -> SimulatedAdc {
        let mut adc = SimulatedAdc::new(SimulatorConfig {
            region_size_bytes,
            pattern: SignalPattern::Ramp,
        })
        .unwrap();
        adc.configure_step(StepConfig::for_channel(0)).unwrap();
        adc.configure(CaptureConfig {
            samples_per_step: (region_size_bytes / BYTES_PER_SAMPLE) as u32,
            step_mask: 1 << 1,
            sample_interval_ns: 1_000_000,
        })
        .unwrap();
        adc
    }

    #[test]
    fn test_creation_rejects_bad_region_size() {
        assert!(SimulatedAdc::new(SimulatorConfig {
            region_size_bytes: 0,
            ..Default::default()
        })
        .is_err());
        assert!(SimulatedAdc::new(SimulatorConfig {
            region_size_bytes: 6,
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_charging_step_rejected() {
        let mut adc = SimulatedAdc::new(SimulatorConfig::default()).unwrap();
        let bad = StepConfig {
            step: 0,
            ..StepConfig::for_channel(0)
        };
        assert!(adc.configure_step(bad).is_err());
    }

    #[test]
    fn test_configure_requires_steps() {
        let mut adc = SimulatedAdc::new(SimulatorConfig::default()).unwrap();
        let err = adc
            .configure(CaptureConfig {
                samples_per_step: 16,
                step_mask: 1 << 1,
                sample_interval_ns: 1_000_000,
            })
            .unwrap_err();
        assert!(err.to_string().contains("no steps"));
    }

    #[test]
    fn test_capture_rejects_oversized_length() {
        let mut adc = SimulatedAdc::new(SimulatorConfig {
            region_size_bytes: 64,
            ..Default::default()
        })
        .unwrap();
        adc.configure_step(StepConfig::for_channel(0)).unwrap();
        assert!(adc
            .configure(CaptureConfig {
                samples_per_step: 1_000,
                step_mask: 1 << 1,
                sample_interval_ns: 1_000_000,
            })
            .is_err());
    }

    #[test]
    fn test_start_requires_configure() {
        let mut adc = SimulatedAdc::new(SimulatorConfig::default()).unwrap();
        adc.configure_step(StepConfig::for_channel(0)).unwrap();
        assert!(adc.start_capture().is_err());
    }

    #[test]
    fn test_producer_advances_and_wraps() {
        let mut adc = configured(64); // 32-sample capture at 1 kHz
        adc.start_capture().unwrap();

        // 32 samples at 1 ms each fill the region in ~32 ms. Poll until
        // slot 0 has been overwritten by a later lap of the ramp, which
        // proves the write position wrapped.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        let mut chunk = [0u16; 8];
        loop {
            adc.copy_region(0, &mut chunk);
            if chunk[0] >= 32 {
                break;
            }
            assert!(
                std::time::Instant::now() < deadline,
                "producer never wrapped: {chunk:?}"
            );
            thread::sleep(Duration::from_millis(5));
        }
        // The counter itself always stays within the capture length
        assert!(adc.write_index() < 32);
        adc.shutdown();
    }

    #[test]
    fn test_double_start_rejected() {
        let mut adc = configured(64);
        adc.start_capture().unwrap();
        assert!(adc.start_capture().is_err());
        adc.shutdown();
    }
}
