// src/hal/tests.rs
//! HAL unit tests and the mock source shared by engine/session tests

use crate::hal::traits::SampleSource;
use crate::hal::types::{CaptureConfig, SourceError, SourceInfo, StepConfig};
use std::sync::atomic::{AtomicU16, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

struct MockInner {
    region: Vec<AtomicU16>,
    write_index: AtomicUsize,
    absolute: AtomicU64,
}

/// Deterministic in-memory source: hardware progress only happens when
/// a test pushes it, so engine behavior can be observed step by step.
/// Written samples follow the same ramp pattern as the simulator.
pub(crate) struct MockSource {
    inner: Arc<MockInner>,
    region_samples: usize,
    fail_step: bool,
    fail_configure: bool,
    fail_start: bool,
}

/// Test-side handle driving a [`MockSource`]'s write position
pub(crate) struct MockController {
    inner: Arc<MockInner>,
    region_samples: usize,
}

impl MockSource {
    pub(crate) fn new(region_samples: usize) -> Self {
        let mut region = Vec::with_capacity(region_samples);
        region.resize_with(region_samples, || AtomicU16::new(0));
        Self {
            inner: Arc::new(MockInner {
                region,
                write_index: AtomicUsize::new(0),
                absolute: AtomicU64::new(0),
            }),
            region_samples,
            fail_step: false,
            fail_configure: false,
            fail_start: false,
        }
    }

    pub(crate) fn failing_step(mut self) -> Self {
        self.fail_step = true;
        self
    }

    pub(crate) fn failing_configure(mut self) -> Self {
        self.fail_configure = true;
        self
    }

    pub(crate) fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub(crate) fn controller(&self) -> MockController {
        MockController {
            inner: Arc::clone(&self.inner),
            region_samples: self.region_samples,
        }
    }
}

impl MockController {
    /// Produce `count` ramp samples, advancing the write counter
    pub(crate) fn push(&self, count: usize) {
        for _ in 0..count {
            let absolute = self.inner.absolute.fetch_add(1, Ordering::Relaxed);
            let idx = self.inner.write_index.load(Ordering::Relaxed);
            self.inner.region[idx].store((absolute & 0xFFFF) as u16, Ordering::Relaxed);
            self.inner
                .write_index
                .store((idx + 1) % self.region_samples, Ordering::Release);
        }
    }
}

impl SampleSource for MockSource {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "mock".to_string(),
            region_size_bytes: self.region_size_bytes(),
        }
    }

    fn region_size_bytes(&self) -> usize {
        self.region_samples * 2
    }

    fn configure_step(&mut self, _step: StepConfig) -> Result<(), SourceError> {
        if self.fail_step {
            return Err(SourceError::new("injected step failure"));
        }
        Ok(())
    }

    fn configure(&mut self, _capture: CaptureConfig) -> Result<(), SourceError> {
        if self.fail_configure {
            return Err(SourceError::new("injected configure failure"));
        }
        Ok(())
    }

    fn start_capture(&mut self) -> Result<(), SourceError> {
        if self.fail_start {
            return Err(SourceError::new("injected start failure"));
        }
        Ok(())
    }

    fn copy_region(&self, offset: usize, dst: &mut [u16]) {
        let _ = self.inner.write_index.load(Ordering::Acquire);
        for (i, slot) in dst.iter_mut().enumerate() {
            *slot = self.inner.region[offset + i].load(Ordering::Relaxed);
        }
    }

    fn write_index(&self) -> usize {
        self.inner.write_index.load(Ordering::Acquire)
    }
}

mod unit {
    use super::*;

    #[test]
    fn test_mock_push_advances_counter_and_wraps() {
        let mock = MockSource::new(8);
        let control = mock.controller();

        control.push(5);
        assert_eq!(mock.write_index(), 5);

        control.push(5);
        // 10 mod 8
        assert_eq!(mock.write_index(), 2);
    }

    #[test]
    fn test_mock_ramp_values_are_absolute() {
        let mock = MockSource::new(8);
        let control = mock.controller();
        control.push(10);

        // Slots 0 and 1 were overwritten by samples 8 and 9
        let mut out = [0u16; 4];
        mock.copy_region(0, &mut out);
        assert_eq!(out, [8, 9, 2, 3]);
    }

    #[test]
    fn test_source_is_object_safe() {
        let source: Box<dyn SampleSource> = Box::new(MockSource::new(8));
        assert_eq!(source.region_size_bytes(), 16);
        assert_eq!(source.info().name, "mock");
    }

    #[test]
    fn test_injected_failures_surface() {
        let mut source = MockSource::new(8).failing_step();
        assert!(source.configure_step(StepConfig::for_channel(0)).is_err());

        let mut source = MockSource::new(8).failing_configure();
        assert!(source
            .configure(CaptureConfig {
                samples_per_step: 8,
                step_mask: 0b10,
                sample_interval_ns: 1_000_000,
            })
            .is_err());

        let mut source = MockSource::new(8).failing_start();
        assert!(source.start_capture().is_err());
    }
}
