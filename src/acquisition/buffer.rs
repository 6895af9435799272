// src/acquisition/buffer.rs
//! Fixed-capacity circular sample buffer shared with consumers
//!
//! Samples are addressed by absolute index modulo capacity; callers
//! never see raw storage addresses. The buffer itself is not
//! synchronized — the session wraps it in the shared buffer lock and
//! the engine is its only writer.

use crate::error::{AcquisitionError, Result};

/// Circular buffer of raw 16-bit samples
pub struct PublicBuffer {
    samples: Vec<u16>,
    capacity: usize,
}

impl PublicBuffer {
    /// Allocate a zeroed buffer of `capacity` samples
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(AcquisitionError::Configuration {
                field: "public_capacity",
                reason: "capacity must be non-zero".to_string(),
            });
        }
        Ok(Self {
            samples: vec![0; capacity],
            capacity,
        })
    }

    /// Buffer capacity in samples
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mutable view of the contiguous window `[offset, offset + len)`.
    ///
    /// The write path copies each hardware chunk straight into this
    /// window while holding the buffer lock. The session geometry keeps
    /// chunk windows from straddling the wrap point (capacity divides
    /// evenly into chunks), which is what makes a single contiguous view
    /// sufficient.
    pub fn window_mut(&mut self, offset: usize, len: usize) -> &mut [u16] {
        debug_assert!(offset + len <= self.capacity);
        &mut self.samples[offset..offset + len]
    }

    /// Copy `out.len()` samples starting at absolute index `start`,
    /// wrapping past the end of the buffer.
    pub fn read_window(&self, start: usize, out: &mut [u16]) {
        let len = out.len();
        debug_assert!(len <= self.capacity);
        let start = start % self.capacity;
        let first = (self.capacity - start).min(len);
        out[..first].copy_from_slice(&self.samples[start..start + first]);
        if first < len {
            out[first..].copy_from_slice(&self.samples[..len - first]);
        }
    }

    /// Sample at absolute index `index` (mod capacity)
    pub fn get(&self, index: usize) -> u16 {
        self.samples[index % self.capacity]
    }
}
