//! Conversion utilities for the acquisition core
//!
//! Converts between raw ADC counts, physical units, and the sample/byte
//! views of the hardware region. Factors come from
//! [`config::constants`](crate::config::constants).

use crate::config::constants::hardware::BYTES_PER_SAMPLE;
use crate::config::constants::signal::ADC_TO_MILLIVOLTS;

/// Convert a raw 12-bit ADC count to millivolts against the 1800 mV reference
pub fn adc_to_millivolts(raw: u16) -> f64 {
    raw as f64 / ADC_TO_MILLIVOLTS
}

/// Number of bytes occupied by `samples` raw samples
pub fn samples_to_bytes(samples: usize) -> usize {
    samples * BYTES_PER_SAMPLE
}

/// Number of whole samples that fit in `bytes` bytes
pub fn bytes_to_samples(bytes: usize) -> usize {
    bytes / BYTES_PER_SAMPLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adc_to_millivolts_reference_points() {
        use crate::config::constants::signal::ADC_FULL_SCALE;

        assert_eq!(adc_to_millivolts(0), 0.0);
        // Full scale maps to the 1.8 V reference
        let full_scale = adc_to_millivolts(ADC_FULL_SCALE);
        assert!((full_scale - 1800.0).abs() < 1.0);
    }

    #[test]
    fn test_sample_byte_round_trip() {
        assert_eq!(samples_to_bytes(128), 256);
        assert_eq!(bytes_to_samples(256), 128);
        assert_eq!(bytes_to_samples(257), 128);
    }
}
