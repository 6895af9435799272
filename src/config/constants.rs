// src/config/constants.rs
//! Centralized constants for the acquisition core
//!
//! All magic numbers used by the crate live here, grouped by concern.
//! Default values match the reference operating point of the target
//! hardware: 1 kHz acquisition with 4 seconds of public buffer and a
//! 50 ms latency target.

/// Time unit conversions
pub mod timing {
    /// Nanoseconds in one second
    pub const NANOS_PER_SEC: u64 = 1_000_000_000;
    /// Nanoseconds in one millisecond
    pub const NANOS_PER_MS: u64 = 1_000_000;
    /// Milliseconds in one second
    pub const MS_PER_SEC: u64 = 1_000;
}

/// Signal and buffer defaults
pub mod signal {
    /// Default acquisition rate in Hz
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 1_000;
    /// Default number of active channels
    pub const DEFAULT_CHANNEL_COUNT: usize = 1;
    /// Number of analog inputs the hardware exposes (AIN0..AIN7)
    pub const MAX_CHANNEL_COUNT: usize = 8;
    /// Default seconds of acquisition held in the public buffer
    pub const DEFAULT_SECONDS_IN_BUFFER: u32 = 4;
    /// Lowest supported acquisition rate
    pub const MIN_SAMPLE_RATE_HZ: u32 = 1;
    /// Highest supported acquisition rate
    pub const MAX_SAMPLE_RATE_HZ: u32 = 50_000;
    /// Full scale of the 12-bit converter; samples occupy 16-bit slots
    /// but never exceed this value
    pub const ADC_FULL_SCALE: u16 = 4_095;
    /// Conversion factor from a raw ADC count to millivolts against the
    /// 1800 mV reference
    pub const ADC_TO_MILLIVOLTS: f64 = 2.275;
}

/// Latency and scheduling defaults
pub mod performance {
    /// Default target latency between acquisition and availability, in ms
    pub const DEFAULT_LATENCY_MS: u32 = 50;
    /// Highest accepted latency target, in ms
    pub const MAX_LATENCY_MS: u32 = 1_000;
    /// Default interval of the hardware-progress poll loop, in ms.
    /// A tunable, not an artifact: shorter intervals cut wake-up latency
    /// at the cost of CPU.
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1;
}

/// Hardware step layout
pub mod hardware {
    /// First usable hardware step; step 0 is the charging step
    pub const FIRST_STEP: u32 = 1;
    /// First input channel (AIN0)
    pub const FIRST_CHANNEL: u32 = 0;
    /// Default averaging for step configuration
    pub const DEFAULT_AVERAGING: u32 = 0;
    /// Default sample delay for step configuration
    pub const DEFAULT_SAMPLE_DELAY: u32 = 0;
    /// Default open delay for step configuration
    pub const DEFAULT_OPEN_DELAY: u32 = 0;
    /// Size of one raw sample in bytes
    pub const BYTES_PER_SAMPLE: usize = 2;
    /// Default size of the simulated driver region in bytes: a double
    /// buffer whose halves each hold one second at the default rate,
    /// the largest region initialization accepts for that rate.
    pub const DEFAULT_REGION_BYTES: usize =
        2 * super::signal::DEFAULT_SAMPLE_RATE_HZ as usize * BYTES_PER_SAMPLE;
}

/// Configuration file discovery
pub mod paths {
    /// File name looked up in each search directory
    pub const CONFIG_FILE_NAME: &str = "acquisition.toml";
    /// Environment variable overriding the search path
    pub const CONFIG_PATH_ENV: &str = "EMG_ACQUISITION_CONFIG";
}
