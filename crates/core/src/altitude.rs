//! Altitude sampling and averaging
//!
//! The altitude sensor delivers one raw ADC count per sample-complete
//! interrupt. This module smooths those counts over a fixed ring window,
//! captures a baseline (zero-altitude) reading once the window is first
//! fully primed, and converts the averaged count into a percentage through
//! a ratiometric transform: the baseline maps to 0 % and lower counts
//! (the sensor voltage falls as the rig climbs) map to higher percentages.
//!
//! The computed percentage is published through a single atomic store per
//! sample interrupt, so the dispatch thread can read it without tearing.

use core::sync::atomic::{AtomicI32, Ordering};

/// Number of raw samples in the averaging window.
pub const SAMPLE_WINDOW: usize = 35;

/// Base sample rate delivered by the periodic trigger, in Hz.
pub const SAMPLE_RATE_HZ: u32 = 150;

/// Full-scale count of the 12-bit converter.
pub const ADC_STEPS: i32 = 4096;

/// Converter reference voltage in millivolts.
pub const VREF_MILLIVOLTS: i32 = 3300;

/// Fixed-capacity ring of raw sensor counts.
///
/// Once primed the window always holds exactly `N` samples; each new
/// sample evicts the oldest.
#[derive(Debug)]
pub struct SampleWindow<const N: usize> {
    samples: [u16; N],
    cursor: usize,
    filled: usize,
}

impl<const N: usize> SampleWindow<N> {
    pub const fn new() -> Self {
        Self {
            samples: [0; N],
            cursor: 0,
            filled: 0,
        }
    }

    /// Append a raw reading, evicting the oldest once full.
    pub fn record(&mut self, raw: u16) {
        self.samples[self.cursor] = raw;
        self.cursor = (self.cursor + 1) % N;
        if self.filled < N {
            self.filled += 1;
        }
    }

    /// True once the window has been written `N` times.
    pub fn is_primed(&self) -> bool {
        self.filled == N
    }

    /// Round-half-up integer mean of the held samples.
    ///
    /// Uses `(2 * sum + n) / 2 / n` rather than a truncating divide; a
    /// truncating mean would sit a fraction of a count low forever.
    pub fn mean(&self) -> i32 {
        if self.filled == 0 {
            return 0;
        }
        let sum: i32 = self.samples[..self.filled].iter().map(|&s| s as i32).sum();
        let n = self.filled as i32;
        (2 * sum + n) / 2 / n
    }

    pub fn clear(&mut self) {
        self.samples = [0; N];
        self.cursor = 0;
        self.filled = 0;
    }
}

impl<const N: usize> Default for SampleWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ratiometric count-to-percentage transform.
///
/// Inverse relationship: a count below the baseline reads as a positive
/// altitude. 100 % corresponds to a 330-count drop (1 V of the 3.3 V /
/// 4096-step range).
pub fn ratiometric_percent(baseline: i32, mean: i32) -> i32 {
    (baseline - mean) * 100 * VREF_MILLIVOLTS / 1000 / ADC_STEPS
}

/// Altitude estimator: sample window plus baseline and published output.
///
/// `on_sample` is the sample-complete interrupt entry point (single
/// writer); `measurement` and `baseline` are read from dispatch context.
#[derive(Debug, Default)]
pub struct AltitudeEstimator<const N: usize> {
    window: SampleWindow<N>,
    baseline: Option<i32>,
    measurement: AtomicI32,
}

impl<const N: usize> AltitudeEstimator<N> {
    pub const fn new() -> Self {
        Self {
            window: SampleWindow::new(),
            baseline: None,
            measurement: AtomicI32::new(0),
        }
    }

    /// Record a raw reading and republish the smoothed measurement.
    ///
    /// The first mean computed after the window primes becomes the
    /// baseline; it is captured exactly once.
    pub fn on_sample(&mut self, raw: u16) {
        self.window.record(raw);
        if !self.window.is_primed() {
            return;
        }
        let mean = self.window.mean();
        let baseline = *self.baseline.get_or_insert(mean);
        self.measurement
            .store(ratiometric_percent(baseline, mean), Ordering::Relaxed);
    }

    /// Smoothed altitude percentage (0 until the baseline is captured).
    pub fn measurement(&self) -> i32 {
        self.measurement.load(Ordering::Relaxed)
    }

    /// Baseline count, once captured.
    pub fn baseline(&self) -> Option<i32> {
        self.baseline
    }

    /// Drop all samples, the baseline and the published measurement.
    pub fn reset(&mut self) {
        self.window.clear();
        self.baseline = None;
        self.measurement.store(0, Ordering::Relaxed);
    }
}
