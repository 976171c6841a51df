//! Yaw position decoding
//!
//! An incremental encoder on the yaw axis delivers asynchronous two-bit
//! quadrature edges; a separate once-per-revolution reference marker fires
//! its own interrupt. This module integrates the edges into a signed tick
//! count bounded to one revolution and maps it onto degrees.
//!
//! The tick count is the only multi-context field: written by the edge
//! handler, read by dispatch-thread accessors. It lives in an `AtomicI16`
//! so each edge is one atomic publish. The previous two-bit sample is
//! touched only from edge-handler context.

use core::sync::atomic::{AtomicBool, AtomicI16, Ordering};

/// Encoder slots per full revolution.
pub const SLOTS_PER_REV: i16 = 448;

/// Degrees per full revolution.
pub const FULL_CIRCLE: i32 = 360;

/// Scale factor exposing one sub-degree decimal for display.
const FRACTION_SCALE: i32 = 10;

/// Quadrature decoder state and the reference-found latch.
#[derive(Debug, Default)]
pub struct YawDecoder {
    ticks: AtomicI16,
    prev: u8,
    reference_found: AtomicBool,
}

impl YawDecoder {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicI16::new(0),
            prev: 0,
            reference_found: AtomicBool::new(false),
        }
    }

    /// Edge-interrupt entry point: fold one two-bit sample into the count.
    ///
    /// From each state exactly two neighbour states are legal (one per
    /// rotation direction). The other two encode a skipped edge and are
    /// ignored: the sample rate is assumed to exceed the edge rate, so a
    /// skip is transient noise, not an error.
    pub fn on_edge(&mut self, a: bool, b: bool) {
        let state = (a as u8) | ((b as u8) << 1);
        let prev = self.prev;
        self.prev = state;

        let step: i16 = match (state, prev) {
            (0b00, 0b10) | (0b01, 0b00) | (0b11, 0b01) | (0b10, 0b11) => -1,
            (0b00, 0b01) | (0b10, 0b00) | (0b11, 0b10) | (0b01, 0b11) => 1,
            _ => return,
        };

        let mut ticks = self.ticks.load(Ordering::Relaxed) + step;
        // Wrap onto the torus at half a revolution in either direction.
        if ticks == SLOTS_PER_REV / 2 {
            ticks = -SLOTS_PER_REV / 2;
        } else if ticks == -SLOTS_PER_REV / 2 - 1 {
            ticks = SLOTS_PER_REV / 2 - 1;
        }
        self.ticks.store(ticks, Ordering::Relaxed);
    }

    /// Reference-interrupt entry point: zero the position and latch the
    /// found flag. The caller gates this on the flight phase; outside a
    /// search phase the marker is a no-op.
    pub fn on_reference(&mut self) {
        self.ticks.store(0, Ordering::Relaxed);
        self.prev = 0;
        self.reference_found.store(true, Ordering::Relaxed);
    }

    /// Raw signed tick count in `[-SLOTS_PER_REV/2, SLOTS_PER_REV/2)`.
    pub fn ticks(&self) -> i16 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Decoded angle in whole degrees, `[-180, 180)`.
    pub fn angle(&self) -> i16 {
        (self.ticks() as i32 * FULL_CIRCLE / SLOTS_PER_REV as i32) as i16
    }

    /// First sub-degree decimal of the angle, magnitude only.
    pub fn angle_fraction(&self) -> i16 {
        let scaled = self.ticks() as i32 * FULL_CIRCLE * FRACTION_SCALE / SLOTS_PER_REV as i32;
        (scaled % FRACTION_SCALE).unsigned_abs() as i16
    }

    /// True once the reference marker has fired during a search phase.
    pub fn reference_found(&self) -> bool {
        self.reference_found.load(Ordering::Relaxed)
    }

    /// Cleared by the state machine when it begins a new search.
    pub fn clear_reference(&self) {
        self.reference_found.store(false, Ordering::Relaxed);
    }

    pub fn reset(&mut self) {
        self.ticks.store(0, Ordering::Relaxed);
        self.prev = 0;
        self.reference_found.store(false, Ordering::Relaxed);
    }
}

/// Fold a raw yaw difference onto the shortest angular path.
///
/// A raw error of magnitude above 180 commands the long way round; the
/// folded error keeps the magnitude `360 - |raw|` with the opposite sign.
pub fn fold_error(raw: i32) -> i32 {
    if raw > 180 {
        raw - FULL_CIRCLE
    } else if raw < -180 {
        raw + FULL_CIRCLE
    } else {
        raw
    }
}
