// src/timeline/scale.rs

//! Pure pixel mappings.
//!
//! [`LinearScale`] maps seconds to x; [`BandScale`] maps a discrete slot
//! index to the top edge of its band, with uniform inner and outer padding
//! (centred, like an ordinal band scale with `align = 0.5`).

use serde::Serialize;

/// Default gap between row slots, as a fraction of one step.
pub const DEFAULT_ROW_PADDING: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a domain value to the range. A zero-width domain maps every
    /// value to the middle of the range.
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        r0 + t * (r1 - r0)
    }
}

/// `time_to_x` over an explicit domain and pixel range.
pub fn time_to_x(t: f64, domain: (f64, f64), range: (f64, f64)) -> f64 {
    LinearScale::new(domain, range).map(t)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandScale {
    count: usize,
    range: (f64, f64),
    padding: f64,
    step: f64,
    bandwidth: f64,
    /// Position of slot 0 when walking from the low end of the range.
    start: f64,
    reversed: bool,
}

impl BandScale {
    /// Band scale with `count` slots over `range`. A range given high-to-low
    /// places slot 0 at the high end (bottom of a y axis).
    pub fn new(count: usize, range: (f64, f64), padding: f64) -> Self {
        let (r0, r1) = range;
        let reversed = r1 < r0;
        let (lo, hi) = if reversed { (r1, r0) } else { (r0, r1) };

        let n = count as f64;
        let step = (hi - lo) / (n - padding + 2.0 * padding).max(1.0);
        let start = lo + (hi - lo - step * (n - padding)) * 0.5;
        let bandwidth = step * (1.0 - padding);

        Self {
            count,
            range,
            padding,
            step,
            bandwidth,
            start,
            reversed,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Top edge of slot `index`, or `None` when out of range.
    pub fn position(&self, index: usize) -> Option<f64> {
        if index >= self.count {
            return None;
        }
        let slot = if self.reversed {
            self.count - 1 - index
        } else {
            index
        };
        Some(self.start + self.step * slot as f64)
    }

    /// Height covering `slots` adjacent bands including the gaps between them.
    pub fn span_height(&self, slots: u32) -> f64 {
        if slots == 0 {
            return 0.0;
        }
        self.bandwidth * slots as f64 + (self.step - self.bandwidth) * (slots as f64 - 1.0)
    }
}
