//! Sequential and diverging scales.
//!
//! Both normalize the input to a parameter `t` in `[0, 1]` and then
//! interpolate the output range, always clamping. The diverging scale places
//! its midpoint at `t = 0.5`.

use crate::array;
use crate::numeric::fraction;

fn lerp((r0, r1): (f64, f64), t: f64) -> f64 {
    r0 + t * (r1 - r0)
}

#[derive(Clone, Debug)]
pub struct SequentialScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl SequentialScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Normalized position of `value` within the domain
    pub fn normalize(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        if d0 == d1 || !d0.is_finite() || !d1.is_finite() {
            return 0.5;
        }
        fraction(value, (d0, d1)).clamp(0.0, 1.0)
    }

    pub fn scale_value(&self, value: f64) -> f64 {
        lerp(self.range, self.normalize(value))
    }

    pub fn ticks(&self, count: Option<usize>) -> Vec<f64> {
        array::ticks(self.domain.0, self.domain.1, count.unwrap_or(10))
    }
}

#[derive(Clone, Debug)]
pub struct DivergingScale {
    domain: (f64, f64, f64),
    range: (f64, f64),
}

impl DivergingScale {
    /// Domain is `(start, midpoint, end)`
    pub fn new(domain: (f64, f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn normalize(&self, value: f64) -> f64 {
        let (d0, mid, d1) = self.domain;
        let below = value < mid;
        let (lo, hi) = if below { (d0, mid) } else { (mid, d1) };
        // a collapsed side maps to the midpoint
        if lo == hi || !lo.is_finite() || !hi.is_finite() {
            return 0.5;
        }
        let half = fraction(value, (lo, hi)).clamp(0.0, 1.0);
        if below {
            half * 0.5
        } else {
            0.5 + half * 0.5
        }
    }

    pub fn scale_value(&self, value: f64) -> f64 {
        lerp(self.range, self.normalize(value))
    }

    pub fn ticks(&self, count: Option<usize>) -> Vec<f64> {
        array::ticks(self.domain.0, self.domain.2, count.unwrap_or(10))
    }
}
