use crate::array;

use super::{interpolate, ContinuousScale};

fn square(x: f64) -> f64 {
    x.signum() * x * x
}

fn unsquare(x: f64) -> f64 {
    x.signum() * x.abs().sqrt()
}

/// Radial scale: linear in the squared range so that areas of circles drawn
/// at the output radius grow linearly with the input.
#[derive(Clone, Debug)]
pub struct RadialScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    clamp: bool,
}

impl RadialScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain_start: domain.0,
            domain_end: domain.1,
            range_start: range.0,
            range_end: range.1,
            clamp: false,
        }
    }

    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    fn squared_range(&self) -> (f64, f64) {
        (square(self.range_start), square(self.range_end))
    }
}

impl ContinuousScale for RadialScale {
    fn domain(&self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    fn clamp(&self) -> bool {
        self.clamp
    }

    fn scale_value(&self, value: f64) -> f64 {
        // midpoint of the output radius, not of the squared range
        let (d0, d1) = self.domain();
        if d0 == d1 || !d0.is_finite() || !d1.is_finite() {
            return (self.range_start + self.range_end) / 2.0;
        }
        unsquare(interpolate(
            value,
            self.domain(),
            self.squared_range(),
            self.clamp,
            false,
        ))
    }


    fn ticks(&self, count: Option<usize>) -> Vec<f64> {
        array::ticks(self.domain_start, self.domain_end, count.unwrap_or(10))
    }
}
