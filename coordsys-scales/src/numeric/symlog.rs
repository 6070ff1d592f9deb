use crate::array;

use super::{interpolate, ContinuousScale};

#[derive(Debug, Clone)]
pub struct SymlogScaleConfig {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub constant: f64,
    pub clamp: bool,
}

impl Default for SymlogScaleConfig {
    fn default() -> Self {
        Self {
            domain: (0.0, 1.0),
            range: (0.0, 1.0),
            constant: 1.0,
            clamp: false,
        }
    }
}

/// Bi-symmetric log scale: logarithmic for large magnitudes, linear around
/// zero, and defined for domains that cross zero.
#[derive(Clone, Debug)]
pub struct SymlogScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    constant: f64,
    clamp: bool,
}

impl SymlogScale {
    pub fn new(config: &SymlogScaleConfig) -> Self {
        Self {
            domain_start: config.domain.0,
            domain_end: config.domain.1,
            range_start: config.range.0,
            range_end: config.range.1,
            constant: if config.constant > 0.0 {
                config.constant
            } else {
                1.0
            },
            clamp: config.clamp,
        }
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    fn transform(&self, x: f64) -> f64 {
        x.signum() * (x.abs() / self.constant).ln_1p()
    }

    fn untransform(&self, x: f64) -> f64 {
        x.signum() * x.abs().exp_m1() * self.constant
    }

    fn transformed_domain(&self) -> (f64, f64) {
        (
            self.transform(self.domain_start),
            self.transform(self.domain_end),
        )
    }
}

impl ContinuousScale for SymlogScale {
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
        interpolate(
            self.transform(value),
            self.transformed_domain(),
            self.range(),
            self.clamp,
            false,
        )
    }


    fn ticks(&self, count: Option<usize>) -> Vec<f64> {
        array::ticks(self.domain_start, self.domain_end, count.unwrap_or(10))
    }
}
