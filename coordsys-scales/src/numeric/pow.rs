use crate::array;

use super::{interpolate, ContinuousScale};

#[derive(Debug, Clone)]
pub struct PowScaleConfig {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub exponent: f64,
    pub clamp: bool,
    pub nice: Option<usize>,
}

impl Default for PowScaleConfig {
    fn default() -> Self {
        Self {
            domain: (0.0, 1.0),
            range: (0.0, 1.0),
            exponent: 1.0,
            clamp: false,
            nice: None,
        }
    }
}

/// A power scale applying `sign(x) * |x|^exponent` before interpolating.
#[derive(Clone, Debug)]
pub struct PowScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    exponent: f64,
    clamp: bool,
}

impl PowScale {
    pub fn new(config: &PowScaleConfig) -> Self {
        let mut this = Self {
            domain_start: config.domain.0,
            domain_end: config.domain.1,
            range_start: config.range.0,
            range_end: config.range.1,
            exponent: config.exponent,
            clamp: config.clamp,
        };
        if let Some(count) = config.nice {
            let (start, end) = array::nice(this.domain_start, this.domain_end, count);
            this.domain_start = start;
            this.domain_end = end;
        }
        this
    }

    /// Square-root scale, a power scale with exponent 0.5
    pub fn sqrt(config: &PowScaleConfig) -> Self {
        Self::new(&PowScaleConfig {
            exponent: 0.5,
            ..config.clone()
        })
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    fn transform(&self, x: f64) -> f64 {
        if self.exponent == 1.0 {
            x
        } else if self.exponent == 0.5 {
            x.signum() * x.abs().sqrt()
        } else {
            x.signum() * x.abs().powf(self.exponent)
        }
    }

    fn untransform(&self, x: f64) -> f64 {
        if self.exponent == 1.0 {
            x
        } else {
            x.signum() * x.abs().powf(1.0 / self.exponent)
        }
    }

    fn transformed_domain(&self) -> (f64, f64) {
        (
            self.transform(self.domain_start),
            self.transform(self.domain_end),
        )
    }
}

impl ContinuousScale for PowScale {
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
