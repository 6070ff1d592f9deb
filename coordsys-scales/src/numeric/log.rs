use crate::{array, error::ScaleError};

use super::{interpolate, ContinuousScale};

#[derive(Debug, Clone)]
pub struct LogScaleConfig {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub base: f64,
    pub clamp: bool,
    pub nice: bool,
}

impl Default for LogScaleConfig {
    fn default() -> Self {
        Self {
            domain: (1.0, 10.0),
            range: (0.0, 1.0),
            base: 10.0,
            clamp: false,
            nice: false,
        }
    }
}

/// A logarithmic scale. The domain must lie entirely on one side of zero;
/// negative domains are mirrored through the origin.
#[derive(Clone, Debug)]
pub struct LogScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    base: f64,
    clamp: bool,
}

impl LogScale {
    pub fn try_new(config: &LogScaleConfig) -> Result<Self, ScaleError> {
        let (start, end) = config.domain;
        if !(config.base > 0.0) || config.base == 1.0 || !config.base.is_finite() {
            return Err(ScaleError::InvalidLogBase(config.base));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(ScaleError::NonFiniteDomain { start, end });
        }
        let same_sign = (start > 0.0 && end > 0.0) || (start < 0.0 && end < 0.0);
        if !same_sign {
            return Err(ScaleError::InvalidLogDomain { start, end });
        }

        let this = Self {
            domain_start: start,
            domain_end: end,
            range_start: config.range.0,
            range_end: config.range.1,
            base: config.base,
            clamp: config.clamp,
        };
        Ok(if config.nice { this.nice() } else { this })
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    fn negative(&self) -> bool {
        self.domain_start < 0.0
    }

    fn log(&self, x: f64) -> f64 {
        if self.base == 10.0 {
            x.log10()
        } else if self.base == 2.0 {
            x.log2()
        } else if self.base == std::f64::consts::E {
            x.ln()
        } else {
            x.ln() / self.base.ln()
        }
    }

    fn pow(&self, x: f64) -> f64 {
        self.base.powf(x)
    }

    /// Signed logarithm so that negative domains keep their orientation
    fn transform(&self, x: f64) -> f64 {
        if self.negative() {
            -self.log(-x)
        } else {
            self.log(x)
        }
    }

    fn untransform(&self, x: f64) -> f64 {
        if self.negative() {
            -self.pow(-x)
        } else {
            self.pow(x)
        }
    }

    fn transformed_domain(&self) -> (f64, f64) {
        (
            self.transform(self.domain_start),
            self.transform(self.domain_end),
        )
    }

    /// Extends the domain outward to whole powers of the base
    pub fn nice(mut self) -> Self {
        if self.domain_start == self.domain_end {
            let log_val = self.log(self.domain_start.abs());
            let sign = self.domain_start.signum();
            self.domain_start = sign * self.pow(log_val.floor());
            self.domain_end = sign * self.pow(log_val.ceil());
            return self;
        }

        let reverse = self.domain_end < self.domain_start;
        let (lo, hi) = if reverse {
            (self.domain_end, self.domain_start)
        } else {
            (self.domain_start, self.domain_end)
        };

        let (nlo, nhi) = if self.negative() {
            (
                -self.pow(self.log(-lo).ceil()),
                -self.pow(self.log(-hi).floor()),
            )
        } else {
            (self.pow(self.log(lo).floor()), self.pow(self.log(hi).ceil()))
        };

        if reverse {
            self.domain_start = nhi;
            self.domain_end = nlo;
        } else {
            self.domain_start = nlo;
            self.domain_end = nhi;
        }
        self
    }
}

impl ContinuousScale for LogScale {
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
        // values on the wrong side of zero have no logarithm
        if (self.negative() && value >= 0.0) || (!self.negative() && value <= 0.0) {
            return f64::NAN;
        }
        interpolate(
            self.transform(value),
            self.transformed_domain(),
            self.range(),
            self.clamp,
            false,
        )
    }


    /// Whole powers of the base inside the domain, falling back to linear
    /// ticks when the domain spans less than one power.
    fn ticks(&self, count: Option<usize>) -> Vec<f64> {
        let count = count.unwrap_or(10);
        let (d0, d1) = self.domain();
        let reverse = d1 < d0;
        let (lo, hi) = if reverse { (d1, d0) } else { (d0, d1) };

        let (t0, t1) = (self.transform(lo), self.transform(hi));
        let (i, j) = (t0.min(t1).ceil() as i64, t0.max(t1).floor() as i64);

        let mut ticks: Vec<f64> = if j - i + 1 >= 2 {
            (i..=j)
                .map(|k| self.untransform(k as f64))
                .filter(|v| *v >= lo && *v <= hi)
                .collect()
        } else {
            array::ticks(lo, hi, count)
        };

        ticks.sort_by(|a, b| a.total_cmp(b));
        if reverse {
            ticks.reverse();
        }
        ticks
    }
}
