use std::fmt::Debug;

use ordered_float::OrderedFloat;

use crate::array;
use crate::error::ScaleError;

/// A quantile scale maps a continuous domain to discrete values based on
/// sample quantiles.
///
/// The domain is a sample population; thresholds are its quantiles, so each
/// range value receives roughly the same number of samples. Non-finite input
/// maps to the default.
#[derive(Debug, Clone)]
pub struct QuantileScale<R>
where
    R: Clone + Debug,
{
    samples: Vec<f64>,
    range: Vec<R>,
    default: R,
    thresholds: Vec<f64>,
}

impl<R> QuantileScale<R>
where
    R: Clone + Debug,
{
    pub fn try_new(samples: &[f64], range: Vec<R>, default: R) -> Result<Self, ScaleError> {
        if range.is_empty() {
            return Err(ScaleError::EmptyRange);
        }
        let mut samples: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        samples.sort_by_key(|v| OrderedFloat(*v));

        let mut this = Self {
            samples,
            range,
            default,
            thresholds: vec![],
        };
        this.update_thresholds();
        Ok(this)
    }

    fn update_thresholds(&mut self) {
        let n = self.range.len();
        self.thresholds = (1..n)
            .filter_map(|i| array::quantile_sorted(&self.samples, i as f64 / n as f64))
            .collect();
    }

    /// Sorted finite samples
    pub fn get_domain(&self) -> &[f64] {
        &self.samples
    }

    pub fn get_range(&self) -> &[R] {
        &self.range
    }

    pub fn quantiles(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn scale_value(&self, value: f64) -> R {
        if !value.is_finite() {
            return self.default.clone();
        }
        if self.thresholds.is_empty() {
            // no samples, every value lands in the middle bucket
            return self.range[(self.range.len() - 1) / 2].clone();
        }
        self.range[array::bisect_right(&self.thresholds, value)].clone()
    }
}
