use std::fmt::Debug;

use crate::array;
use crate::error::ScaleError;

/// A threshold scale maps continuous values to discrete values using explicit
/// boundaries. A value equal to a threshold falls in the upper segment.
#[derive(Debug, Clone)]
pub struct ThresholdScale<R>
where
    R: Clone + Debug,
{
    thresholds: Vec<f64>,
    range: Vec<R>,
    default: R,
}

impl<R> ThresholdScale<R>
where
    R: Clone + Debug,
{
    pub fn try_new(thresholds: Vec<f64>, range: Vec<R>, default: R) -> Result<Self, ScaleError> {
        if !thresholds.windows(2).all(|w| w[0] <= w[1]) {
            return Err(ScaleError::ThresholdsNotAscending(thresholds));
        }
        if range.len() != thresholds.len() + 1 {
            return Err(ScaleError::ThresholdDomainMismatch {
                domain_len: thresholds.len(),
                range_len: range.len(),
            });
        }
        Ok(Self {
            thresholds,
            range,
            default,
        })
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn range(&self) -> &[R] {
        &self.range
    }

    pub fn default_value(&self) -> &R {
        &self.default
    }

    pub fn scale_value(&self, value: f64) -> R {
        if value.is_nan() {
            return self.default.clone();
        }
        self.range[array::bisect_right(&self.thresholds, value)].clone()
    }
}
