use std::fmt::Debug;

use crate::array;
use crate::error::ScaleError;
use crate::numeric::fraction;

/// A quantize scale divides a continuous domain into uniform segments, one per
/// range value.
///
/// A zero-width domain maps every finite value to the middle range value.
#[derive(Debug, Clone)]
pub struct QuantizeScale<R>
where
    R: Clone + Debug,
{
    domain: (f64, f64),
    range: Vec<R>,
    default: R,
    thresholds: Vec<f64>,
}

impl<R> QuantizeScale<R>
where
    R: Clone + Debug,
{
    pub fn try_new(domain: (f64, f64), range: Vec<R>, default: R) -> Result<Self, ScaleError> {
        if range.is_empty() {
            return Err(ScaleError::EmptyRange);
        }
        let mut this = Self {
            domain,
            range,
            default,
            thresholds: vec![],
        };
        this.update_thresholds();
        Ok(this)
    }

    /// Extends the domain to round numbers
    pub fn nice(mut self, count: Option<usize>) -> Self {
        self.domain = array::nice(self.domain.0, self.domain.1, count.unwrap_or(10));
        self.update_thresholds();
        self
    }

    fn update_thresholds(&mut self) {
        let n = self.range.len();
        let (d0, d1) = self.domain;
        self.thresholds = (1..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                d0 * (1.0 - t) + d1 * t
            })
            .collect();
    }

    pub fn get_domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn get_range(&self) -> &[R] {
        &self.range
    }

    /// The n - 1 boundaries between segments
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn scale_value(&self, value: f64) -> R {
        if !value.is_finite() {
            return self.default.clone();
        }
        let n = self.range.len();
        let (d0, d1) = self.domain;
        let idx = if d0 == d1 || !d0.is_finite() || !d1.is_finite() {
            (n - 1) / 2
        } else {
            let normalized = fraction(value, (d0, d1));
            ((normalized * n as f64).floor().max(0.0) as usize).min(n - 1)
        };
        self.range[idx].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_quantize_scale_basic() -> Result<(), ScaleError> {
        let scale = QuantizeScale::try_new((0.0, 1.0), vec![0.0, 0.5, 1.0], f64::NAN)?;
        let result: Vec<f64> = [0.3, 0.5, 0.8, -4.0, 9.0]
            .iter()
            .map(|v| scale.scale_value(*v))
            .collect();
        assert_eq!(result, vec![0.0, 0.5, 1.0, 0.0, 1.0]);
        assert!(scale.scale_value(f64::NAN).is_nan());

        let thresholds = scale.thresholds();
        assert_approx_eq!(f64, thresholds[0], 1.0 / 3.0);
        assert_approx_eq!(f64, thresholds[1], 2.0 / 3.0);
        Ok(())
    }

    #[test]
    fn test_degenerate_domain() -> Result<(), ScaleError> {
        let scale = QuantizeScale::try_new((5.0, 5.0), vec!["a", "b", "c", "d"], "none")?;
        assert_eq!(scale.scale_value(5.0), "b");
        assert_eq!(scale.scale_value(100.0), "b");
        Ok(())
    }

    #[test]
    fn test_domain_wider_than_f64() -> Result<(), ScaleError> {
        let scale = QuantizeScale::try_new((-1e308, 1e308), vec![0, 1, 2, 3], -1)?;
        assert_eq!(scale.scale_value(-1e308), 0);
        assert_eq!(scale.scale_value(-1e307), 1);
        assert_eq!(scale.scale_value(1e307), 2);
        assert_eq!(scale.scale_value(1e308), 3);
        Ok(())
    }

    #[test]
    fn test_nice() -> Result<(), ScaleError> {
        let scale = QuantizeScale::try_new((0.2, 9.7), vec![0, 1], -1)?.nice(None);
        assert_eq!(scale.get_domain(), (0.0, 10.0));
        assert_eq!(scale.thresholds(), &[5.0]);
        Ok(())
    }
}
