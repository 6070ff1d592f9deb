use crate::array;

use super::{interpolate, ContinuousScale};

#[derive(Clone, Debug)]
pub struct LinearScaleConfig {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub clamp: bool,
    pub nice: Option<usize>,
    pub round: bool,
}

impl Default for LinearScaleConfig {
    fn default() -> Self {
        Self {
            domain: (0.0, 1.0),
            range: (0.0, 1.0),
            clamp: false,
            nice: None,
            round: false,
        }
    }
}

/// A linear scale that maps a continuous domain to a continuous range.
/// Supports clamping, rounding, domain niceing, and tick generation.
#[derive(Clone, Debug)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    clamp: bool,
    round: bool,
}

impl LinearScale {
    pub fn new(config: &LinearScaleConfig) -> Self {
        let this = Self {
            domain_start: config.domain.0,
            domain_end: config.domain.1,
            range_start: config.range.0,
            range_end: config.range.1,
            clamp: config.clamp,
            round: config.round,
        };
        match config.nice {
            Some(count) => this.nice(Some(count)),
            None => this,
        }
    }

    /// Extends the domain to nice round numbers for better tick selection
    pub fn nice(mut self, count: Option<usize>) -> Self {
        let (start, end) = array::nice(self.domain_start, self.domain_end, count.unwrap_or(10));
        self.domain_start = start;
        self.domain_end = end;
        self
    }

    pub fn with_domain(mut self, domain: (f64, f64)) -> Self {
        self.domain_start = domain.0;
        self.domain_end = domain.1;
        self
    }

    pub fn with_range(mut self, range: (f64, f64)) -> Self {
        self.range_start = range.0;
        self.range_end = range.1;
        self
    }

    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn with_round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }
}

impl ContinuousScale for LinearScale {
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
        interpolate(value, self.domain(), self.range(), self.clamp, self.round)
    }


    fn ticks(&self, count: Option<usize>) -> Vec<f64> {
        array::ticks(self.domain_start, self.domain_end, count.unwrap_or(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_defaults() {
        let scale = LinearScale::new(&Default::default());
        assert_eq!(scale.domain(), (0.0, 1.0));
        assert_eq!(scale.range(), (0.0, 1.0));
        assert!(!scale.clamp());
    }

    #[test]
    fn test_scale_clamped() {
        let scale = LinearScale::new(&LinearScaleConfig {
            domain: (10.0, 30.0),
            range: (0.0, 100.0),
            clamp: true,
            ..Default::default()
        });

        let result: Vec<f64> = [0.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0]
            .iter()
            .map(|v| scale.scale_value(*v))
            .collect();

        assert_approx_eq!(f64, result[0], 0.0); // clamped
        assert_approx_eq!(f64, result[1], 0.0);
        assert_approx_eq!(f64, result[2], 25.0);
        assert_approx_eq!(f64, result[3], 50.0);
        assert_approx_eq!(f64, result[4], 75.0);
        assert_approx_eq!(f64, result[5], 100.0);
        assert_approx_eq!(f64, result[6], 100.0); // clamped
    }

    #[test]
    fn test_scale_inverted_range() {
        let scale = LinearScale::new(&LinearScaleConfig {
            domain: (0.0, 10.0),
            range: (450.0, 50.0),
            ..Default::default()
        });
        assert_approx_eq!(f64, scale.scale_value(0.0), 450.0);
        assert_approx_eq!(f64, scale.scale_value(10.0), 50.0);
        assert_approx_eq!(f64, scale.scale_value(2.5), 350.0);
    }

    #[test]
    fn test_scale_degenerate_domain_uses_range_midpoint() {
        let scale = LinearScale::new(&LinearScaleConfig {
            domain: (10.0, 10.0),
            range: (0.0, 100.0),
            ..Default::default()
        });

        for v in [0.0, 10.0, 20.0] {
            assert_approx_eq!(f64, scale.scale_value(v), 50.0);
        }
    }

    #[test]
    fn test_unclamped_extrapolates() {
        let scale = LinearScale::new(&LinearScaleConfig {
            domain: (10.0, 30.0),
            range: (0.0, 100.0),
            clamp: true,
            ..Default::default()
        })
        .with_clamp(false);
        assert_approx_eq!(f64, scale.scale_value(5.0), -25.0);
        assert_approx_eq!(f64, scale.scale_value(35.0), 125.0);
    }

    #[test]
    fn test_domain_wider_than_f64() {
        let scale = LinearScale::new(&LinearScaleConfig {
            domain: (-1e308, 1e308),
            range: (50.0, 450.0),
            ..Default::default()
        });
        assert_approx_eq!(f64, scale.scale_value(0.0), 250.0);
        assert_approx_eq!(f64, scale.scale_value(1e308), 450.0);
        let ticks = scale.ticks(Some(10));
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|t| t.is_finite()));
    }

    #[test]
    fn test_round() {
        let scale = LinearScale::new(&LinearScaleConfig {
            domain: (0.0, 3.0),
            range: (0.0, 10.0),
            round: true,
            ..Default::default()
        });
        assert_eq!(scale.scale_value(1.0), 3.0);
        assert_eq!(scale.scale_value(2.0), 7.0);
    }

    #[test]
    fn test_nice_and_ticks() {
        let scale = LinearScale::new(&LinearScaleConfig {
            domain: (1.1, 10.9),
            nice: Some(10),
            ..Default::default()
        });
        assert_eq!(scale.domain(), (1.0, 11.0));
        assert_eq!(
            scale.ticks(Some(5)),
            vec![2.0, 4.0, 6.0, 8.0, 10.0]
        );
    }
}
