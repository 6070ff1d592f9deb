use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;

/// A band scale divides a continuous range into uniform bands, one per
/// domain value, and maps each value to the start of its band.
///
/// Commonly used for bar charts over categorical dimensions. Values outside
/// the domain map to `None`.
#[derive(Debug, Clone)]
pub struct BandScale<D: Debug + Clone + Hash + Eq> {
    domain: Vec<D>,
    positions: IndexMap<D, f64>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
    round: bool,
}

impl<D: Debug + Clone + Hash + Eq> BandScale<D> {
    /// Creates a band scale over `domain` with range (0, 1), no padding and
    /// centered alignment. Duplicate domain values keep their first position.
    pub fn new(domain: Vec<D>) -> Self {
        let mut unique: Vec<D> = Vec::with_capacity(domain.len());
        for value in domain {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }

        let mut this = Self {
            positions: IndexMap::new(),
            domain: unique,
            range: (0.0, 1.0),
            padding_inner: 0.0,
            padding_outer: 0.0,
            align: 0.5,
            round: false,
        };
        this.rescale();
        this
    }

    fn bounds(&self) -> (f64, f64, bool) {
        let reverse = self.range.1 < self.range.0;
        if reverse {
            (self.range.1, self.range.0, true)
        } else {
            (self.range.0, self.range.1, false)
        }
    }

    fn raw_step(&self) -> f64 {
        let (start, stop, _) = self.bounds();
        let n = self.domain.len();
        (stop - start) / 1f64.max(bandspace(n, self.padding_inner, self.padding_outer))
    }

    fn rescale(&mut self) {
        let n = self.domain.len();
        let (start, stop, reverse) = self.bounds();
        let step = self.step();

        let mut first = start + (stop - start - step * (n as f64 - self.padding_inner)) * self.align;
        if self.round {
            first = first.round();
        }

        self.positions = self
            .domain
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let slot = if reverse { n - 1 - i } else { i };
                (d.clone(), first + step * slot as f64)
            })
            .collect();
    }

    pub fn range(mut self, range: (f64, f64)) -> Self {
        self.range = range;
        self.rescale();
        self
    }

    /// Inner padding in [0, 1], the fraction of each step left blank between bands
    pub fn padding_inner(mut self, padding: f64) -> Self {
        self.padding_inner = padding.clamp(0.0, 1.0);
        self.rescale();
        self
    }

    /// Outer padding (>= 0) before the first and after the last band, in steps
    pub fn padding_outer(mut self, padding: f64) -> Self {
        self.padding_outer = padding.max(0.0);
        self.rescale();
        self
    }

    pub fn padding(self, padding: f64) -> Self {
        self.padding_inner(padding).padding_outer(padding)
    }

    /// How leftover space is distributed: 0 start, 0.5 centered, 1 end
    pub fn align(mut self, align: f64) -> Self {
        self.align = align.clamp(0.0, 1.0);
        self.rescale();
        self
    }

    pub fn round(mut self, round: bool) -> Self {
        self.round = round;
        self.rescale();
        self
    }

    pub fn get_domain(&self) -> &[D] {
        &self.domain
    }

    pub fn get_range(&self) -> (f64, f64) {
        self.range
    }

    pub fn get_padding_inner(&self) -> f64 {
        self.padding_inner
    }

    pub fn get_padding_outer(&self) -> f64 {
        self.padding_outer
    }

    pub fn get_align(&self) -> f64 {
        self.align
    }

    /// Distance between the starts of adjacent bands, 0 for an empty domain
    pub fn step(&self) -> f64 {
        if self.domain.is_empty() {
            return 0.0;
        }
        let step = self.raw_step();
        if self.round {
            step.floor()
        } else {
            step
        }
    }

    /// Width of each band, 0 for an empty domain
    pub fn bandwidth(&self) -> f64 {
        if self.domain.is_empty() {
            return 0.0;
        }
        let width = self.step() * (1.0 - self.padding_inner);
        if self.round {
            width.round()
        } else {
            width
        }
    }

    pub fn scale_value(&self, value: &D) -> Option<f64> {
        self.positions.get(value).copied()
    }

    /// Band start positions in domain order
    pub fn positions(&self) -> Vec<f64> {
        self.positions.values().copied().collect()
    }

    /// Center of the band for `value`
    pub fn center(&self, value: &D) -> Option<f64> {
        self.scale_value(value).map(|start| start + self.bandwidth() / 2.0)
    }
}

/// Number of steps a band scale with `count` bands spans, given its padding.
pub fn bandspace(count: usize, padding_inner: f64, padding_outer: f64) -> f64 {
    let padding_inner = padding_inner.clamp(0.0, 1.0);
    let padding_outer = padding_outer.max(0.0);
    count as f64 - padding_inner + padding_outer * 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_defaults() {
        let scale = BandScale::new(vec!["a", "b", "c"]);
        assert_eq!(scale.get_range(), (0.0, 1.0));
        assert_eq!(scale.get_padding_inner(), 0.0);
        assert_eq!(scale.get_padding_outer(), 0.0);
        assert_eq!(scale.get_align(), 0.5);
    }

    #[test]
    fn test_basic_bands() {
        let scale = BandScale::new(vec!["a", "b", "c"]).range((0.0, 300.0));
        assert_approx_eq!(f64, scale.step(), 100.0);
        assert_approx_eq!(f64, scale.bandwidth(), 100.0);
        assert_eq!(scale.scale_value(&"a"), Some(0.0));
        assert_eq!(scale.scale_value(&"c"), Some(200.0));
        assert_eq!(scale.scale_value(&"z"), None);
    }

    #[test]
    fn test_padding() {
        let scale = BandScale::new(vec!["a", "b", "c"])
            .range((0.0, 120.0))
            .padding(0.2);
        // bandspace = 3 - 0.2 + 0.4 = 3.2
        assert_approx_eq!(f64, scale.step(), 37.5);
        assert_approx_eq!(f64, scale.bandwidth(), 30.0);
        assert_approx_eq!(f64, scale.scale_value(&"a").unwrap(), 7.5);
    }

    #[test]
    fn test_reversed_range() {
        let scale = BandScale::new(vec!["a", "b"]).range((100.0, 0.0));
        assert_eq!(scale.scale_value(&"a"), Some(50.0));
        assert_eq!(scale.scale_value(&"b"), Some(0.0));
    }

    #[test]
    fn test_duplicates_and_empty() {
        let scale = BandScale::new(vec!["a", "a", "b"]).range((0.0, 10.0));
        assert_eq!(scale.get_domain(), &["a", "b"]);

        let empty = BandScale::<&str>::new(vec![]).range((0.0, 10.0));
        assert_eq!(empty.step(), 0.0);
        assert_eq!(empty.bandwidth(), 0.0);
        assert_eq!(empty.scale_value(&"a"), None);
    }
}
