use std::fmt::Debug;
use std::hash::Hash;

use crate::band::BandScale;

/// A point scale is a band scale with zero bandwidth: each domain value maps
/// to a single position, evenly spaced across the range.
///
/// `padding` is the outer padding in steps; with no padding the first value
/// lands on the range start and the last on the range end.
#[derive(Debug, Clone)]
pub struct PointScale<D: Debug + Clone + Hash + Eq> {
    band: BandScale<D>,
}

impl<D: Debug + Clone + Hash + Eq> PointScale<D> {
    pub fn new(domain: Vec<D>) -> Self {
        Self {
            band: BandScale::new(domain).padding_inner(1.0),
        }
    }

    pub fn range(self, range: (f64, f64)) -> Self {
        Self {
            band: self.band.range(range),
        }
    }

    pub fn padding(self, padding: f64) -> Self {
        Self {
            band: self.band.padding_outer(padding),
        }
    }

    pub fn align(self, align: f64) -> Self {
        Self {
            band: self.band.align(align),
        }
    }

    pub fn round(self, round: bool) -> Self {
        Self {
            band: self.band.round(round),
        }
    }

    pub fn get_domain(&self) -> &[D] {
        self.band.get_domain()
    }

    pub fn get_range(&self) -> (f64, f64) {
        self.band.get_range()
    }

    pub fn get_padding(&self) -> f64 {
        self.band.get_padding_outer()
    }

    pub fn step(&self) -> f64 {
        self.band.step()
    }

    pub fn scale_value(&self, value: &D) -> Option<f64> {
        self.band.scale_value(value)
    }
}
