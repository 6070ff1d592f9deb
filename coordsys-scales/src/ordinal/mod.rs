use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::error::ScaleError;

/// A discrete scale that maps each domain value to the range value at the same
/// position. Values outside the domain map to the default.
#[derive(Debug, Clone)]
pub struct OrdinalScale<D, R>
where
    D: Clone + Hash + Eq + Debug,
    R: Clone + Debug,
{
    mapping: IndexMap<D, R>,
    default_value: R,
}

impl<D, R> OrdinalScale<D, R>
where
    D: Clone + Hash + Eq + Debug,
    R: Clone + Debug,
{
    pub fn try_new(domain: &[D], range: &[R], default_value: R) -> Result<Self, ScaleError> {
        if domain.len() != range.len() {
            return Err(ScaleError::DomainRangeMismatch {
                domain_len: domain.len(),
                range_len: range.len(),
            });
        }

        let mapping = domain
            .iter()
            .cloned()
            .zip(range.iter().cloned())
            .collect::<IndexMap<_, _>>();

        Ok(Self {
            mapping,
            default_value,
        })
    }

    pub fn default_value(&self) -> &R {
        &self.default_value
    }

    pub fn domain(&self) -> Vec<D> {
        self.mapping.keys().cloned().collect()
    }

    pub fn range(&self) -> Vec<R> {
        self.mapping.values().cloned().collect()
    }

    pub fn scale_value(&self, value: &D) -> R {
        self.mapping
            .get(value)
            .unwrap_or(&self.default_value)
            .clone()
    }
}
