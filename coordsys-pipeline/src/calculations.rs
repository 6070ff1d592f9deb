//! Per-series aggregation and per-record transforms over numeric axes.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::PipelineError;
use crate::remap::TypedRecord;
use crate::schema::BoundField;
use crate::value_type::{Value, ValueKind};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Raw,
    Sum,
    Average,
    Median,
    Min,
    Max,
    Count,
    Variance,
    Stddev,
    #[serde(rename = "quantile25")]
    #[strum(serialize = "quantile25")]
    Quantile25,
    #[serde(rename = "quantile75")]
    #[strum(serialize = "quantile75")]
    Quantile75,
    Range,
    Cumulative,
    Normalize,
    Percentile,
    #[serde(alias = "zScore")]
    #[strum(to_string = "z_score", serialize = "zScore")]
    ZScore,
}

impl Operation {
    /// Collapses a group of records into one
    pub fn is_reducing(&self) -> bool {
        !matches!(
            self,
            Operation::Cumulative | Operation::Normalize | Operation::Percentile | Operation::ZScore
        )
    }

    /// Every operation but `raw` writes numbers back into the axis
    pub fn requires_numeric(&self) -> bool {
        !matches!(self, Operation::Raw)
    }
}

/// Checks that every operation targets a bound axis it can be applied to.
pub fn validate_operations(
    operations: &IndexMap<String, Operation>,
    fields: &IndexMap<String, BoundField>,
) -> Result<(), PipelineError> {
    let invalid = |axis: &str, operation: &Operation, reason: &str| PipelineError::InvalidOperation {
        axis: axis.to_string(),
        operation: operation.to_string(),
        reason: reason.to_string(),
    };

    for (axis, operation) in operations {
        let field = fields
            .get(axis)
            .ok_or_else(|| invalid(axis, operation, "axis is not bound in the schema"))?;
        if operation.requires_numeric() && field.descriptor.ty.kind() != Some(ValueKind::Number) {
            return Err(invalid(axis, operation, "operation requires a numeric axis"));
        }
    }

    let reducing = operations.values().filter(|op| op.is_reducing()).count();
    if reducing > 0 && reducing < operations.len() {
        let (axis, operation) = operations
            .iter()
            .find(|(_, op)| !op.is_reducing())
            .map(|(axis, op)| (axis.as_str(), *op))
            .unwrap_or(("", Operation::Raw));
        return Err(invalid(
            axis,
            &operation,
            "per-record operations cannot be combined with aggregations",
        ));
    }
    Ok(())
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by_key(|v| OrderedFloat(*v));
    sorted
}

fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        sum(values) / values.len() as f64
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Population variance
fn variance(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let avg = average(values);
    average(&values.iter().map(|v| (v - avg).powi(2)).collect::<Vec<_>>())
}

fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted(values);
    let idx = ((sorted.len() as f64 * q).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

fn cumulative(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

fn normalize(values: &[f64]) -> Vec<f64> {
    let (lo, hi) = (min(values), max(values));
    let span = hi - lo;
    values
        .iter()
        .map(|v| if span == 0.0 { 0.5 } else { (v - lo) / span })
        .collect()
}

/// Rank of the first occurrence of each value, scaled to 0..=100
fn percentile(values: &[f64]) -> Vec<f64> {
    let sorted = sorted(values);
    let last = sorted.len().saturating_sub(1);
    values
        .iter()
        .map(|v| {
            let index = sorted.partition_point(|s| s < v);
            if last == 0 {
                0.0
            } else {
                index as f64 / last as f64 * 100.0
            }
        })
        .collect()
}

fn z_score(values: &[f64]) -> Vec<f64> {
    if values.len() <= 1 {
        return vec![0.0; values.len()];
    }
    let avg = average(values);
    let sd = variance(values).sqrt();
    values
        .iter()
        .map(|v| if sd == 0.0 { 0.0 } else { (v - avg) / sd })
        .collect()
}

impl Operation {
    /// Reduces a numeric sample to a single value, `None` for per-record
    /// operations
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        let value = match self {
            Operation::Raw => values.first().copied().unwrap_or(0.0),
            Operation::Sum => sum(values),
            Operation::Average => average(values),
            Operation::Median => median(values),
            Operation::Min => min(values),
            Operation::Max => max(values),
            Operation::Count => values.len() as f64,
            Operation::Variance => variance(values),
            Operation::Stddev => variance(values).sqrt(),
            Operation::Quantile25 => quantile(values, 0.25),
            Operation::Quantile75 => quantile(values, 0.75),
            Operation::Range => {
                if values.is_empty() {
                    0.0
                } else {
                    max(values) - min(values)
                }
            }
            Operation::Cumulative
            | Operation::Normalize
            | Operation::Percentile
            | Operation::ZScore => return None,
        };
        Some(value)
    }

    /// Rewrites each value of a sample, keeping its length
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        match self {
            Operation::Cumulative => cumulative(values),
            Operation::Normalize => normalize(values),
            Operation::Percentile => percentile(values),
            Operation::ZScore => z_score(values),
            _ => values.to_vec(),
        }
    }
}

/// Applies the operations to the records of one series.
///
/// Records are grouped by the values of every bound axis without an
/// operation, in order of first appearance. Reducing operations emit one
/// record per group; per-record operations rewrite values in place.
pub fn apply_operations(
    records: Vec<TypedRecord>,
    operations: &IndexMap<String, Operation>,
) -> Vec<TypedRecord> {
    if operations.is_empty() || records.is_empty() {
        return records;
    }

    let group_key = |record: &TypedRecord| -> Vec<String> {
        record
            .iter()
            .filter(|(axis, _)| !operations.contains_key(*axis))
            .map(|(_, value)| value.category())
            .collect()
    };

    let mut groups: IndexMap<Vec<String>, Vec<usize>> = IndexMap::new();
    for (i, record) in records.iter().enumerate() {
        groups.entry(group_key(record)).or_default().push(i);
    }

    let sample = |indices: &[usize], axis: &str| -> Vec<f64> {
        indices
            .iter()
            .filter_map(|i| records[*i].get(axis).and_then(Value::as_f64))
            .collect()
    };

    let reducing = operations.values().all(|op| op.is_reducing());
    if reducing {
        return groups
            .values()
            .map(|indices| {
                let mut record = records[indices[0]].clone();
                for (axis, operation) in operations {
                    let value = match operation {
                        Operation::Raw => None,
                        Operation::Count => Some(indices.len() as f64),
                        op => op.reduce(&sample(indices, axis)),
                    };
                    if let Some(value) = value {
                        record.insert(axis.clone(), Value::Number(value));
                    }
                }
                record
            })
            .collect();
    }

    let mut updates: Vec<(usize, String, f64)> = Vec::new();
    for indices in groups.values() {
        for (axis, operation) in operations {
            let transformed = operation.transform(&sample(indices, axis));
            updates.extend(
                indices
                    .iter()
                    .zip(transformed)
                    .map(|(i, value)| (*i, axis.clone(), value)),
            );
        }
    }

    let mut records = records;
    for (i, axis, value) in updates {
        if let Some(slot) = records[i].get_mut(&axis) {
            *slot = Value::Number(value);
        }
    }
    records
}
