//! `[min, max]` per measured axis on the ordering line of each value type.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::field::RangeOverride;
use crate::remap::TypedRecord;
use crate::schema::SeriesSchema;
use crate::value_type::Value;

/// Bounds of an axis. `Empty` stands in for "no records" so downstream code
/// never sees NaN or infinities. Serializes as `null` or `[min, max]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Extent {
    #[default]
    Empty,
    Bounded {
        min: f64,
        max: f64,
    },
}

impl Extent {
    /// Extent of the finite values in `values`
    pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(Extent::Empty, |extent, v| extent.include(v))
    }

    pub fn include(self, value: f64) -> Self {
        match self {
            Extent::Empty => Extent::Bounded {
                min: value,
                max: value,
            },
            Extent::Bounded { min, max } => Extent::Bounded {
                min: min.min(value),
                max: max.max(value),
            },
        }
    }

    pub fn union(self, other: Extent) -> Self {
        match other {
            Extent::Empty => self,
            Extent::Bounded { min, max } => self.include(min).include(max),
        }
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            Extent::Empty => None,
            Extent::Bounded { min, max } => Some((*min, *max)),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Extent::Empty)
    }

    /// `max - min`, zero when empty
    pub fn width(&self) -> f64 {
        self.bounds().map(|(min, max)| max - min).unwrap_or(0.0)
    }
}

impl Serialize for Extent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.bounds() {
            None => serializer.serialize_none(),
            Some((min, max)) => [min, max].serialize(serializer),
        }
    }
}

/// Extent of `axis` across `records`, by each value's ordering key.
pub fn extent(axis: &str, records: &[TypedRecord]) -> Extent {
    Extent::of(
        records
            .iter()
            .filter_map(|record| record.get(axis))
            .map(Value::ordering_key),
    )
}

/// Replaces each bound the override sets. An empty extent only becomes
/// bounded when both bounds are given.
pub fn apply_override(extent: Extent, range: &RangeOverride) -> Extent {
    let min = range.min.as_ref().map(Value::ordering_key);
    let max = range.max.as_ref().map(Value::ordering_key);
    match (extent, min, max) {
        (_, None, None) => extent,
        (Extent::Empty, Some(min), Some(max)) => Extent::Bounded { min, max },
        (Extent::Empty, _, _) => Extent::Empty,
        (Extent::Bounded { min: lo, max: hi }, min, max) => Extent::Bounded {
            min: min.unwrap_or(lo),
            max: max.unwrap_or(hi),
        },
    }
}

/// Extents of every measured axis of `schema`, overrides applied.
pub fn compute_extents(schema: &SeriesSchema, records: &[TypedRecord]) -> IndexMap<String, Extent> {
    schema
        .measured()
        .map(|(axis, field)| (axis.clone(), apply_override(extent(axis, records), &field.range)))
        .collect()
}

/// Per-axis union of several extent maps, keeping first-seen axis order.
pub fn union_extents<'a>(
    extents: impl IntoIterator<Item = &'a IndexMap<String, Extent>>,
) -> IndexMap<String, Extent> {
    let mut out: IndexMap<String, Extent> = IndexMap::new();
    for map in extents {
        for (axis, extent) in map {
            let entry = out.entry(axis.clone()).or_default();
            *entry = entry.union(*extent);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn records(axis: &str, values: Vec<Value>) -> Vec<TypedRecord> {
        values
            .into_iter()
            .map(|v| TypedRecord::from([(axis.to_string(), v)]))
            .collect()
    }

    #[test]
    fn test_numeric_extent() {
        let rs = records("x", vec![Value::Number(3.0), Value::Number(-1.0), Value::Number(2.0)]);
        assert_eq!(extent("x", &rs), Extent::Bounded { min: -1.0, max: 3.0 });
        assert_eq!(extent("y", &rs), Extent::Empty);
    }

    #[test]
    fn test_type_specific_ordering() {
        let rs = records(
            "x",
            vec![Value::String("b".into()), Value::String("A".into()), Value::String("".into())],
        );
        assert_eq!(extent("x", &rs), Extent::Bounded { min: 0.0, max: 98.0 });

        let rs = records("x", vec![Value::Boolean(true), Value::Boolean(false)]);
        assert_eq!(extent("x", &rs), Extent::Bounded { min: 0.0, max: 1.0 });

        let day = Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap();
        let rs = records("x", vec![Value::Date(day)]);
        assert_eq!(
            extent("x", &rs),
            Extent::Bounded {
                min: 86_400_000.0,
                max: 86_400_000.0
            }
        );
    }

    #[test]
    fn test_overrides() {
        let bounded = Extent::Bounded { min: 1.0, max: 5.0 };
        let partial = RangeOverride {
            min: Some(Value::Number(0.0)),
            max: None,
        };
        assert_eq!(
            apply_override(bounded, &partial),
            Extent::Bounded { min: 0.0, max: 5.0 }
        );
        assert_eq!(apply_override(Extent::Empty, &partial), Extent::Empty);

        let full = RangeOverride {
            min: Some(Value::Number(0.0)),
            max: Some(Value::Number(10.0)),
        };
        assert_eq!(
            apply_override(Extent::Empty, &full),
            Extent::Bounded { min: 0.0, max: 10.0 }
        );
    }

    #[test]
    fn test_union_and_serialize() {
        let a = IndexMap::from([("x".to_string(), Extent::Bounded { min: 0.0, max: 2.0 })]);
        let b = IndexMap::from([
            ("x".to_string(), Extent::Bounded { min: -1.0, max: 1.0 }),
            ("y".to_string(), Extent::Empty),
        ]);
        let union = union_extents([&a, &b]);
        assert_eq!(
            serde_json::to_value(&union).unwrap(),
            json!({"x": [-1.0, 2.0], "y": null})
        );
        assert_eq!(Extent::of([f64::NAN, f64::INFINITY]), Extent::Empty);
        assert_eq!(Extent::Empty.width(), 0.0);
    }
}
