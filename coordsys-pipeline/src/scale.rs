//! Per-axis pixel scales built from extents, field descriptors and the chart
//! configuration.

use indexmap::IndexMap;
use itertools::Itertools;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use coordsys_scales::array;
use coordsys_scales::band::BandScale;
use coordsys_scales::error::ScaleError;
use coordsys_scales::identity::IdentityScale;
use coordsys_scales::numeric::linear::{LinearScale, LinearScaleConfig};
use coordsys_scales::numeric::log::{LogScale, LogScaleConfig};
use coordsys_scales::numeric::pow::{PowScale, PowScaleConfig};
use coordsys_scales::numeric::radial::RadialScale;
use coordsys_scales::numeric::symlog::{SymlogScale, SymlogScaleConfig};
use coordsys_scales::numeric::{ContinuousScale, NumericScale};
use coordsys_scales::ordinal::OrdinalScale;
use coordsys_scales::point::PointScale;
use coordsys_scales::quantile::QuantileScale;
use coordsys_scales::quantize::QuantizeScale;
use coordsys_scales::sequential::{DivergingScale, SequentialScale};
use coordsys_scales::temporal::{TimeScale, TimeScaleConfig};
use coordsys_scales::threshold::ThresholdScale;

use crate::config::ChartConfig;
use crate::error::PipelineError;
use crate::extent::Extent;
use crate::field::{ScaleKind, ScaleOptions};
use crate::remap::TypedRecord;
use crate::schema::{BoundField, SeriesSchema};
use crate::value_type::Value;

const DEFAULT_BINS: usize = 4;
const DEFAULT_TICKS: usize = 10;

/// A tick mark: the domain value and where it lands in pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: Value,
    pub position: f64,
}

/// Domain of a built scale. Continuous and discretizing scales have numeric
/// domains, discrete and time scales keep the data values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScaleDomain {
    Numbers(Vec<f64>),
    Values(Vec<Value>),
}

#[derive(Debug, Clone)]
enum ScaleImpl {
    Numeric(NumericScale),
    Time(TimeScale),
    Sequential(SequentialScale),
    Diverging(DivergingScale),
    Ordinal(OrdinalScale<String, f64>, Vec<Value>),
    Band(BandScale<String>, Vec<Value>),
    Point(PointScale<String>, Vec<Value>),
    Quantile(QuantileScale<f64>),
    Quantize(QuantizeScale<f64>),
    Threshold(ThresholdScale<f64>),
    Identity(IdentityScale, (f64, f64)),
}

/// The scale of one measured axis.
#[derive(Debug, Clone)]
pub struct AxisScale {
    pub axis: String,
    pub kind: ScaleKind,
    pub inverted: bool,
    pixel_range: (f64, f64),
    inner: ScaleImpl,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl AxisScale {
    /// Pixel position of `value`; `None` for values the scale cannot place,
    /// such as an unknown category.
    pub fn apply(&self, value: &Value) -> Option<f64> {
        let key = value.ordering_key();
        match &self.inner {
            ScaleImpl::Numeric(scale) => finite(scale.scale_value(key)),
            ScaleImpl::Time(scale) => finite(scale.scale_value(key)),
            ScaleImpl::Sequential(scale) => finite(scale.scale_value(key)),
            ScaleImpl::Diverging(scale) => finite(scale.scale_value(key)),
            ScaleImpl::Ordinal(scale, _) => finite(scale.scale_value(&value.category())),
            ScaleImpl::Band(scale, _) => scale.scale_value(&value.category()),
            ScaleImpl::Point(scale, _) => scale.scale_value(&value.category()),
            ScaleImpl::Quantile(scale) => finite(scale.scale_value(key)),
            ScaleImpl::Quantize(scale) => finite(scale.scale_value(key)),
            ScaleImpl::Threshold(scale) => finite(scale.scale_value(key)),
            ScaleImpl::Identity(scale, _) => finite(scale.scale_value(key)),
        }
    }

    /// Pixel positions of the axis value of every record
    pub fn apply_all(&self, records: &[TypedRecord]) -> Vec<Option<f64>> {
        records
            .iter()
            .map(|record| record.get(&self.axis).and_then(|value| self.apply(value)))
            .collect()
    }

    pub fn domain(&self) -> ScaleDomain {
        match &self.inner {
            ScaleImpl::Numeric(scale) => {
                let (d0, d1) = scale.domain();
                ScaleDomain::Numbers(vec![d0, d1])
            }
            ScaleImpl::Time(scale) => {
                let (d0, d1) = scale.domain();
                ScaleDomain::Values(
                    [d0, d1]
                        .into_iter()
                        .filter_map(coordsys_scales::temporal::from_millis)
                        .map(Value::Date)
                        .collect(),
                )
            }
            ScaleImpl::Sequential(scale) => {
                let (d0, d1) = scale.domain();
                ScaleDomain::Numbers(vec![d0, d1])
            }
            ScaleImpl::Diverging(scale) => {
                let (d0, mid, d1) = scale.domain();
                ScaleDomain::Numbers(vec![d0, mid, d1])
            }
            ScaleImpl::Ordinal(_, categories)
            | ScaleImpl::Band(_, categories)
            | ScaleImpl::Point(_, categories) => ScaleDomain::Values(categories.clone()),
            ScaleImpl::Quantile(scale) => ScaleDomain::Numbers(scale.get_domain().to_vec()),
            ScaleImpl::Quantize(scale) => {
                let (d0, d1) = scale.get_domain();
                ScaleDomain::Numbers(vec![d0, d1])
            }
            ScaleImpl::Threshold(scale) => ScaleDomain::Numbers(scale.thresholds().to_vec()),
            ScaleImpl::Identity(_, (d0, d1)) => ScaleDomain::Numbers(vec![*d0, *d1]),
        }
    }

    /// Output values: the pixel interval for continuous and discrete scales,
    /// the bin centers for discretizing scales.
    pub fn range(&self) -> Vec<f64> {
        match &self.inner {
            ScaleImpl::Quantile(scale) => scale.get_range().to_vec(),
            ScaleImpl::Quantize(scale) => scale.get_range().to_vec(),
            ScaleImpl::Threshold(scale) => scale.range().to_vec(),
            ScaleImpl::Identity(_, (d0, d1)) => vec![*d0, *d1],
            _ => vec![self.pixel_range.0, self.pixel_range.1],
        }
    }

    pub fn pixel_range(&self) -> (f64, f64) {
        self.pixel_range
    }

    /// Reference values along the axis with their pixel positions
    pub fn ticks(&self, count: Option<usize>) -> Vec<Tick> {
        let numbers = |values: Vec<f64>| -> Vec<Tick> {
            values
                .into_iter()
                .filter_map(|v| {
                    let value = Value::Number(v);
                    self.apply(&value).map(|position| Tick { value, position })
                })
                .collect()
        };
        let discrete = |values: &[Value]| -> Vec<Tick> {
            values
                .iter()
                .filter_map(|value| {
                    let position = match &self.inner {
                        ScaleImpl::Band(scale, _) => scale.center(&value.category()),
                        _ => self.apply(value),
                    }?;
                    Some(Tick {
                        value: value.clone(),
                        position,
                    })
                })
                .collect()
        };

        match &self.inner {
            ScaleImpl::Numeric(scale) => numbers(scale.ticks(count)),
            ScaleImpl::Sequential(scale) => numbers(scale.ticks(count)),
            ScaleImpl::Diverging(scale) => numbers(scale.ticks(count)),
            ScaleImpl::Time(scale) => scale
                .tick_datetimes(count)
                .into_iter()
                .map(|date| Tick {
                    position: scale.scale_datetime(&date),
                    value: Value::Date(date),
                })
                .collect(),
            ScaleImpl::Ordinal(_, values)
            | ScaleImpl::Band(_, values)
            | ScaleImpl::Point(_, values) => discrete(values),
            ScaleImpl::Quantile(scale) => numbers(scale.quantiles().to_vec()),
            ScaleImpl::Quantize(scale) => numbers(scale.thresholds().to_vec()),
            ScaleImpl::Threshold(scale) => numbers(scale.thresholds().to_vec()),
            ScaleImpl::Identity(_, (d0, d1)) => {
                numbers(array::ticks(*d0, *d1, count.unwrap_or(DEFAULT_TICKS)))
            }
        }
    }
}

impl Serialize for AxisScale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AxisScale", 4)?;
        state.serialize_field("type", &self.kind)?;
        state.serialize_field("domain", &self.domain())?;
        state.serialize_field("range", &self.range())?;
        state.serialize_field("inverted", &self.inverted)?;
        state.end()
    }
}

/// Distinct values of `axis` in first-appearance order, keyed by category
fn categories(axis: &str, records: &[TypedRecord]) -> (Vec<String>, Vec<Value>) {
    records
        .iter()
        .filter_map(|record| record.get(axis))
        .unique_by(|value| value.category())
        .map(|value| (value.category(), value.clone()))
        .unzip()
}

/// Centers of `bins` equal segments of `range`
fn bin_centers((r0, r1): (f64, f64), bins: usize) -> Vec<f64> {
    let bins = bins.max(1);
    let step = (r1 - r0) / bins as f64;
    (0..bins).map(|i| r0 + (i as f64 + 0.5) * step).collect()
}

/// Evenly spread positions, first at `r0` and last at `r1`
fn spread((r0, r1): (f64, f64), count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![(r0 + r1) / 2.0],
        n => {
            let step = (r1 - r0) / (n - 1) as f64;
            (0..n).map(|i| r0 + i as f64 * step).collect()
        }
    }
}

fn continuous_domain(kind: ScaleKind, extent: Extent) -> (f64, f64) {
    extent.bounds().unwrap_or(match kind {
        ScaleKind::Log => (1.0, 10.0),
        ScaleKind::Time | ScaleKind::Utc => TimeScaleConfig::default().domain,
        _ => (0.0, 1.0),
    })
}

fn build(
    kind: ScaleKind,
    axis: &str,
    options: &ScaleOptions,
    extent: Extent,
    records: &[TypedRecord],
    range: (f64, f64),
) -> Result<ScaleImpl, ScaleError> {
    let domain = continuous_domain(kind, extent);
    let clamp = options.clamp.unwrap_or(false);
    let nice = options.nice.unwrap_or(false);
    let bins = options.bins.unwrap_or(DEFAULT_BINS).max(1);

    let inner = match kind {
        ScaleKind::Linear => ScaleImpl::Numeric(
            LinearScale::new(&LinearScaleConfig {
                domain,
                range,
                clamp,
                nice: nice.then_some(DEFAULT_TICKS),
                round: false,
            })
            .into(),
        ),
        ScaleKind::Log => ScaleImpl::Numeric(
            LogScale::try_new(&LogScaleConfig {
                domain,
                range,
                base: options.base.unwrap_or(10.0),
                clamp,
                nice,
            })?
            .into(),
        ),
        ScaleKind::Pow | ScaleKind::Sqrt => {
            let config = PowScaleConfig {
                domain,
                range,
                exponent: options.exponent.unwrap_or(1.0),
                clamp,
                nice: nice.then_some(DEFAULT_TICKS),
            };
            let scale = if kind == ScaleKind::Sqrt {
                PowScale::sqrt(&config)
            } else {
                PowScale::new(&config)
            };
            ScaleImpl::Numeric(scale.into())
        }
        ScaleKind::Symlog => ScaleImpl::Numeric(
            SymlogScale::new(&SymlogScaleConfig {
                domain,
                range,
                constant: options.constant.unwrap_or(1.0),
                clamp,
            })
            .into(),
        ),
        ScaleKind::Radial => {
            ScaleImpl::Numeric(RadialScale::new(domain, range).with_clamp(clamp).into())
        }
        ScaleKind::Time | ScaleKind::Utc => ScaleImpl::Time(TimeScale::new(&TimeScaleConfig {
            domain,
            range,
            clamp,
            nice,
        })),
        ScaleKind::Sequential => ScaleImpl::Sequential(SequentialScale::new(domain, range)),
        ScaleKind::Diverging => {
            let (d0, d1) = domain;
            let mid = options.midpoint.unwrap_or((d0 + d1) / 2.0);
            ScaleImpl::Diverging(DivergingScale::new((d0, mid, d1), range))
        }
        ScaleKind::Ordinal => {
            let (keys, values) = categories(axis, records);
            let positions = spread(range, keys.len());
            ScaleImpl::Ordinal(OrdinalScale::try_new(&keys, &positions, f64::NAN)?, values)
        }
        ScaleKind::Band => {
            let (keys, values) = categories(axis, records);
            let padding = options.padding.unwrap_or(0.0);
            let scale = BandScale::new(keys)
                .range(range)
                .padding_inner(options.padding_inner.unwrap_or(padding))
                .padding_outer(options.padding_outer.unwrap_or(padding))
                .align(options.align.unwrap_or(0.5));
            ScaleImpl::Band(scale, values)
        }
        ScaleKind::Point => {
            let (keys, values) = categories(axis, records);
            let scale = PointScale::new(keys)
                .range(range)
                .padding(options.padding.or(options.padding_outer).unwrap_or(0.0))
                .align(options.align.unwrap_or(0.5));
            ScaleImpl::Point(scale, values)
        }
        ScaleKind::Quantile => {
            let samples: Vec<f64> = records
                .iter()
                .filter_map(|record| record.get(axis))
                .map(Value::ordering_key)
                .collect();
            ScaleImpl::Quantile(QuantileScale::try_new(
                &samples,
                bin_centers(range, bins),
                f64::NAN,
            )?)
        }
        ScaleKind::Quantize => {
            let scale = QuantizeScale::try_new(domain, bin_centers(range, bins), f64::NAN)?;
            ScaleImpl::Quantize(if nice { scale.nice(None) } else { scale })
        }
        ScaleKind::Threshold => {
            let thresholds = options.thresholds.clone().unwrap_or_else(|| {
                let (d0, d1) = domain;
                (1..bins)
                    .map(|i| d0 + (d1 - d0) * i as f64 / bins as f64)
                    .collect()
            });
            let outputs = bin_centers(range, thresholds.len() + 1);
            ScaleImpl::Threshold(ThresholdScale::try_new(thresholds, outputs, f64::NAN)?)
        }
        ScaleKind::Identity => ScaleImpl::Identity(IdentityScale::new(), domain),
    };
    Ok(inner)
}

/// Builds the scale of one measured axis over `extent`.
///
/// Inverted axes map onto the chart height, everything else onto the width.
/// Discrete and quantile scales read their domain from `records`.
pub fn build_scale(
    axis: &str,
    field: &BoundField,
    extent: Extent,
    records: &[TypedRecord],
    config: &ChartConfig,
) -> Result<AxisScale, PipelineError> {
    let kind = field.descriptor.effective_scale();
    let pixel_range = config.pixel_range(field.inverted);
    let inner = build(
        kind,
        axis,
        &field.descriptor.scale_options,
        extent,
        records,
        pixel_range,
    )
    .map_err(|err| PipelineError::InvalidScaleConfiguration {
        axis: axis.to_string(),
        scale: kind.to_string(),
        reason: err.to_string(),
    })?;
    Ok(AxisScale {
        axis: axis.to_string(),
        kind,
        inverted: field.inverted,
        pixel_range,
        inner,
    })
}

/// Scales of every measured axis of `schema`. Axes without an extent use
/// the empty extent and the family's default domain.
pub fn compute_scales(
    schema: &SeriesSchema,
    extents: &IndexMap<String, Extent>,
    records: &[TypedRecord],
    config: &ChartConfig,
) -> Result<IndexMap<String, AxisScale>, PipelineError> {
    schema
        .measured()
        .map(|(axis, field)| {
            let extent = extents.get(axis).copied().unwrap_or_default();
            build_scale(axis, field, extent, records, config).map(|scale| (axis.clone(), scale))
        })
        .collect()
}
