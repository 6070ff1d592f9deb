pub mod linear;
pub mod log;
pub mod pow;
pub mod radial;
pub mod symlog;

use std::fmt::Debug;

use linear::LinearScale;
use log::LogScale;
use pow::PowScale;
use radial::RadialScale;
use symlog::SymlogScale;

/// Shared interface of the continuous numeric scales.
pub trait ContinuousScale: Debug + Clone {
    fn domain(&self) -> (f64, f64);

    fn range(&self) -> (f64, f64);

    fn clamp(&self) -> bool;

    /// Maps one domain value into the range
    fn scale_value(&self, value: f64) -> f64;

    fn ticks(&self, count: Option<usize>) -> Vec<f64>;
}

/// Position of `value` within `(d0, d1)` as a fraction, computed on halved
/// operands so that domains spanning more than `f64::MAX` stay finite.
pub(crate) fn fraction(value: f64, (d0, d1): (f64, f64)) -> f64 {
    (value / 2.0 - d0 / 2.0) / (d1 / 2.0 - d0 / 2.0)
}

/// Interpolate a value that has already been transformed (log, pow, ...) into
/// the range. A zero-width or non-finite transformed domain maps every value
/// to the middle of the range instead of dividing by zero.
pub(crate) fn interpolate(
    value: f64,
    (d0, d1): (f64, f64),
    (r0, r1): (f64, f64),
    clamp: bool,
    round: bool,
) -> f64 {
    let out = if d0 == d1 || !d0.is_finite() || !d1.is_finite() {
        (r0 + r1) / 2.0
    } else {
        let mut t = fraction(value, (d0, d1));
        if clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + t * (r1 - r0)
    };
    if round {
        out.round()
    } else {
        out
    }
}

#[derive(Clone, Debug)]
pub enum NumericScale {
    Linear(LinearScale),
    Log(LogScale),
    Pow(PowScale),
    Symlog(SymlogScale),
    Radial(RadialScale),
}

impl ContinuousScale for NumericScale {
    fn domain(&self) -> (f64, f64) {
        match self {
            NumericScale::Linear(scale) => scale.domain(),
            NumericScale::Log(scale) => scale.domain(),
            NumericScale::Pow(scale) => scale.domain(),
            NumericScale::Symlog(scale) => scale.domain(),
            NumericScale::Radial(scale) => scale.domain(),
        }
    }

    fn range(&self) -> (f64, f64) {
        match self {
            NumericScale::Linear(scale) => scale.range(),
            NumericScale::Log(scale) => scale.range(),
            NumericScale::Pow(scale) => scale.range(),
            NumericScale::Symlog(scale) => scale.range(),
            NumericScale::Radial(scale) => scale.range(),
        }
    }

    fn clamp(&self) -> bool {
        match self {
            NumericScale::Linear(scale) => scale.clamp(),
            NumericScale::Log(scale) => scale.clamp(),
            NumericScale::Pow(scale) => scale.clamp(),
            NumericScale::Symlog(scale) => scale.clamp(),
            NumericScale::Radial(scale) => scale.clamp(),
        }
    }

    fn scale_value(&self, value: f64) -> f64 {
        match self {
            NumericScale::Linear(scale) => scale.scale_value(value),
            NumericScale::Log(scale) => scale.scale_value(value),
            NumericScale::Pow(scale) => scale.scale_value(value),
            NumericScale::Symlog(scale) => scale.scale_value(value),
            NumericScale::Radial(scale) => scale.scale_value(value),
        }
    }

    fn ticks(&self, count: Option<usize>) -> Vec<f64> {
        match self {
            NumericScale::Linear(scale) => scale.ticks(count),
            NumericScale::Log(scale) => scale.ticks(count),
            NumericScale::Pow(scale) => scale.ticks(count),
            NumericScale::Symlog(scale) => scale.ticks(count),
            NumericScale::Radial(scale) => scale.ticks(count),
        }
    }
}

impl From<LinearScale> for NumericScale {
    fn from(scale: LinearScale) -> Self {
        NumericScale::Linear(scale)
    }
}

impl From<LogScale> for NumericScale {
    fn from(scale: LogScale) -> Self {
        NumericScale::Log(scale)
    }
}

impl From<PowScale> for NumericScale {
    fn from(scale: PowScale) -> Self {
        NumericScale::Pow(scale)
    }
}

impl From<SymlogScale> for NumericScale {
    fn from(scale: SymlogScale) -> Self {
        NumericScale::Symlog(scale)
    }
}

impl From<RadialScale> for NumericScale {
    fn from(scale: RadialScale) -> Self {
        NumericScale::Radial(scale)
    }
}
