//! The fixed table of coordinate systems and their axes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::PipelineError;
use crate::value_type::ValueKind;

/// Name of the optional discriminator axis every system accepts.
pub const ENTITY_AXIS: &str = "entity";

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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CoordinateType {
    Affine,
    Barycentric,
    Cartesian,
    Geographic,
    Hexbin,
    #[serde(alias = "logPolar", alias = "log-polar")]
    #[strum(to_string = "log_polar", serialize = "logPolar", serialize = "log-polar")]
    LogPolar,
    Oblique,
    Parallel,
    Polar,
    Radar,
    Spherical,
    Ternary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisRole {
    /// Positioned on screen; has an extent and a scale
    Coordinate,
    /// Carried through to the records only
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSpec {
    pub name: &'static str,
    pub role: AxisRole,
    pub inverted: bool,
    pub required: bool,
    pub accepts: &'static [ValueKind],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateSystemSpec {
    pub ty: CoordinateType,
    pub axes: &'static [AxisSpec],
}

const NUMERIC: &[ValueKind] = &[ValueKind::Number];
const TEXT: &[ValueKind] = &[ValueKind::String];
const PLANAR: &[ValueKind] = &[ValueKind::Number, ValueKind::Date, ValueKind::String];
const ANY_KIND: &[ValueKind] = &[
    ValueKind::Number,
    ValueKind::String,
    ValueKind::Boolean,
    ValueKind::Date,
];

const fn coordinate(name: &'static str, accepts: &'static [ValueKind]) -> AxisSpec {
    AxisSpec {
        name,
        role: AxisRole::Coordinate,
        inverted: false,
        required: true,
        accepts,
    }
}

const fn inverted(name: &'static str, accepts: &'static [ValueKind]) -> AxisSpec {
    AxisSpec {
        inverted: true,
        ..coordinate(name, accepts)
    }
}

const fn annotation(name: &'static str, required: bool) -> AxisSpec {
    AxisSpec {
        name,
        role: AxisRole::Annotation,
        inverted: false,
        required,
        accepts: TEXT,
    }
}

static ENTITY: AxisSpec = AxisSpec {
    name: ENTITY_AXIS,
    role: AxisRole::Annotation,
    inverted: false,
    required: false,
    accepts: ANY_KIND,
};

const LABELED_PLANE: &[AxisSpec] = &[
    coordinate("x", PLANAR),
    inverted("y", PLANAR),
    annotation("label", false),
];
const PLANE: &[AxisSpec] = &[coordinate("x", PLANAR), inverted("y", PLANAR)];
const SIMPLEX: &[AxisSpec] = &[
    coordinate("A", NUMERIC),
    coordinate("B", NUMERIC),
    coordinate("C", NUMERIC),
    annotation("label", false),
];
const GEOGRAPHIC: &[AxisSpec] = &[
    coordinate("latitude", NUMERIC),
    coordinate("longitude", NUMERIC),
    annotation("name", true),
];
const RADIAL: &[AxisSpec] = &[coordinate("r", NUMERIC), coordinate("theta", NUMERIC)];
const IRIS: &[AxisSpec] = &[
    coordinate("sepal_length", NUMERIC),
    coordinate("sepal_width", NUMERIC),
    coordinate("petal_length", NUMERIC),
    coordinate("petal_width", NUMERIC),
];
const SPHERE: &[AxisSpec] = &[
    coordinate("r", NUMERIC),
    coordinate("theta", NUMERIC),
    coordinate("phi", NUMERIC),
    annotation("label", false),
];

impl CoordinateType {
    /// Ordered axes of the system, not including `entity`
    pub fn axes(&self) -> &'static [AxisSpec] {
        match self {
            CoordinateType::Affine | CoordinateType::Oblique => LABELED_PLANE,
            CoordinateType::Barycentric | CoordinateType::Ternary => SIMPLEX,
            CoordinateType::Cartesian | CoordinateType::Hexbin => PLANE,
            CoordinateType::Geographic => GEOGRAPHIC,
            CoordinateType::LogPolar | CoordinateType::Polar => RADIAL,
            CoordinateType::Parallel | CoordinateType::Radar => IRIS,
            CoordinateType::Spherical => SPHERE,
        }
    }

    pub fn spec(&self) -> CoordinateSystemSpec {
        CoordinateSystemSpec {
            ty: *self,
            axes: self.axes(),
        }
    }

    /// Looks up an axis by name, including `entity`
    pub fn axis(&self, name: &str) -> Option<&'static AxisSpec> {
        if name == ENTITY_AXIS {
            return Some(&ENTITY);
        }
        self.axes().iter().find(|axis| axis.name == name)
    }

    /// Axes that receive an extent and a scale
    pub fn coordinate_axes(&self) -> impl Iterator<Item = &'static AxisSpec> {
        self.axes()
            .iter()
            .filter(|axis| axis.role == AxisRole::Coordinate)
    }

    pub fn is_inverted(&self, axis: &str) -> bool {
        self.axis(axis).map(|axis| axis.inverted).unwrap_or(false)
    }

    /// Canonical names of every supported system
    pub fn supported() -> Vec<String> {
        CoordinateType::iter().map(|ty| ty.to_string()).collect()
    }
}

/// Resolves a coordinate system by name, accepting case-insensitive and
/// camel-case spellings.
pub fn parse_coordinate_type(name: &str) -> Result<CoordinateType, PipelineError> {
    CoordinateType::from_str(name.trim()).map_err(|_| PipelineError::InvalidCoordinateType {
        name: name.to_string(),
        supported: CoordinateType::supported(),
    })
}

/// Axis names of `ty` in order, not including `entity`
pub fn axes_of(ty: CoordinateType) -> Vec<&'static str> {
    ty.axes().iter().map(|axis| axis.name).collect()
}

pub fn is_inverted(ty: CoordinateType, axis: &str) -> bool {
    ty.is_inverted(axis)
}
