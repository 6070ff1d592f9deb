use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::value_type::{coerce, CoercionError, Value, ValueType};

/// Scale family used to map an axis into pixels.
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
pub enum ScaleKind {
    Linear,
    Log,
    Pow,
    Sqrt,
    Symlog,
    Radial,
    Time,
    Utc,
    Sequential,
    Diverging,
    Ordinal,
    Band,
    Point,
    Quantile,
    Quantize,
    Threshold,
    Identity,
}

impl ScaleKind {
    /// Families that map distinct categories rather than a numeric line
    pub fn is_discrete(&self) -> bool {
        matches!(self, ScaleKind::Ordinal | ScaleKind::Band | ScaleKind::Point)
    }
}

/// Per-field tuning passed through to the scale constructors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScaleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exponent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constant: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bins: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_inner: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_outer: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clamp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nice: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midpoint: Option<f64>,
}

impl ScaleOptions {
    pub fn is_empty(&self) -> bool {
        self == &ScaleOptions::default()
    }
}

/// Declares how one axis is read from the raw records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Dot / bracket path into each raw record
    pub key: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleKind>,
    /// `[min, max]` override in the same format as the data, either may be null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[Option<JsonValue>; 2]>,
    #[serde(default, skip_serializing_if = "ScaleOptions::is_empty")]
    pub scale_options: ScaleOptions,
}

/// Coerced extent override; each bound replaces the computed one when set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeOverride {
    pub min: Option<Value>,
    pub max: Option<Value>,
}

impl RangeOverride {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, ty: ValueType) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            ty,
            scale: None,
            range: None,
            scale_options: ScaleOptions::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_scale(mut self, scale: ScaleKind) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_range(mut self, min: Option<JsonValue>, max: Option<JsonValue>) -> Self {
        self.range = Some([min, max]);
        self
    }

    pub fn with_scale_options(mut self, options: ScaleOptions) -> Self {
        self.scale_options = options;
        self
    }

    /// Label for display, falling back to the key
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }

    /// Date types always use a time scale; everything else defaults to linear.
    pub fn effective_scale(&self) -> ScaleKind {
        if self.ty.is_date() {
            ScaleKind::Time
        } else {
            self.scale.unwrap_or(ScaleKind::Linear)
        }
    }

    /// Coerces the declared range bounds with the field's own type.
    pub fn range_override(&self) -> Result<RangeOverride, CoercionError> {
        let Some([min, max]) = &self.range else {
            return Ok(RangeOverride::default());
        };
        let bound = |raw: &Option<JsonValue>| match raw {
            None | Some(JsonValue::Null) => Ok(None),
            Some(raw) => coerce(self.ty, Some(raw)).map(Some),
        };
        Ok(RangeOverride {
            min: bound(min)?,
            max: bound(max)?,
        })
    }

    /// Copy with the effective scale written out
    pub fn resolved(&self) -> Self {
        Self {
            scale: Some(self.effective_scale()),
            ..self.clone()
        }
    }
}
