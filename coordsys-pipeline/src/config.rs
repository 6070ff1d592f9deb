use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Chart dimensions and presentation settings.
///
/// Copied into a loaded system as given, unknown keys included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skew_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skew_y: Option<f64>,
    #[serde(flatten)]
    pub extra: IndexMap<String, JsonValue>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            id: None,
            title: None,
            width: 500.0,
            height: 500.0,
            margin: 50.0,
            skew_x: None,
            skew_y: None,
            extra: IndexMap::new(),
        }
    }
}

impl ChartConfig {
    pub fn new(width: f64, height: f64, margin: f64) -> Self {
        Self {
            width,
            height,
            margin,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Pixel range of an axis: `[margin, width - margin]`, or
    /// `[height - margin, margin]` for inverted axes.
    pub fn pixel_range(&self, inverted: bool) -> (f64, f64) {
        if inverted {
            (self.height - self.margin, self.margin)
        } else {
            (self.margin, self.width - self.margin)
        }
    }
}
