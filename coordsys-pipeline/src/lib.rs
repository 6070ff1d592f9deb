pub mod calculations;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod extent;
pub mod field;
pub mod geo;
pub mod path;
pub mod remap;
pub mod scale;
pub mod schema;
pub mod series;
pub mod system;
pub mod value_type;

pub use config::ChartConfig;
pub use coordinate::{axes_of, is_inverted, parse_coordinate_type, CoordinateType};
pub use error::{PipelineError, Stage};
pub use extent::Extent;
pub use field::{FieldDescriptor, ScaleKind, ScaleOptions};
pub use remap::{remap, TypedRecord};
pub use scale::AxisScale;
pub use schema::{AxisBinding, SchemaMap};
pub use series::{classify, SeriesRequest};
pub use system::{create_system, create_system_for_request, System};
pub use value_type::{coerce, Value, ValueType};
