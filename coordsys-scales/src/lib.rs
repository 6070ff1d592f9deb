pub mod array;
pub mod band;
pub mod error;
pub mod identity;
pub mod numeric;
pub mod ordinal;
pub mod point;
pub mod quantile;
pub mod quantize;
pub mod sequential;
pub mod temporal;
pub mod threshold;
