#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScaleError {
    #[error("Domain length ({domain_len}) does not match range length ({range_len})")]
    DomainRangeMismatch { domain_len: usize, range_len: usize },

    #[error("Empty range")]
    EmptyRange,

    #[error("Thresholds must be in ascending order: {0:?}")]
    ThresholdsNotAscending(Vec<f64>),

    #[error(
        "Threshold domain length ({domain_len}) must be one less than range length ({range_len})"
    )]
    ThresholdDomainMismatch { domain_len: usize, range_len: usize },

    #[error("Log domain [{start}, {end}] must be strictly positive or strictly negative")]
    InvalidLogDomain { start: f64, end: f64 },

    #[error("Log base must be positive and not equal to 1 (got {0})")]
    InvalidLogBase(f64),

    #[error("Domain [{start}, {end}] is not finite")]
    NonFiniteDomain { start: f64, end: f64 },
}
