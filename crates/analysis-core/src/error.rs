use thiserror::Error;

/// Result of computing a single derived metric.
pub type MetricResult = Result<f64, MetricsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Metric undefined: {0}")]
    MetricUndefined(Undefined),

    #[error("Computation fault: {0}")]
    ComputationFault(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why a metric has no value even though the inputs were readable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Undefined {
    #[error("line item '{0}' not reported")]
    MissingLineItem(String),

    #[error("{0} not available")]
    MissingInput(&'static str),

    #[error("fewer than two periods of '{0}'")]
    InsufficientHistory(String),

    #[error("oldest value of '{0}' is zero")]
    ZeroBase(String),

    #[error("zero denominator in {0}")]
    ZeroDenominator(&'static str),

    #[error("non-finite result in {0}")]
    NonFiniteResult(&'static str),
}

impl MetricsError {
    /// True for unexpected faults that should be reported as diagnostics,
    /// false for values that are legitimately undefined.
    pub fn is_fault(&self) -> bool {
        !matches!(self, MetricsError::MetricUndefined(_))
    }
}

impl From<Undefined> for MetricsError {
    fn from(reason: Undefined) -> Self {
        MetricsError::MetricUndefined(reason)
    }
}
