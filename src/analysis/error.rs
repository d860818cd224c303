use polars::datatypes::DataType;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Required column '{0}' not found in DataFrame")]
    ColumnNotFound(String),

    #[error("No column containing '{0}' found in DataFrame")]
    NoMatchingColumn(String),

    #[error("'time_index' must be a datetime column, found {0}")]
    InvalidTimeIndex(DataType),

    #[error("data must not be empty")]
    EmptyData,

    #[error("\"fields\" and \"labels\" must have the same length ({fields} != {labels})")]
    LabelMismatch { fields: usize, labels: usize },

    #[error("At least {required} positive wind speeds are needed to fit a distribution, found {found}")]
    InsufficientSamples { required: usize, found: usize },

    #[error("Wind speed sample has no spread, cannot fit a distribution")]
    DegenerateSample,

    #[error("Weibull shape estimate did not converge after {0} iterations")]
    FitDidNotConverge(usize),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
