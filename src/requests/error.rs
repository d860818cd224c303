use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("heights must be supplied for field: {0}")]
    MissingHeight(String),

    #[error("field {0} does not take a height")]
    UnexpectedHeight(String),

    #[error("height {height} not available for field: {field} ({min}-{max})")]
    HeightOutOfRange {
        field: String,
        height: i32,
        min: i32,
        max: i32,
    },
}
