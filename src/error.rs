use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpError {
    #[error("{0} environment variable is not set")]
    MissingCredential(&'static str),

    #[error("Invalid {field} {input:?}: use YYYY-MM-DD or RFC3339 format (e.g. 2020-01-01T01:02:03+10:00)")]
    InvalidDateFormat { field: &'static str, input: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed with status: {status}")]
    HttpStatus { status: u16 },

    #[error("Error decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Error parsing amount: {0:?}")]
    NumericParse(String),

    #[error("Total out of range while adding {0}")]
    Overflow(String),

    #[error("Pagination error: {0}")]
    Pagination(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UpError>;
