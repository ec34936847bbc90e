use thiserror::Error;

/// Errors produced by the values-finder pipelines and their collaborators
#[derive(Error, Debug)]
pub enum ValuesFinderError {
    /// A history record points at an option that does not exist
    #[error("invalid selected index at history[{position}]: {selected} (choice has {options} options)")]
    InvalidChoice {
        position: usize,
        selected: usize,
        options: usize,
    },

    #[error("Template error: {0}")]
    Template(String),

    /// The model reply could not be decoded into the expected shape
    #[error("Response format error: {reason}. Raw: {raw}")]
    ResponseFormat { reason: String, raw: String },

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ValuesFinderError {
    pub fn response_format(reason: impl Into<String>, raw: &str) -> Self {
        Self::ResponseFormat {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }
}

impl From<minijinja::Error> for ValuesFinderError {
    fn from(e: minijinja::Error) -> Self {
        Self::Template(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ValuesFinderError>;
