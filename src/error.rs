use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: {url} responded with status {status}")]
    Api { status: u16, url: String },

    #[error("Rate limit still exceeded for {url} after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },

    #[error("Year {0} cannot be represented as a calendar window")]
    InvalidYear(i32),

    #[error("Malformed input record at index {index}: {message}")]
    InputFormat { index: usize, message: String },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet output failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

impl InsightsError {
    /// True for failures raised while talking to the catalog API.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            InsightsError::Transport(_) | InsightsError::Api { .. } | InsightsError::RateLimited { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, InsightsError>;
