use thiserror::Error;

// === StoreError ===

/// Errors raised by the bookmark persistence store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored collection could not be decoded. User data is left untouched.
    #[error("Bookmark store is corrupt: {0}")]
    CorruptStore(String),
    /// The underlying key-value medium failed.
    #[error("Bookmark store database error: {0}")]
    Database(String),
    /// The collection could not be encoded for writing.
    #[error("Bookmark store serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

// === AnalysisError ===

/// Failures inside the analysis client.
///
/// These never reach callers of `analyze`; they are logged and replaced by the
/// fallback record.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No API key was configured for the model provider.
    #[error("No API key configured (set {0})")]
    MissingApiKey(String),
    /// The request could not be sent or the body could not be read.
    #[error("AI network error: {0}")]
    Network(String),
    /// The provider answered with a non-success status.
    #[error("AI provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// The provider answered without any text.
    #[error("AI provider returned no text")]
    EmptyResponse,
    /// The model text contained no brace-delimited object.
    #[error("No JSON object found in model output")]
    NoJsonFound,
    /// The extracted object did not decode.
    #[error("Failed to decode model output: {0}")]
    Decode(String),
}

// === FlowError ===

/// Errors from the add-bookmark flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    /// The URL field was empty.
    #[error("URL must not be empty")]
    EmptyUrl,
    /// An analysis is already running.
    #[error("An analysis is already in progress")]
    AnalysisInProgress,
    /// The requested transition is not valid from the current step.
    #[error("Invalid step: expected {expected}, found {found}")]
    InvalidStep {
        expected: &'static str,
        found: &'static str,
    },
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
