use thiserror::Error;

/// Failures of the import pipeline and the publisher.
///
/// The `Display` text is what the user sees; `kind()` is a stable tag for
/// API clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// Malformed or empty request payload; no external call was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The recipe URL could not be fetched
    #[error("Could not retrieve content from the provided URL ({}): {reason}", status_label(.status))]
    SourceUnreachable { status: Option<u16>, reason: String },

    /// The model returned no text for the supplied images
    #[error("Could not find a recipe in that source: no text could be read from the images")]
    ExtractionEmpty,

    /// The model returned nothing usable
    #[error("Could not find a recipe in that source: {0}")]
    ExtractionFailed(String),

    /// Mealie rejected the recipe
    #[error("Failed to send recipe to Mealie ({}): {detail}", status_label(.status))]
    PublishFailed { status: Option<u16>, detail: String },
}

impl TransformError {
    pub fn kind(&self) -> &'static str {
        match self {
            TransformError::InvalidInput(_) => "invalid_input",
            TransformError::SourceUnreachable { .. } => "source_unreachable",
            TransformError::ExtractionEmpty => "extraction_empty",
            TransformError::ExtractionFailed(_) => "extraction_failed",
            TransformError::PublishFailed { .. } => "publish_failed",
        }
    }

    /// Upstream HTTP status, when the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransformError::SourceUnreachable { status, .. }
            | TransformError::PublishFailed { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no response".to_string(),
    }
}

/// Errors raised while building or calling an LLM provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0} not found in config or environment")]
    MissingApiKey(&'static str),

    #[error("Provider '{0}' is not enabled in configuration")]
    Disabled(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider '{0}' not found in configuration")]
    NotConfigured(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No providers available in fallback configuration")]
    NoProviders,

    #[error("All providers failed:\n{0}")]
    AllFailed(String),
}

/// Errors from the session and settings store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors from editing a recipe before it is published
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Title is required.")]
    TitleRequired,

    #[error("No {list} row at index {index} (list has {len})")]
    IndexOutOfRange {
        list: &'static str,
        index: usize,
        len: usize,
    },
}

/// Startup errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Transform(#[from] TransformError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}
