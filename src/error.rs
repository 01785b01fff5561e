//! Error taxonomy for MentionCore
//!
//! - `ConfigurationError` - bad category shape, fatal at construction
//! - `ParseFailure` - a parse/display adapter produced the wrong shape
//! - `TransportFailure` - network or non-success response reported by the host
//! - `FetchFailure` - either of the two above, recovered as an empty result
//! - `SpliceError` - the surface no longer matches the captured anchor
//!
//! Only `ConfigurationError` ever crosses the widget boundary.

use serde::Serialize;

// =============================================================================
// Configuration
// =============================================================================

/// Raised while registering categories or validating the widget config.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    EmptyKey,
    DuplicateKey(String),
    EmptyUrl(String),
    UnrecognizedShape { key: String, found: &'static str },
    InvalidData { key: String, found: &'static str },
    InvalidRecord { key: String, index: usize },
    InvalidConfig(String),
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::EmptyKey => write!(f, "Category key must not be empty"),
            ConfigurationError::DuplicateKey(key) => {
                write!(f, "Category '{}' is registered twice", key)
            }
            ConfigurationError::EmptyUrl(key) => {
                write!(f, "Category '{}' has an empty URL", key)
            }
            ConfigurationError::UnrecognizedShape { key, found } => {
                write!(f, "Category '{}': unrecognized config shape ({})", key, found)
            }
            ConfigurationError::InvalidData { key, found } => {
                write!(f, "Category '{}': 'data' must be a URL or a list, got {}", key, found)
            }
            ConfigurationError::InvalidRecord { key, index } => {
                write!(f, "Category '{}': record #{} is neither an object nor a scalar", key, index)
            }
            ConfigurationError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigurationError {}

// =============================================================================
// Fetch-time failures
// =============================================================================

/// A payload could not be normalized into records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseFailure {
    NotASequence,
    InvalidElement { index: usize },
    MissingPath { path: String },
    Adapter { message: String },
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseFailure::NotASequence => write!(f, "Payload is not a sequence"),
            ParseFailure::InvalidElement { index } => {
                write!(f, "Payload element #{} is not a record", index)
            }
            ParseFailure::MissingPath { path } => write!(f, "Payload has no '{}' field", path),
            ParseFailure::Adapter { message } => write!(f, "Parse adapter failed: {}", message),
        }
    }
}

impl std::error::Error for ParseFailure {}

/// The host could not deliver a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportFailure {
    Network { message: String },
    Status { code: u16 },
    InvalidJson { message: String },
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportFailure::Network { message } => write!(f, "Network error: {}", message),
            TransportFailure::Status { code } => write!(f, "Request failed with status {}", code),
            TransportFailure::InvalidJson { message } => write!(f, "Invalid JSON: {}", message),
        }
    }
}

impl std::error::Error for TransportFailure {}

/// Why a fetch yielded no records. Surfaced as "no results" in the dropdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "failure", rename_all = "snake_case")]
pub enum FetchFailure {
    Transport(TransportFailure),
    Parse(ParseFailure),
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchFailure::Transport(e) => write!(f, "{}", e),
            FetchFailure::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FetchFailure {}

impl From<TransportFailure> for FetchFailure {
    fn from(e: TransportFailure) -> Self {
        FetchFailure::Transport(e)
    }
}

impl From<ParseFailure> for FetchFailure {
    fn from(e: ParseFailure) -> Self {
        FetchFailure::Parse(e)
    }
}

// =============================================================================
// Splicing
// =============================================================================

/// A surface mutation was refused; nothing was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceError {
    UnknownRun,
    StaleAnchor,
    OutOfBounds,
    MissingTrigger,
}

impl std::fmt::Display for SpliceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpliceError::UnknownRun => write!(f, "Text run no longer exists"),
            SpliceError::StaleAnchor => write!(f, "Text run changed since the anchor was captured"),
            SpliceError::OutOfBounds => write!(f, "Range is outside the text run"),
            SpliceError::MissingTrigger => write!(f, "Trigger character not found at anchor"),
        }
    }
}

impl std::error::Error for SpliceError {}
