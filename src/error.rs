use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The generation endpoint answered with a non-success status.
    #[error("Request failed with HTTP {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("{context}: {source}")]
    Transport {
        context: String,
        source: reqwest::Error,
    },

    /// Missing, empty or unparseable result list.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Result carries neither a url nor b64_json")]
    UnknownEncoding,

    /// The secondary download of a returned image URL did not succeed.
    #[error("Failed to fetch image from {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Invalid base64 image data: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ImageError>;
