use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LastFM Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Failed to serialize output: {0}")]
    Serialization(serde_json::Error),

    #[error("LastFM API error {code}: {message}")]
    LastFMApi { code: u32, message: String },

    #[error("LastFM user not found: {0}")]
    UserNotFound(String),

    #[error("LastFM API returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("LastFM API unexpected response: {0}")]
    LastFMUnexpectedResponse(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid data kind {0:?}, expected \"albums\" or \"tracks\"")]
    InvalidDataKind(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}

impl From<dotenvy::Error> for Error {
    fn from(err: dotenvy::Error) -> Self {
        match err {
            dotenvy::Error::Io(e) => Error::from(e),
            other => Error::ConfigurationError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
