use thiserror::Error;

/// Kiosk-related errors
#[derive(Error, Debug)]
pub enum KioskError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("The kiosk event loop has stopped")]
    Stopped,
}

/// Convenient Result type alias
pub type KioskResult<T> = Result<T, KioskError>;
