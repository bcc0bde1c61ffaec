use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Error talking to the species service at {endpoint}: {message}")]
    Connection { endpoint: String, message: String },
    #[error("Species service returned HTTP {status} {status_text}")]
    Status { status: u16, status_text: String },
    #[error("Error decoding species response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Connection failures get a different visible record than server-side
    /// failures.
    pub fn is_connection(&self) -> bool {
        matches!(self, FetchError::Connection { .. })
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("A scan is already in flight")]
    AlreadyScanning,
}

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Error talking to {service}: {message}")]
    Request {
        service: &'static str,
        message: String,
    },
    #[error("Error decoding {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file could not be read: {0}")]
    Unreadable(#[from] std::io::Error),
    #[error("Configuration file could not be parsed: {0}")]
    Invalid(#[from] serde_yml::Error),
}
