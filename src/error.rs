use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinisignError {
    #[error("Malformed record: {0}")]
    Format(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Authentication failed: wrong password or corrupted key file")]
    Authentication,

    #[error("Signature verification failed")]
    Verification,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MinisignError>;
