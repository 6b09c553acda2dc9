//! Error types for cosmos-sigcheck

use thiserror::Error;

/// Structural failures. A well-formed signature that simply does not verify
/// is not an error; it is reported as `is_valid == false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigcheckError {
    /// Wrong-length or undecodable signature, key, or address input.
    #[error("Malformed input: {0}")]
    Format(String),

    /// The message cannot be wrapped for the requested hash mode.
    #[error("Message encoding failed: {0}")]
    Encoding(String),

    /// No valid public key could be recovered from the signature.
    #[error("Public key recovery failed: {0}")]
    Recovery(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SigcheckError {
    /// Stable name used for the `kind` field of wire error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            SigcheckError::Format(_) => "FormatError",
            SigcheckError::Encoding(_) => "EncodingError",
            SigcheckError::Recovery(_) => "RecoveryError",
            SigcheckError::Config(_) => "ConfigError",
        }
    }
}

pub type Result<T> = std::result::Result<T, SigcheckError>;
