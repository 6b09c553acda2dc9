//! JSON/base64 boundary.
//!
//! Signatures and keys cross the boundary as standard base64, addresses as
//! bech32 strings. The request shape also accepts the wallet's own
//! `signArbitrary` response fields (`pub_key: {type, value}`) so a payload
//! can be forwarded without reshaping.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, SigcheckError};
use crate::hasher::HashMode;
use crate::verify::{verify, VerificationResult, VerifyInput};

/// A public key as either a bare base64 string or an amino `{type, value}` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicKeyField {
    Encoded(String),
    Typed {
        #[serde(rename = "type")]
        key_type: String,
        value: String,
    },
}

impl PublicKeyField {
    pub fn value(&self) -> &str {
        match self {
            PublicKeyField::Encoded(value) => value,
            PublicKeyField::Typed { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub message: String,
    /// Base64, 64 bytes (or 65 with a recovery id).
    pub signature: String,
    #[serde(default, alias = "pub_key", alias = "pubkey")]
    pub public_key: Option<PublicKeyField>,
    #[serde(default, alias = "recovery_id")]
    pub recovery_id: Option<u8>,
    #[serde(alias = "address", alias = "claimed_address")]
    pub claimed_address: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub mode: Option<HashMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    pub public_key: String,
    pub signature: String,
    pub derived_address: String,
}

impl From<VerificationResult> for VerifyResponse {
    fn from(result: VerificationResult) -> Self {
        VerifyResponse {
            is_valid: result.is_valid,
            public_key: BASE64.encode(result.public_key),
            signature: BASE64.encode(&result.signature),
            derived_address: result.derived_address,
        }
    }
}

/// Structured error body: `{kind, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
}

impl From<&SigcheckError> for ErrorResponse {
    fn from(err: &SigcheckError) -> Self {
        ErrorResponse {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Decode a standard-alphabet base64 field.
pub fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(value.trim())
        .map_err(|e| SigcheckError::Format(format!("{} is not valid base64: {}", field, e)))
}

/// Decode a request, fill in defaults from `config`, and verify it.
pub fn verify_request(request: &VerifyRequest, config: &Config) -> Result<VerifyResponse> {
    let signature = decode_base64("signature", &request.signature)?;
    let public_key = request
        .public_key
        .as_ref()
        .map(|pk| decode_base64("publicKey", pk.value()))
        .transpose()?;

    let prefix = request.prefix.as_deref().unwrap_or(&config.default_prefix);
    let mode = request.mode.unwrap_or(config.default_mode);

    let result = verify(&VerifyInput {
        message: request.message.as_bytes(),
        signature: &signature,
        public_key: public_key.as_deref(),
        recovery_id: request.recovery_id,
        claimed_address: &request.claimed_address,
        prefix,
        mode,
    })?;

    Ok(result.into())
}
