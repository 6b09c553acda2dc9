//! Address derivation.
//!
//! A bech32 address is `prefix + bech32(hash(pubkey)[..20])`. Which hash
//! depends on the account-key convention, so it is named by an
//! [`AddressScheme`] instead of being left to the call site.

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use k256::ecdsa::VerifyingKey;

use crate::crypto::{keccak256, ripemd160, sha256};
use crate::error::{Result, SigcheckError};

/// Length of a compressed secp256k1 public key.
pub const PUBKEY_LEN: usize = 33;

/// Length of the account bytes inside every address.
pub const ADDRESS_LEN: usize = 20;

/// How a public key is hashed into the 20 account bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressScheme {
    /// `SHA-256(compressed pubkey)[0..20]`
    Sha256Truncated,
    /// `RIPEMD-160(SHA-256(compressed pubkey))`, the Cosmos SDK secp256k1 account
    Cosmos,
    /// `Keccak-256(uncompressed pubkey without 0x04)[12..32]`, the Ethermint
    /// `ethsecp256k1` account
    Ethermint,
}

impl AddressScheme {
    /// Hash a compressed public key into account bytes.
    pub fn account_bytes(self, pubkey_bytes: &[u8]) -> Result<[u8; ADDRESS_LEN]> {
        let verifying_key = parse_public_key(pubkey_bytes)?;

        match self {
            AddressScheme::Sha256Truncated => {
                let hash = sha256(pubkey_bytes);
                let mut out = [0u8; ADDRESS_LEN];
                out.copy_from_slice(&hash[..ADDRESS_LEN]);
                Ok(out)
            }
            AddressScheme::Cosmos => {
                // SHA256 -> RIPEMD160
                Ok(ripemd160(&sha256(pubkey_bytes)))
            }
            AddressScheme::Ethermint => {
                let uncompressed = verifying_key.to_encoded_point(false);
                let hash = keccak256(&uncompressed.as_bytes()[1..]);
                let mut out = [0u8; ADDRESS_LEN];
                out.copy_from_slice(&hash[32 - ADDRESS_LEN..]);
                Ok(out)
            }
        }
    }
}

/// Parse a compressed SEC1 public key, rejecting anything that isn't a
/// 33-byte point on secp256k1.
pub fn parse_public_key(pubkey_bytes: &[u8]) -> Result<VerifyingKey> {
    if pubkey_bytes.len() != PUBKEY_LEN {
        return Err(SigcheckError::Format(format!(
            "public key must be {} bytes, got {}",
            PUBKEY_LEN,
            pubkey_bytes.len()
        )));
    }

    VerifyingKey::from_sec1_bytes(pubkey_bytes)
        .map_err(|_| SigcheckError::Format("public key is not a valid secp256k1 point".to_string()))
}

fn parse_prefix(prefix: &str) -> Result<Hrp> {
    Hrp::parse(prefix).map_err(|e| SigcheckError::Format(format!("Invalid prefix: {}", e)))
}

/// Bech32-encode 20 account bytes under `prefix`.
pub fn encode_address(prefix: &str, account: &[u8; ADDRESS_LEN]) -> Result<String> {
    let hrp = parse_prefix(prefix)?;
    bech32::encode::<Bech32>(hrp, account)
        .map_err(|e| SigcheckError::Format(format!("bech32 encoding failed: {}", e)))
}

/// Decode a bech32 address into its prefix and account bytes.
///
/// Only the bech32 checksum is accepted; a bech32m string over the same
/// bytes is a different address.
pub fn parse_address(address: &str) -> Result<(String, Vec<u8>)> {
    let checked = CheckedHrpstring::new::<Bech32>(address)
        .map_err(|e| SigcheckError::Format(format!("invalid bech32 address {:?}: {}", address, e)))?;

    let hrp = checked.hrp().as_str().to_ascii_lowercase();
    Ok((hrp, checked.byte_iter().collect()))
}

/// Derive the bech32 address of a compressed public key.
///
/// # Arguments
/// * `pubkey_bytes` - Compressed public key bytes (33 bytes)
/// * `prefix` - Bech32 prefix (e.g., "cosmos", "sent")
/// * `scheme` - Which account hash to apply
pub fn derive_address(pubkey_bytes: &[u8], prefix: &str, scheme: AddressScheme) -> Result<String> {
    // Prefix errors take precedence over key errors.
    parse_prefix(prefix)?;
    let account = scheme.account_bytes(pubkey_bytes)?;
    encode_address(prefix, &account)
}

/// Convert a public key to a standard Cosmos bech32 address.
///
/// address = RIPEMD160(SHA256(pubkey))
pub fn pubkey_to_address(pubkey_bytes: &[u8], prefix: &str) -> Result<String> {
    derive_address(pubkey_bytes, prefix, AddressScheme::Cosmos)
}
