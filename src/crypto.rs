//! Cryptographic primitives for cosmos-sigcheck
//!
//! Provides:
//! - Hash functions (SHA-256, Keccak-256, RIPEMD-160)
//! - Deterministic secp256k1 signing, used to produce fixture signatures
//!   the way a wallet extension would

use k256::ecdsa::{signature::hazmat::PrehashSigner, Signature, SigningKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::error::{Result, SigcheckError};

/// Length of every digest fed into the signature verifier.
pub const DIGEST_LEN: usize = 32;

/// Compute SHA256 hash
pub fn sha256(data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute Keccak-256 hash (the pre-standard SHA-3 padding used by Ethereum).
pub fn keccak256(data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute RIPEMD160 hash
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Parse a hex-encoded secp256k1 private key (0x prefix optional).
pub fn signing_key_from_hex(privkey_hex: &str) -> Result<SigningKey> {
    let privkey_hex = privkey_hex.trim_start_matches("0x");
    let privkey_bytes = hex::decode(privkey_hex)
        .map_err(|e| SigcheckError::Format(format!("private key is not hex: {}", e)))?;

    SigningKey::from_slice(&privkey_bytes)
        .map_err(|e| SigcheckError::Format(format!("invalid private key: {}", e)))
}

/// Compressed (33-byte) public key for a signing key.
pub fn compressed_public_key(signing_key: &SigningKey) -> [u8; 33] {
    let point = signing_key.verifying_key().to_encoded_point(true);
    let mut out = [0u8; 33];
    out.copy_from_slice(point.as_bytes());
    out
}

/// Sign a 32-byte digest.
///
/// The digest is signed as-is (no further hashing), so the caller picks the
/// hash mode. RFC 6979 nonces make the output deterministic and `k256`
/// always emits the low-S form.
///
/// # Returns
/// Signature bytes (64 bytes, r || s)
pub fn sign_digest(signing_key: &SigningKey, digest: &[u8; DIGEST_LEN]) -> Result<[u8; 64]> {
    let signature: Signature = signing_key
        .sign_prehash(digest)
        .map_err(|e| SigcheckError::Format(format!("signing failed: {}", e)))?;

    let mut out = [0u8; 64];
    out.copy_from_slice(&signature.to_bytes());
    Ok(out)
}

/// Sign a 32-byte digest and append the recovery id.
///
/// # Returns
/// Recoverable signature bytes (65 bytes, r || s || v with v in 0..=3)
pub fn sign_digest_recoverable(
    signing_key: &SigningKey,
    digest: &[u8; DIGEST_LEN],
) -> Result<[u8; 65]> {
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(digest)
        .map_err(|e| SigcheckError::Format(format!("signing failed: {}", e)))?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = recovery_id.to_byte();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_KEY: &str = "1111111111111111111111111111111111111111111111111111111111111111";

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_keccak256_known_vector() {
        // Keccak-256 of the empty string, not SHA3-256.
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_ripemd160_known_vector() {
        assert_eq!(
            hex::encode(ripemd160(b"abc")),
            "8eb208f7e05d987a9b044a8e98c6b087f15a0bfc"
        );
    }

    #[test]
    fn test_signing_key_from_hex() {
        assert!(signing_key_from_hex(FIXTURE_KEY).is_ok());
        assert!(signing_key_from_hex(&format!("0x{}", FIXTURE_KEY)).is_ok());
        assert!(matches!(signing_key_from_hex("zz"), Err(SigcheckError::Format(_))));
        assert!(matches!(signing_key_from_hex("1234"), Err(SigcheckError::Format(_))));
    }

    #[test]
    fn test_sign_digest_is_deterministic() {
        let key = signing_key_from_hex(FIXTURE_KEY).unwrap();
        let digest = sha256(b"hello");
        assert_eq!(sign_digest(&key, &digest).unwrap(), sign_digest(&key, &digest).unwrap());
    }

    #[test]
    fn test_recoverable_prefix_matches_plain_signature() {
        let key = signing_key_from_hex(FIXTURE_KEY).unwrap();
        let digest = sha256(b"hello");
        let plain = sign_digest(&key, &digest).unwrap();
        let recoverable = sign_digest_recoverable(&key, &digest).unwrap();
        assert_eq!(&recoverable[..64], &plain[..]);
        assert!(recoverable[64] <= 3);
    }

    #[test]
    fn test_compressed_public_key_prefix() {
        let key = signing_key_from_hex(FIXTURE_KEY).unwrap();
        let pubkey = compressed_public_key(&key);
        assert!(pubkey[0] == 0x02 || pubkey[0] == 0x03);
    }
}
