//! secp256k1 signature verification and public key recovery.
//!
//! Both entry points take raw byte slices and validate lengths up front,
//! so a malformed buffer surfaces as [`SigcheckError::Format`] instead of a
//! bare `false`.

use k256::ecdsa::{signature::hazmat::PrehashVerifier, RecoveryId, Signature, VerifyingKey};

use crate::address::{parse_public_key, PUBKEY_LEN};
use crate::crypto::DIGEST_LEN;
use crate::error::{Result, SigcheckError};

/// Length of an `r || s` signature.
pub const SIGNATURE_LEN: usize = 64;

/// Length of an `r || s || v` signature.
pub const RECOVERABLE_SIGNATURE_LEN: usize = 65;

/// Offset Ethereum tooling adds to `v`.
const ETHEREUM_V_OFFSET: u8 = 27;

/// A public key reconstructed from a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveredKey {
    pub recovery_id: u8,
    pub public_key: [u8; PUBKEY_LEN],
}

fn check_digest(digest: &[u8]) -> Result<()> {
    if digest.len() != DIGEST_LEN {
        return Err(SigcheckError::Format(format!(
            "digest must be {} bytes, got {}",
            DIGEST_LEN,
            digest.len()
        )));
    }
    Ok(())
}

/// Parse a 64-byte `r || s` signature.
pub fn parse_signature(signature: &[u8]) -> Result<Signature> {
    if signature.len() != SIGNATURE_LEN {
        return Err(SigcheckError::Format(format!(
            "signature must be {} bytes, got {}",
            SIGNATURE_LEN,
            signature.len()
        )));
    }

    Signature::from_slice(signature)
        .map_err(|_| SigcheckError::Format("signature scalars are out of range".to_string()))
}

/// Whether `s` lies in the upper half of the curve order.
pub fn is_high_s(signature: &Signature) -> bool {
    signature.normalize_s().is_some()
}

/// Verify a 64-byte signature over a 32-byte digest with a compressed key.
///
/// Returns `Ok(false)` for a well-formed signature that does not verify,
/// including non-canonical high-S signatures.
pub fn verify_with_key(signature: &[u8], digest: &[u8], public_key: &[u8]) -> Result<bool> {
    let signature = parse_signature(signature)?;
    check_digest(digest)?;
    let verifying_key = parse_public_key(public_key)?;

    if is_high_s(&signature) {
        tracing::debug!("rejecting high-S signature");
        return Ok(false);
    }

    Ok(verifying_key.verify_prehash(digest, &signature).is_ok())
}

/// Split a 64- or 65-byte signature into `r || s` and an optional recovery id.
///
/// A 65-byte input carries `v` in its last byte (27..=30 is normalized to
/// 0..=3). An explicit `recovery_id` must agree with an embedded one.
pub fn split_recoverable(signature: &[u8], recovery_id: Option<u8>) -> Result<(Signature, Option<u8>)> {
    match signature.len() {
        SIGNATURE_LEN => Ok((parse_signature(signature)?, recovery_id)),
        RECOVERABLE_SIGNATURE_LEN => {
            let mut v = signature[SIGNATURE_LEN];
            if v >= ETHEREUM_V_OFFSET {
                v -= ETHEREUM_V_OFFSET;
            }
            if let Some(explicit) = recovery_id {
                if explicit != v {
                    return Err(SigcheckError::Format(format!(
                        "recovery id {} disagrees with the signature's embedded id {}",
                        explicit, v
                    )));
                }
            }
            Ok((parse_signature(&signature[..SIGNATURE_LEN])?, Some(v)))
        }
        other => Err(SigcheckError::Format(format!(
            "signature must be {} or {} bytes, got {}",
            SIGNATURE_LEN, RECOVERABLE_SIGNATURE_LEN, other
        ))),
    }
}

fn recover_one(digest: &[u8], signature: &Signature, recovery_id: RecoveryId) -> Option<[u8; PUBKEY_LEN]> {
    let verifying_key = VerifyingKey::recover_from_prehash(digest, signature, recovery_id).ok()?;
    let point = verifying_key.to_encoded_point(true);
    let mut out = [0u8; PUBKEY_LEN];
    out.copy_from_slice(point.as_bytes());
    Some(out)
}

/// Every public key the signature recovers to over `digest`.
///
/// With a known recovery id exactly one candidate is returned. Without one,
/// ids 0..=3 are tried in order. High-S signatures are normalized before
/// recovery (flipping the id's parity), so the key is still found and the
/// canonical-S rule stays with [`verify_with_key`].
pub fn recover_candidates(
    signature: &[u8],
    recovery_id: Option<u8>,
    digest: &[u8],
) -> Result<Vec<RecoveredKey>> {
    let (signature, recovery_id) = split_recoverable(signature, recovery_id)?;
    check_digest(digest)?;

    let (signature, flip) = match signature.normalize_s() {
        Some(normalized) => (normalized, 1u8),
        None => (signature, 0u8),
    };

    let ids: Vec<u8> = match recovery_id {
        Some(id) if id > 3 => {
            return Err(SigcheckError::Recovery(format!(
                "recovery id {} is out of range 0..=3",
                id
            )))
        }
        Some(id) => vec![id],
        None => (0..=3).collect(),
    };

    let candidates: Vec<RecoveredKey> = ids
        .into_iter()
        .filter_map(|id| {
            let rid = RecoveryId::from_byte(id ^ flip)?;
            recover_one(digest, &signature, rid).map(|public_key| RecoveredKey {
                recovery_id: id,
                public_key,
            })
        })
        .collect();

    tracing::trace!(count = candidates.len(), "recovered public key candidates");

    if candidates.is_empty() {
        return Err(SigcheckError::Recovery(
            "signature does not recover to a valid public key".to_string(),
        ));
    }
    Ok(candidates)
}

/// Recover the signer's compressed public key.
///
/// # Arguments
/// * `signature` - 65-byte `r || s || v`, or 64-byte `r || s`
/// * `recovery_id` - Recovery id for a 64-byte signature; when absent the
///   first id that yields a valid point wins
/// * `digest` - The 32-byte digest that was signed
pub fn recover_key(signature: &[u8], recovery_id: Option<u8>, digest: &[u8]) -> Result<[u8; PUBKEY_LEN]> {
    let candidates = recover_candidates(signature, recovery_id, digest)?;
    Ok(candidates[0].public_key)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::crypto::{compressed_public_key, sha256, sign_digest, sign_digest_recoverable, signing_key_from_hex};

    const KEY_A: &str = "1111111111111111111111111111111111111111111111111111111111111111";
    const KEY_B: &str = "2222222222222222222222222222222222222222222222222222222222222222";

    fn high_s(signature: &[u8; 64]) -> [u8; 64] {
        let sig = Signature::from_slice(signature).unwrap();
        let flipped = Signature::from_scalars(sig.r().to_bytes(), (-*sig.s()).to_bytes()).unwrap();
        let mut out = [0u8; 64];
        out.copy_from_slice(&flipped.to_bytes());
        out
    }

    #[test]
    fn test_verify_with_key() {
        let key = signing_key_from_hex(KEY_A).unwrap();
        let digest = sha256(b"hello");
        let sig = sign_digest(&key, &digest).unwrap();
        assert!(verify_with_key(&sig, &digest, &compressed_public_key(&key)).unwrap());
    }

    #[test]
    fn test_verify_rejects_other_digest_and_key() {
        let key = signing_key_from_hex(KEY_A).unwrap();
        let other = signing_key_from_hex(KEY_B).unwrap();
        let digest = sha256(b"hello");
        let sig = sign_digest(&key, &digest).unwrap();

        assert!(!verify_with_key(&sig, &sha256(b"hellO"), &compressed_public_key(&key)).unwrap());
        assert!(!verify_with_key(&sig, &digest, &compressed_public_key(&other)).unwrap());
    }

    #[test]
    fn test_verify_rejects_high_s() {
        let key = signing_key_from_hex(KEY_A).unwrap();
        let digest = sha256(b"hello");
        let sig = sign_digest(&key, &digest).unwrap();
        let malleated = high_s(&sig);
        assert_ne!(sig, malleated);
        assert!(!verify_with_key(&malleated, &digest, &compressed_public_key(&key)).unwrap());
    }

    #[test]
    fn test_verify_format_errors() {
        let key = signing_key_from_hex(KEY_A).unwrap();
        let pubkey = compressed_public_key(&key);
        let digest = sha256(b"hello");
        let sig = sign_digest(&key, &digest).unwrap();

        assert!(matches!(verify_with_key(&sig[..63], &digest, &pubkey), Err(SigcheckError::Format(_))));
        assert!(matches!(verify_with_key(&sig, &digest[..31], &pubkey), Err(SigcheckError::Format(_))));
        assert!(matches!(verify_with_key(&sig, &digest, &pubkey[..10]), Err(SigcheckError::Format(_))));
        assert!(matches!(verify_with_key(&[0u8; 64], &digest, &pubkey), Err(SigcheckError::Format(_))));
    }

    #[test]
    fn test_recover_key_from_65_bytes() {
        let key = signing_key_from_hex(KEY_A).unwrap();
        let digest = sha256(b"recover me");
        let sig = sign_digest_recoverable(&key, &digest).unwrap();
        assert_eq!(recover_key(&sig, None, &digest).unwrap(), compressed_public_key(&key));
    }

    #[test]
    fn test_recover_key_with_ethereum_v() {
        let key = signing_key_from_hex(KEY_A).unwrap();
        let digest = sha256(b"recover me");
        let mut sig = sign_digest_recoverable(&key, &digest).unwrap();
        sig[64] += 27;
        assert_eq!(recover_key(&sig, None, &digest).unwrap(), compressed_public_key(&key));
    }

    #[test]
    fn test_recover_key_with_external_id() {
        let key = signing_key_from_hex(KEY_A).unwrap();
        let digest = sha256(b"recover me");
        let sig = sign_digest_recoverable(&key, &digest).unwrap();
        let recovered = recover_key(&sig[..64], Some(sig[64]), &digest).unwrap();
        assert_eq!(recovered, compressed_public_key(&key));
    }

    #[test]
    fn test_candidates_include_signer() {
        let key = signing_key_from_hex(KEY_B).unwrap();
        let digest = sha256(b"no id");
        let sig = sign_digest(&key, &digest).unwrap();
        let candidates = recover_candidates(&sig, None, &digest).unwrap();
        assert!(candidates.len() >= 2);
        assert!(candidates.iter().any(|c| c.public_key == compressed_public_key(&key)));
    }

    #[test]
    fn test_recovery_from_high_s_finds_signer() {
        let key = signing_key_from_hex(KEY_A).unwrap();
        let digest = sha256(b"malleable");
        let sig = sign_digest_recoverable(&key, &digest).unwrap();
        let mut low = [0u8; 64];
        low.copy_from_slice(&sig[..64]);
        let malleated = high_s(&low);
        // Flipping s flips the parity of the recovery id.
        let recovered = recover_key(&malleated, Some(sig[64] ^ 1), &digest).unwrap();
        assert_eq!(recovered, compressed_public_key(&key));
    }

    #[test]
    fn test_recovery_id_out_of_range() {
        let key = signing_key_from_hex(KEY_A).unwrap();
        let digest = sha256(b"x");
        let sig = sign_digest(&key, &digest).unwrap();
        assert!(matches!(recover_key(&sig, Some(4), &digest), Err(SigcheckError::Recovery(_))));
    }

    #[test]
    fn test_recovery_id_disagreement() {
        let key = signing_key_from_hex(KEY_A).unwrap();
        let digest = sha256(b"x");
        let sig = sign_digest_recoverable(&key, &digest).unwrap();
        let wrong = (sig[64] + 1) % 4;
        assert!(matches!(recover_key(&sig, Some(wrong), &digest), Err(SigcheckError::Format(_))));
    }

    /// `r = 0x70 || 0..0` is not the x-coordinate of any secp256k1 point, and
    /// `r + n` exceeds the field prime, so no recovery id can succeed.
    pub(crate) fn unrecoverable_signature() -> [u8; 64] {
        let mut sig = [0u8; 64];
        sig[0] = 0x70;
        sig[63] = 0x01;
        sig
    }

    #[test]
    fn test_unrecoverable_signature() {
        let digest = sha256(b"x");
        let sig = unrecoverable_signature();
        assert!(parse_signature(&sig).is_ok());
        assert!(matches!(recover_key(&sig, None, &digest), Err(SigcheckError::Recovery(_))));
        for id in 0..=3 {
            assert!(matches!(recover_key(&sig, Some(id), &digest), Err(SigcheckError::Recovery(_))));
        }
    }

    #[test]
    fn test_recovery_rejects_bad_lengths() {
        let digest = sha256(b"x");
        assert!(matches!(recover_key(&[1u8; 40], None, &digest), Err(SigcheckError::Format(_))));
    }
}
