//! Verification entry point.
//!
//! hash -> verify or recover -> derive -> compare. Structural problems are
//! returned as errors; a well-formed signature that fails any check is an
//! ordinary `is_valid == false` result.

use crate::address::{encode_address, parse_address, parse_public_key, AddressScheme, PUBKEY_LEN};
use crate::error::{Result, SigcheckError};
use crate::hasher::{hash_message, HashMode, KeySource};
use crate::verifier::{recover_candidates, verify_with_key, RecoveredKey, SIGNATURE_LEN};

/// Everything needed to check one signed message, as raw bytes.
#[derive(Debug, Clone, Copy)]
pub struct VerifyInput<'a> {
    pub message: &'a [u8],
    /// 64 bytes, or 65 with a trailing recovery id in recovery modes.
    pub signature: &'a [u8],
    /// Required when the mode's key source is [`KeySource::Supplied`]. In
    /// recovery modes a supplied key must match the recovered one.
    pub public_key: Option<&'a [u8]>,
    pub recovery_id: Option<u8>,
    /// Bech32 address the signer claims; also the sign doc's `signer`.
    pub claimed_address: &'a str,
    pub prefix: &'a str,
    pub mode: HashMode,
}

/// Outcome of a verification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub is_valid: bool,
    /// The supplied or recovered compressed key.
    pub public_key: [u8; PUBKEY_LEN],
    pub signature: Vec<u8>,
    pub derived_address: String,
}

struct ClaimedAddress {
    prefix: String,
    account: Vec<u8>,
}

impl ClaimedAddress {
    fn parse(address: &str) -> Result<Self> {
        let (prefix, account) = parse_address(address)?;
        Ok(ClaimedAddress { prefix, account })
    }

    fn matches(&self, prefix: &str, account: &[u8]) -> bool {
        self.prefix == prefix.to_ascii_lowercase() && self.account == account
    }
}

fn to_pubkey_array(bytes: &[u8]) -> Result<[u8; PUBKEY_LEN]> {
    parse_public_key(bytes)?;
    let mut out = [0u8; PUBKEY_LEN];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Verify that `input.signature` signs `input.message` under `input.mode`
/// and that the signing key belongs to `input.claimed_address`.
pub fn verify(input: &VerifyInput<'_>) -> Result<VerificationResult> {
    let claimed = ClaimedAddress::parse(input.claimed_address)?;
    let scheme = input.mode.address_scheme();
    let digest = hash_message(input.message, input.mode, Some(input.claimed_address))?;

    let supplied = input.public_key.map(to_pubkey_array).transpose()?;

    let (public_key, signature_ok) = match input.mode.key_source() {
        KeySource::Supplied => {
            let public_key = supplied.ok_or_else(|| {
                SigcheckError::Format(format!("{} mode requires a public key", input.mode))
            })?;
            let ok = verify_with_key(input.signature, &digest, &public_key)?;
            (public_key, ok)
        }
        KeySource::Recovered => {
            let candidates = recover_candidates(input.signature, input.recovery_id, &digest)?;
            let chosen = select_candidate(&candidates, &claimed, input.prefix, supplied, scheme)?;
            let ok = verify_with_key(&input.signature[..SIGNATURE_LEN], &digest, &chosen.public_key)?;
            let ok = ok && supplied.map_or(true, |pk| pk == chosen.public_key);
            (chosen.public_key, ok)
        }
    };

    let account = scheme.account_bytes(&public_key)?;
    let derived_address = encode_address(input.prefix, &account)?;
    let address_ok = claimed.matches(input.prefix, &account);

    tracing::debug!(
        mode = %input.mode,
        signature_ok,
        address_ok,
        derived = %derived_address,
        "signature verification finished"
    );

    Ok(VerificationResult {
        is_valid: signature_ok && address_ok,
        public_key,
        signature: input.signature.to_vec(),
        derived_address,
    })
}

/// First candidate whose address is the claimed one (and which equals the
/// supplied key, if any); falls back to the first candidate.
fn select_candidate(
    candidates: &[RecoveredKey],
    claimed: &ClaimedAddress,
    prefix: &str,
    supplied: Option<[u8; PUBKEY_LEN]>,
    scheme: AddressScheme,
) -> Result<RecoveredKey> {
    for candidate in candidates {
        if supplied.map_or(false, |pk| pk != candidate.public_key) {
            continue;
        }
        let account = scheme.account_bytes(&candidate.public_key)?;
        if claimed.matches(prefix, &account) {
            tracing::trace!(recovery_id = candidate.recovery_id, "recovered key matches claimed address");
            return Ok(*candidate);
        }
    }

    candidates
        .first()
        .copied()
        .ok_or_else(|| SigcheckError::Recovery("no recovery candidates".to_string()))
}
