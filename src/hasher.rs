//! Message hashing.
//!
//! Turns the signed payload into the 32-byte digest the wallet actually
//! signed. The mode must match what the signer did bit-for-bit: a wrong
//! mode yields a different digest and the signature simply won't verify.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::address::AddressScheme;
use crate::crypto::{keccak256, sha256, DIGEST_LEN};
use crate::error::{Result, SigcheckError};

/// Amino type tag of the single message embedded in an arbitrary-data sign doc.
pub const SIGN_DATA_MSG_TYPE: &str = "sign/MsgSignData";

/// Hash primitive applied to the (possibly wrapped) message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Keccak256,
}

impl DigestAlgorithm {
    pub fn digest(self, data: &[u8]) -> [u8; DIGEST_LEN] {
        match self {
            DigestAlgorithm::Sha256 => sha256(data),
            DigestAlgorithm::Keccak256 => keccak256(data),
        }
    }
}

/// Where the public key used for verification comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// The caller hands over the compressed key alongside the signature.
    Supplied,
    /// The key is reconstructed from the signature and digest.
    Recovered,
}

/// A complete signing convention.
///
/// Each variant pins down the payload wrapping, the digest primitive, the
/// key source and the address scheme together, so a caller can never pair
/// a digest from one convention with an address from another by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMode {
    /// SHA-256 over the raw UTF-8 message, key supplied, address is
    /// `SHA-256(pubkey)[0..20]`.
    #[default]
    Raw,
    /// Keccak-256 over the amino sign doc, key recovered from the signature,
    /// Ethermint-style address.
    #[serde(rename = "amino")]
    AminoSignDoc,
    /// Keplr `signArbitrary` as checked by `verifyADR36Amino`: SHA-256 over
    /// the amino sign doc, key supplied, standard Cosmos address.
    Adr36,
}

impl HashMode {
    pub fn digest_algorithm(self) -> DigestAlgorithm {
        match self {
            HashMode::Raw | HashMode::Adr36 => DigestAlgorithm::Sha256,
            HashMode::AminoSignDoc => DigestAlgorithm::Keccak256,
        }
    }

    pub fn key_source(self) -> KeySource {
        match self {
            HashMode::Raw | HashMode::Adr36 => KeySource::Supplied,
            HashMode::AminoSignDoc => KeySource::Recovered,
        }
    }

    pub fn address_scheme(self) -> AddressScheme {
        match self {
            HashMode::Raw => AddressScheme::Sha256Truncated,
            HashMode::AminoSignDoc => AddressScheme::Ethermint,
            HashMode::Adr36 => AddressScheme::Cosmos,
        }
    }

    /// Whether the message is wrapped in a sign doc naming the signer.
    pub fn wraps_sign_doc(self) -> bool {
        !matches!(self, HashMode::Raw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashMode::Raw => "raw",
            HashMode::AminoSignDoc => "amino",
            HashMode::Adr36 => "adr36",
        }
    }
}

impl fmt::Display for HashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashMode {
    type Err = SigcheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(HashMode::Raw),
            "amino" | "amino_sign_doc" => Ok(HashMode::AminoSignDoc),
            "adr36" | "adr-36" => Ok(HashMode::Adr36),
            other => Err(SigcheckError::Format(format!("unknown hash mode: {}", other))),
        }
    }
}

// Amino sign doc. Fields are declared in lexicographic order: serde
// serializes struct fields in declaration order, which gives the sorted-key
// canonical form without depending on serde_json's map ordering.

#[derive(Debug, Clone, Serialize)]
pub struct SignDataValue {
    pub data: String,
    pub signer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AminoMsg {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub value: SignDataValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct Coin {
    pub amount: String,
    pub denom: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    pub gas: String,
}

/// Legacy amino `StdSignDoc` with every transactional field zeroed.
#[derive(Debug, Clone, Serialize)]
pub struct AminoSignDoc {
    pub account_number: String,
    pub chain_id: String,
    pub fee: StdFee,
    pub memo: String,
    pub msgs: Vec<AminoMsg>,
    pub sequence: String,
}

impl AminoSignDoc {
    /// Wrap `message` for `signer` the way wallets do for arbitrary data.
    pub fn sign_data(signer: &str, message: &[u8]) -> Self {
        AminoSignDoc {
            account_number: "0".to_string(),
            chain_id: String::new(),
            fee: StdFee {
                amount: Vec::new(),
                gas: "0".to_string(),
            },
            memo: String::new(),
            msgs: vec![AminoMsg {
                msg_type: SIGN_DATA_MSG_TYPE,
                value: SignDataValue {
                    data: BASE64.encode(message),
                    signer: signer.to_string(),
                },
            }],
            sequence: "0".to_string(),
        }
    }

    /// Canonical bytes: compact JSON with `&`, `<` and `>` escaped as
    /// `\u0026`, `\u003c` and `\u003e`.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_string(self)
            .map_err(|e| SigcheckError::Encoding(format!("sign doc serialization failed: {}", e)))?;
        Ok(escape_html_chars(&json).into_bytes())
    }
}

fn escape_html_chars(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '&' => out.push_str("\\u0026"),
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            c => out.push(c),
        }
    }
    out
}

/// Bytes that get digested for `mode`.
pub fn signing_payload(message: &[u8], mode: HashMode, signer: Option<&str>) -> Result<Vec<u8>> {
    if !mode.wraps_sign_doc() {
        return Ok(message.to_vec());
    }

    let signer = match signer {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            return Err(SigcheckError::Encoding(format!(
                "{} mode requires a signer address",
                mode
            )))
        }
    };

    AminoSignDoc::sign_data(signer, message).to_canonical_bytes()
}

/// Compute the digest a wallet signed for `message` under `mode`.
///
/// # Arguments
/// * `message` - The message bytes (UTF-8 text at the wallet boundary)
/// * `mode` - Signing convention
/// * `signer` - Bech32 signer address; required by the sign-doc modes
pub fn hash_message(
    message: &[u8],
    mode: HashMode,
    signer: Option<&str>,
) -> Result<[u8; DIGEST_LEN]> {
    let payload = signing_payload(message, mode, signer)?;
    Ok(mode.digest_algorithm().digest(&payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNER: &str = "sent1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5xnu2dv";

    #[test]
    fn test_raw_is_sha256_of_message() {
        let digest = hash_message(b"abc", HashMode::Raw, None).unwrap();
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_raw_ignores_signer() {
        let a = hash_message(b"abc", HashMode::Raw, None).unwrap();
        let b = hash_message(b"abc", HashMode::Raw, Some(SIGNER)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_doc_canonical_form() {
        let bytes = signing_payload(b"0123456789", HashMode::AminoSignDoc, Some("abc")).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            concat!(
                r#"{"account_number":"0","chain_id":"","fee":{"amount":[],"gas":"0"},"memo":"","#,
                r#""msgs":[{"type":"sign/MsgSignData","value":{"data":"MDEyMzQ1Njc4OQ==","signer":"abc"}}],"#,
                r#""sequence":"0"}"#
            )
        );
    }

    #[test]
    fn test_sign_doc_escapes_html_chars() {
        let bytes = signing_payload(b"x", HashMode::Adr36, Some("a<b>&c")).unwrap();
        let json = String::from_utf8(bytes).unwrap();
        assert!(json.contains(r#""signer":"a\u003cb\u003e\u0026c""#));
        assert!(!json.contains('<'));
    }

    #[test]
    fn test_amino_uses_keccak() {
        let payload = signing_payload(b"data", HashMode::AminoSignDoc, Some(SIGNER)).unwrap();
        let digest = hash_message(b"data", HashMode::AminoSignDoc, Some(SIGNER)).unwrap();
        assert_eq!(digest, keccak256(&payload));
    }

    #[test]
    fn test_adr36_uses_sha256_over_same_doc() {
        let amino = signing_payload(b"data", HashMode::AminoSignDoc, Some(SIGNER)).unwrap();
        let adr36 = signing_payload(b"data", HashMode::Adr36, Some(SIGNER)).unwrap();
        assert_eq!(amino, adr36);
        assert_eq!(
            hash_message(b"data", HashMode::Adr36, Some(SIGNER)).unwrap(),
            sha256(&adr36)
        );
    }

    #[test]
    fn test_modes_produce_distinct_digests() {
        let msg = b"Please sign this message to verify your wallet ownership";
        let raw = hash_message(msg, HashMode::Raw, Some(SIGNER)).unwrap();
        let amino = hash_message(msg, HashMode::AminoSignDoc, Some(SIGNER)).unwrap();
        let adr36 = hash_message(msg, HashMode::Adr36, Some(SIGNER)).unwrap();
        assert_ne!(raw, amino);
        assert_ne!(raw, adr36);
        assert_ne!(amino, adr36);
    }

    #[test]
    fn test_sign_doc_requires_signer() {
        for mode in [HashMode::AminoSignDoc, HashMode::Adr36] {
            assert!(matches!(hash_message(b"x", mode, None), Err(SigcheckError::Encoding(_))));
            assert!(matches!(hash_message(b"x", mode, Some("  ")), Err(SigcheckError::Encoding(_))));
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("raw".parse::<HashMode>().unwrap(), HashMode::Raw);
        assert_eq!("AMINO".parse::<HashMode>().unwrap(), HashMode::AminoSignDoc);
        assert_eq!("adr36".parse::<HashMode>().unwrap(), HashMode::Adr36);
        assert!(matches!("eip191".parse::<HashMode>(), Err(SigcheckError::Format(_))));
    }

    #[test]
    fn test_mode_serde_names() {
        assert_eq!(serde_json::to_string(&HashMode::AminoSignDoc).unwrap(), r#""amino""#);
        let mode: HashMode = serde_json::from_str(r#""adr36""#).unwrap();
        assert_eq!(mode, HashMode::Adr36);
    }
}
