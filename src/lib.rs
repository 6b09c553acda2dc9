//! Cosmos signature check library
//!
//! Verifies wallet `signArbitrary` signatures and derives the bech32
//! address of the signing key:
//! - [`hasher`] turns a message into the digest the wallet signed
//! - [`verifier`] checks or recovers secp256k1 signatures
//! - [`address`] derives bech32 addresses under a named scheme
//! - [`verify`](mod@verify) chains the three and compares addresses
//! - [`wire`] is the base64/JSON boundary
//!
//! # Example
//!
//! ```rust
//! use cosmos_sigcheck::{address, crypto, hasher::{hash_message, HashMode}, verify::{verify, VerifyInput}};
//!
//! let key = crypto::signing_key_from_hex(&"11".repeat(32)).unwrap();
//! let pubkey = crypto::compressed_public_key(&key);
//! let claimed = address::derive_address(&pubkey, "cosmos", HashMode::Raw.address_scheme()).unwrap();
//! let digest = hash_message(b"hello", HashMode::Raw, None).unwrap();
//! let signature = crypto::sign_digest(&key, &digest).unwrap();
//!
//! let result = verify(&VerifyInput {
//!     message: b"hello",
//!     signature: &signature,
//!     public_key: Some(&pubkey),
//!     recovery_id: None,
//!     claimed_address: &claimed,
//!     prefix: "cosmos",
//!     mode: HashMode::Raw,
//! }).unwrap();
//! assert!(result.is_valid);
//! ```

pub mod address;
pub mod config;
pub mod crypto;
pub mod error;
pub mod hasher;
pub mod verifier;
pub mod verify;
pub mod wire;

pub use address::{derive_address, pubkey_to_address, AddressScheme};
pub use config::Config;
pub use error::*;
pub use hasher::{hash_message, HashMode};
pub use verifier::{recover_key, verify_with_key};
pub use verify::{verify, VerificationResult, VerifyInput};
