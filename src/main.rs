//! Command-line front end for cosmos-sigcheck.
//!
//! # Usage
//!
//! ```bash
//! # Verify a wallet signature (exit 0 valid, 1 invalid, 2 malformed input)
//! cosmos-sigcheck verify --message "0123456789" --signature <b64> \
//!     --public-key <b64> --address sent1... --prefix sent
//!
//! # Verify a JSON request read from stdin
//! cosmos-sigcheck verify --request - < request.json
//!
//! # Derive an address from a public key
//! cosmos-sigcheck address --public-key <b64> --prefix cosmos --mode adr36
//! ```

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cosmos_sigcheck::address::derive_address;
use cosmos_sigcheck::hasher::{hash_message, HashMode};
use cosmos_sigcheck::wire::{decode_base64, verify_request, ErrorResponse, PublicKeyField, VerifyRequest};
use cosmos_sigcheck::{Config, Result, SigcheckError};

/// Verify Cosmos wallet arbitrary-message signatures.
#[derive(Parser, Debug)]
#[command(name = "cosmos-sigcheck")]
#[command(about = "Verify Cosmos wallet signatures and derive bech32 addresses")]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify a signature against a claimed address.
    Verify(VerifyArgs),
    /// Derive the bech32 address of a public key.
    Address {
        /// Compressed public key, base64.
        #[arg(long)]
        public_key: String,
        #[arg(long)]
        prefix: Option<String>,
        /// Picks the address scheme (raw, amino, adr36).
        #[arg(long)]
        mode: Option<HashMode>,
    },
    /// Print the hex digest a wallet signs for a message.
    Digest {
        #[arg(long)]
        message: String,
        #[arg(long)]
        mode: Option<HashMode>,
        /// Signer address, required by the sign-doc modes.
        #[arg(long)]
        signer: Option<String>,
    },
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// JSON request file, or `-` for stdin. Other flags are ignored when set.
    #[arg(long)]
    request: Option<String>,

    #[arg(long)]
    message: Option<String>,

    /// Signature, base64.
    #[arg(long)]
    signature: Option<String>,

    /// Compressed public key, base64.
    #[arg(long)]
    public_key: Option<String>,

    #[arg(long)]
    recovery_id: Option<u8>,

    /// Claimed bech32 address.
    #[arg(long)]
    address: Option<String>,

    #[arg(long)]
    prefix: Option<String>,

    #[arg(long)]
    mode: Option<HashMode>,
}

impl VerifyArgs {
    fn into_request(self) -> Result<VerifyRequest> {
        if let Some(source) = self.request {
            let raw = read_source(&source)?;
            return serde_json::from_str(&raw)
                .map_err(|e| SigcheckError::Format(format!("invalid request JSON: {}", e)));
        }

        let missing = |flag: &str| SigcheckError::Format(format!("--{} is required without --request", flag));
        Ok(VerifyRequest {
            message: self.message.ok_or_else(|| missing("message"))?,
            signature: self.signature.ok_or_else(|| missing("signature"))?,
            public_key: self.public_key.map(PublicKeyField::Encoded),
            recovery_id: self.recovery_id,
            claimed_address: self.address.ok_or_else(|| missing("address"))?,
            prefix: self.prefix,
            mode: self.mode,
        })
    }
}

fn read_source(source: &str) -> Result<String> {
    let read = if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map(|_| buf)
    } else {
        fs::read_to_string(source)
    };
    read.map_err(|e| SigcheckError::Format(format!("cannot read request {}: {}", source, e)))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize output: {}", e),
    }
}

fn run(command: Command, config: &Config) -> Result<ExitCode> {
    match command {
        Command::Verify(args) => {
            let request = args.into_request()?;
            let response = verify_request(&request, config)?;
            tracing::info!(valid = response.is_valid, address = %response.derived_address, "verified");
            print_json(&response);
            Ok(if response.is_valid { ExitCode::SUCCESS } else { ExitCode::from(1) })
        }
        Command::Address { public_key, prefix, mode } => {
            let public_key = decode_base64("publicKey", &public_key)?;
            let prefix = prefix.as_deref().unwrap_or(&config.default_prefix);
            let scheme = mode.unwrap_or(config.default_mode).address_scheme();
            println!("{}", derive_address(&public_key, prefix, scheme)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Digest { message, mode, signer } => {
            let mode = mode.unwrap_or(config.default_mode);
            let digest = hash_message(message.as_bytes(), mode, signer.as_deref())?;
            println!("{}", hex::encode(digest));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let outcome = Config::from_env().and_then(|config| run(cli.command, &config));
    match outcome {
        Ok(code) => code,
        Err(err) => {
            tracing::warn!(kind = err.kind(), "request rejected: {}", err);
            print_json(&ErrorResponse::from(&err));
            ExitCode::from(2)
        }
    }
}
