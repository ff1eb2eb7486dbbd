//! CLI command implementations

pub mod parse;
pub mod topics;
pub mod unpack;
pub mod verify;

use anyhow::{Context, Result};
use manta_wallet::messages::decode;
use manta_wallet::PaymentRequestEnvelope;
use std::path::Path;

/// Read an envelope JSON file.
pub fn read_envelope(path: &Path) -> Result<PaymentRequestEnvelope> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    decode(&bytes).with_context(|| format!("{} is not a payment request envelope", path.display()))
}

/// Read a PEM file into a string.
pub fn read_pem(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
