//! Unpack command - show the payment request inside an envelope

use anyhow::{Context, Result};
use manta_wallet::amount::format_amount;
use std::path::Path;

use crate::ui;

pub fn run(envelope_path: &Path, verbose: bool) -> Result<()> {
    ui::header("Payment Request");

    let envelope = super::read_envelope(envelope_path)?;
    let request = envelope
        .unpack()
        .context("Envelope message is not a payment request")?;

    ui::key_value(
        "Amount",
        &format!("{} {}", format_amount(&request.amount), request.fiat_currency),
    );
    ui::key_value("Merchant", &request.merchant.name);
    if let Some(address) = &request.merchant.address {
        ui::key_value("Address", address);
    }

    let supported: Vec<&str> = request.supported_cryptos.iter().map(String::as_str).collect();
    ui::key_value("Supported", &supported.join(", "));

    ui::separator();
    if request.destinations.is_empty() {
        ui::warning("No destinations offered");
    }
    for destination in &request.destinations {
        ui::key_value(
            &destination.crypto_currency,
            &format!(
                "{} -> {}",
                format_amount(&destination.amount),
                destination.destination_address
            ),
        );
    }

    if verbose {
        ui::separator();
        let raw: serde_json::Value = serde_json::from_str(&envelope.message)?;
        ui::json(&raw);
    }

    Ok(())
}
