//! Verify command - check an envelope's certificate chain and signature

use anyhow::Result;
use manta_wallet::verify::check_envelope;
use std::path::Path;

use crate::ui;

/// Returns whether the envelope verified.
pub fn run(envelope_path: &Path, cert_path: &Path, ca_path: &Path, verbose: bool) -> Result<bool> {
    ui::header("Verify Payment Request");

    let envelope = super::read_envelope(envelope_path)?;
    let merchant_pem = super::read_pem(cert_path)?;
    let ca_pem = super::read_pem(ca_path)?;

    if verbose {
        ui::key_value("Certificate", &cert_path.display().to_string());
        ui::key_value("CA", &ca_path.display().to_string());
    }

    match check_envelope(&envelope, &merchant_pem, &ca_pem) {
        Ok(()) => {
            ui::success("Payment request verified");
            Ok(true)
        }
        Err(e) => {
            tracing::debug!("verification failed: {}", e);
            ui::error(&format!("Payment request NOT verified: {}", e));
            Ok(false)
        }
    }
}
