//! Parse command - split a session URL into its parts

use anyhow::Result;
use manta_wallet::MantaAddress;

use crate::ui;

pub fn run(url: &str, verbose: bool) -> Result<()> {
    ui::header("Manta Session");

    tracing::debug!("Parsing URL: {}", url);
    let address = match MantaAddress::parse(url) {
        Ok(address) => address,
        Err(e) => {
            ui::error(&e.to_string());
            return Err(e.into());
        }
    };

    ui::key_value("Host", &address.host);
    ui::key_value("Port", &address.port.to_string());
    ui::key_value("Session", &address.session_id);

    if verbose {
        ui::separator();
        ui::key_value("Canonical URL", &address.to_string());
    }

    Ok(())
}
