//! Topics command - list the broker topics of a session

use anyhow::Result;
use manta_wallet::{Session, WalletConfig};

use crate::ui;

pub fn run(url: &str, crypto: &str, client_id: Option<String>, verbose: bool) -> Result<()> {
    ui::header("Session Topics");

    let mut config = WalletConfig::default();
    if let Some(client_id) = client_id {
        config = config.with_client_id(client_id);
    }
    let session = Session::from_url(url, &config)?;

    ui::key_value("Subscribe", &session.payment_requests_topic());
    ui::key_value("Request", &session.payment_request_topic(crypto));
    ui::key_value("Acks", &session.acks_topic());
    ui::key_value("Payments", &session.payments_topic());

    if verbose {
        let options = session.connect_options(&config);
        ui::separator();
        ui::key_value("Broker", &options.authority());
        ui::key_value("Client id", &options.client_id);
        ui::key_value("Keep alive", &format!("{}s", options.keep_alive.as_secs()));
    }

    Ok(())
}
