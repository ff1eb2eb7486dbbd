//! Manta Demo CLI
//!
//! Offline inspection of Manta session URLs and signed payment requests.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "manta-demo")]
#[command(about = "Manta Demo CLI - Inspect Manta sessions and payment requests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a manta:// session URL
    Parse {
        /// Session URL (e.g., manta://broker.example.com/abc123)
        url: String,
    },

    /// Decode the payment request inside an envelope file
    Unpack {
        /// Envelope JSON file as published by the merchant
        envelope: PathBuf,
    },

    /// Verify an envelope against the merchant certificate and CA
    Verify {
        /// Envelope JSON file as published by the merchant
        envelope: PathBuf,

        /// Merchant certificate (PEM)
        #[arg(long)]
        cert: PathBuf,

        /// Certificate authority (PEM)
        #[arg(long)]
        ca: PathBuf,
    },

    /// Show the broker topics used for a session
    Topics {
        /// Session URL
        url: String,

        /// Crypto currency to request
        #[arg(short, long, default_value = manta_wallet::topics::ALL_CRYPTOS)]
        crypto: String,

        /// Fixed client id (random when omitted)
        #[arg(long)]
        client_id: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("manta_demo_cli=debug,manta_wallet=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("manta_demo_cli=info,manta_wallet=warn")
            .init();
    }

    match cli.command {
        Commands::Parse { url } => commands::parse::run(&url, cli.verbose),
        Commands::Unpack { envelope } => commands::unpack::run(&envelope, cli.verbose),
        Commands::Verify { envelope, cert, ca } => {
            let verified = commands::verify::run(&envelope, &cert, &ca, cli.verbose)?;
            if !verified {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Topics {
            url,
            crypto,
            client_id,
        } => commands::topics::run(&url, &crypto, client_id, cli.verbose),
    }
}
