use crate::errors::AppResult;
use crate::types::InspectionResult;
use clap::{Parser, Subcommand};
use serde::Serialize;

pub mod commands;

/// Catenis Message Inspector
#[derive(Parser)]
#[command(name = "ctn-msg-inspector")]
#[command(about = "Inspect Catenis messages recorded on the Bitcoin blockchain")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a Catenis message from its transaction and/or off-chain envelope CID
    Inspect(commands::inspect::InspectCommand),
    /// Decode a hex-encoded null-data payload as a Catenis message envelope
    DecodeEnvelope(commands::decode::DecodeEnvelopeCommand),
    /// Fingerprint and classify a hex-encoded raw transaction without network access
    ClassifyTx(commands::classify::ClassifyTxCommand),
}

pub async fn run() -> AppResult<()> {
    // Initialise tracing subscriber to capture info!() macros
    // Uses RUST_LOG environment variable (defaults to "error" if not set)
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(command) => command.run().await,
        Commands::DecodeEnvelope(command) => command.run(),
        Commands::ClassifyTx(command) => command.run(),
    }
}

/// Inspection result plus the message as text when it is valid UTF-8
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReport<'a> {
    #[serde(flatten)]
    pub result: &'a InspectionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_text: Option<&'a str>,
}

impl<'a> From<&'a InspectionResult> for InspectionReport<'a> {
    fn from(result: &'a InspectionResult) -> Self {
        Self {
            result,
            message_text: result.message_text(),
        }
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
