use crate::cli::print_json;
use crate::envelope::{self, Envelope};
use crate::errors::AppResult;
use clap::Args;
use serde::Serialize;

/// Decode a Catenis message envelope
#[derive(Args)]
pub struct DecodeEnvelopeCommand {
    /// Hex-encoded null-data payload (starting with 43544e, "CTN")
    pub hex: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeReport<'a> {
    #[serde(flatten)]
    envelope: &'a Envelope,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_text: Option<&'a str>,
}

impl DecodeEnvelopeCommand {
    pub fn run(&self) -> AppResult<()> {
        let data = hex::decode(self.hex.trim())?;
        let envelope = envelope::decode(&data)?;

        print_json(&EnvelopeReport {
            envelope: &envelope,
            message_text: envelope.message().and_then(|m| std::str::from_utf8(m).ok()),
        })
    }
}
