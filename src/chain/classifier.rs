//! Message transaction classification
//!
//! A transaction is first shortlisted by matching its IO fingerprint against the
//! shape patterns of every message transaction type, then confirmed with the
//! function byte found in its envelope.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::fingerprint::IoFingerprint;
use crate::errors::{InspectError, InspectResult};
use crate::types::MessageTxType;

lazy_static! {
    static ref SEND_MESSAGE_INPUT: Regex = shape(r"^[wh]{2}$");
    static ref SEND_MESSAGE_OUTPUT: Regex = shape(r"^[wh]{1,2}d[wh]{0,3}$");
    static ref SEND_MESSAGE_READ_CONFIRM_OUTPUT: Regex = shape(r"^[wh]{2}d");
    static ref LOG_MESSAGE_INPUT: Regex = shape(r"^[wh]+$");
    static ref LOG_MESSAGE_OUTPUT: Regex = shape(r"^d[wh]{0,3}$");
    static ref SETTLE_OFF_CHAIN_INPUT: Regex = shape(r"^[wh]+$");
    static ref SETTLE_OFF_CHAIN_OUTPUT: Regex = shape(r"^d[wh]?$");
}

fn shape(pattern: &str) -> Regex {
    Regex::new(pattern).expect("IO shape pattern must compile")
}

impl MessageTxType {
    pub fn input_pattern(self) -> &'static Regex {
        match self {
            MessageTxType::SendMessage => &SEND_MESSAGE_INPUT,
            MessageTxType::LogMessage => &LOG_MESSAGE_INPUT,
            MessageTxType::SettleOffChainMessages => &SETTLE_OFF_CHAIN_INPUT,
        }
    }

    pub fn output_pattern(self) -> &'static Regex {
        match self {
            MessageTxType::SendMessage => &SEND_MESSAGE_OUTPUT,
            MessageTxType::LogMessage => &LOG_MESSAGE_OUTPUT,
            MessageTxType::SettleOffChainMessages => &SETTLE_OFF_CHAIN_OUTPUT,
        }
    }

    /// Output shape of a transaction that asks for a read confirmation
    pub fn read_confirm_output_pattern(self) -> Option<&'static Regex> {
        match self {
            MessageTxType::SendMessage => Some(&SEND_MESSAGE_READ_CONFIRM_OUTPUT),
            _ => None,
        }
    }

    pub fn matches_shape(self, fingerprint: &IoFingerprint) -> bool {
        self.input_pattern().is_match(fingerprint.input())
            && self.output_pattern().is_match(fingerprint.output())
    }
}

/// Shortlist the message transaction types whose IO shape fits the fingerprint
pub fn classify(fingerprint: &IoFingerprint) -> InspectResult<Vec<MessageTxType>> {
    let candidates: Vec<MessageTxType> = MessageTxType::ALL
        .into_iter()
        .filter(|tx_type| tx_type.matches_shape(fingerprint))
        .collect();

    debug!(
        "IO fingerprint {} matches {:?}",
        fingerprint, candidates
    );

    if candidates.is_empty() {
        return Err(InspectError::UnrecognizedTransactionShape {
            fingerprint: fingerprint.to_string(),
        });
    }

    Ok(candidates)
}

/// Pick the candidate whose function byte is the one found in the envelope
pub fn confirm(candidates: &[MessageTxType], func_byte: u8) -> InspectResult<MessageTxType> {
    candidates
        .iter()
        .copied()
        .find(|tx_type| tx_type.func_byte() == func_byte)
        .ok_or(InspectError::InconsistentFunctionByte { func_byte })
}

/// Whether a send message transaction requests a read confirmation
pub fn has_read_confirmation(tx_type: MessageTxType, fingerprint: &IoFingerprint) -> bool {
    tx_type
        .read_confirm_output_pattern()
        .is_some_and(|pattern| pattern.is_match(fingerprint.output()))
}
