//! Payment shape recognition for transaction inputs and outputs
//!
//! Each shape is a `(token, recogniser)` pair. Recognisers only check structure
//! (push layout, key and signature encoding); they do not validate signatures
//! against any sighash.

use bitcoin::ecdsa;
use bitcoin::script::Instruction;
use bitcoin::{CompressedPublicKey, PublicKey, Script, TxIn, TxOut};

/// Coarse payment shape of a single input or output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoToken {
    /// Pay to witness public key hash (P2WPKH)
    WitnessPubKeyHash,
    /// Pay to public key hash (P2PKH)
    PubKeyHash,
    /// Null data (OP_RETURN)
    NullData,
    /// None of the above
    Unknown,
}

impl IoToken {
    pub fn as_char(self) -> char {
        match self {
            IoToken::WitnessPubKeyHash => 'w',
            IoToken::PubKeyHash => 'h',
            IoToken::NullData => 'd',
            IoToken::Unknown => 'u',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'w' => Some(IoToken::WitnessPubKeyHash),
            'h' => Some(IoToken::PubKeyHash),
            'd' => Some(IoToken::NullData),
            'u' => Some(IoToken::Unknown),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            IoToken::WitnessPubKeyHash => "Pay to witness public key hash",
            IoToken::PubKeyHash => "Pay to public key hash",
            IoToken::NullData => "Null data",
            IoToken::Unknown => "Unrecognized",
        }
    }
}

pub type InputRecogniser = fn(&TxIn) -> bool;
pub type OutputRecogniser = fn(&TxOut) -> bool;

/// Input shapes, in the order they are tried
pub const INPUT_SHAPES: &[(IoToken, InputRecogniser)] = &[
    (IoToken::WitnessPubKeyHash, is_p2wpkh_input),
    (IoToken::PubKeyHash, is_p2pkh_input),
];

/// Output shapes, in the order they are tried
pub const OUTPUT_SHAPES: &[(IoToken, OutputRecogniser)] = &[
    (IoToken::WitnessPubKeyHash, is_p2wpkh_output),
    (IoToken::PubKeyHash, is_p2pkh_output),
    (IoToken::NullData, is_null_data_output),
];

pub fn is_p2wpkh_input(input: &TxIn) -> bool {
    p2wpkh_input_pubkey(input).is_some()
}

pub fn is_p2pkh_input(input: &TxIn) -> bool {
    p2pkh_input_pubkey(input).is_some()
}

pub fn is_p2wpkh_output(output: &TxOut) -> bool {
    output.script_pubkey.is_p2wpkh()
}

pub fn is_p2pkh_output(output: &TxOut) -> bool {
    output.script_pubkey.is_p2pkh()
}

pub fn is_null_data_output(output: &TxOut) -> bool {
    null_data_payload(&output.script_pubkey).is_some()
}

/// Public key spent by a P2WPKH input: witness `[signature, compressed pubkey]`
pub fn p2wpkh_input_pubkey(input: &TxIn) -> Option<CompressedPublicKey> {
    let witness = &input.witness;

    if witness.len() != 2 {
        return None;
    }

    let signature = witness.nth(0)?;
    let pubkey = witness.nth(1)?;

    if ecdsa::Signature::from_slice(signature).is_err() {
        return None;
    }

    CompressedPublicKey::from_slice(pubkey).ok()
}

/// Public key spent by a P2PKH input: scriptSig `<signature> <pubkey>`, no witness
pub fn p2pkh_input_pubkey(input: &TxIn) -> Option<PublicKey> {
    if !input.witness.is_empty() {
        return None;
    }

    let pushes = push_only_data(&input.script_sig)?;

    match pushes.as_slice() {
        [signature, pubkey] => {
            ecdsa::Signature::from_slice(signature).ok()?;
            PublicKey::from_slice(pubkey).ok()
        }
        _ => None,
    }
}

/// 20-byte public key hash paid to by a P2WPKH or P2PKH output script
pub fn output_pubkey_hash(script: &Script) -> Option<[u8; 20]> {
    let bytes = script.as_bytes();

    let hash = if script.is_p2wpkh() {
        &bytes[2..22]
    } else if script.is_p2pkh() {
        &bytes[3..23]
    } else {
        return None;
    };

    hash.try_into().ok()
}

/// Data carried by a null-data output: the concatenation of every push after OP_RETURN
///
/// Returns `None` when the script does not start with OP_RETURN or contains
/// anything other than data pushes after it.
pub fn null_data_payload(script: &Script) -> Option<Vec<u8>> {
    if !script.is_op_return() {
        return None;
    }

    let mut data = Vec::with_capacity(script.len());

    for instruction in script.instructions().skip(1) {
        match instruction {
            Ok(Instruction::PushBytes(push)) => data.extend_from_slice(push.as_bytes()),
            _ => return None,
        }
    }

    Some(data)
}

fn push_only_data(script: &Script) -> Option<Vec<&[u8]>> {
    script
        .instructions()
        .map(|instruction| match instruction {
            Ok(Instruction::PushBytes(push)) => Some(push.as_bytes()),
            _ => None,
        })
        .collect()
}
