//! Transaction IO fingerprint
//!
//! One token per input and per output, in transaction order, e.g. `ww` / `wdw`.

use bitcoin::{Transaction, TxIn, TxOut};
use std::fmt;

use super::script::{IoToken, INPUT_SHAPES, OUTPUT_SHAPES};

/// Payment shape tokens of a transaction's inputs and outputs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IoFingerprint {
    input: String,
    output: String,
}

impl IoFingerprint {
    pub fn new(inputs: &[TxIn], outputs: &[TxOut]) -> Self {
        Self {
            input: inputs
                .iter()
                .map(|txin| token_for(txin, INPUT_SHAPES).as_char())
                .collect(),
            output: outputs
                .iter()
                .map(|txout| token_for(txout, OUTPUT_SHAPES).as_char())
                .collect(),
        }
    }

    pub fn from_transaction(tx: &Transaction) -> Self {
        Self::new(&tx.input, &tx.output)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn input_token(&self, index: usize) -> Option<IoToken> {
        self.input.chars().nth(index).and_then(IoToken::from_char)
    }

    pub fn output_token(&self, index: usize) -> Option<IoToken> {
        self.output.chars().nth(index).and_then(IoToken::from_char)
    }

    /// Index of the first null-data output
    pub fn null_data_output_index(&self) -> Option<usize> {
        self.output.find(IoToken::NullData.as_char())
    }
}

impl fmt::Display for IoFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.input, self.output)
    }
}

/// First shape whose recogniser accepts the item, or `Unknown`
fn token_for<T>(item: &T, shapes: &[(IoToken, fn(&T) -> bool)]) -> IoToken {
    shapes
        .iter()
        .find(|(_, recognise)| recognise(item))
        .map(|(token, _)| *token)
        .unwrap_or(IoToken::Unknown)
}
