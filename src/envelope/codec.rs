//! Envelope decoding and encoding
//!
//! Decoding is pure: the same bytes always give the same envelope or the same error.

use byteorder::ReadBytesExt;
use std::io::Cursor;
use tracing::debug;

use super::error::{EnvelopeError, EnvelopeResult};
use super::{
    Envelope, EnvelopeContent, EnvelopeOptions, FUNC_BYTE_MASK, MIN_LENGTH, PREFIX, VERSION,
    VERSION_MASK,
};
use crate::types::{ContentId, MessageTxType, StorageProvider};

/// Decode the data embedded in a message transaction's null-data output
pub fn decode(data: &[u8]) -> EnvelopeResult<Envelope> {
    if data.len() < MIN_LENGTH {
        return Err(EnvelopeError::DataTooShort);
    }

    if &data[..PREFIX.len()] != PREFIX {
        return Err(EnvelopeError::InvalidPrefix);
    }

    let mut cursor = Cursor::new(&data[PREFIX.len()..]);

    let ver_func = read_byte(&mut cursor)?;
    let version = ver_func & VERSION_MASK;

    if version != VERSION {
        return Err(EnvelopeError::InvalidVersion(version));
    }

    let func_byte = ver_func & FUNC_BYTE_MASK;
    let function = MessageTxType::from_func_byte(func_byte)
        .ok_or(EnvelopeError::InvalidFunctionByte(func_byte))?;

    let opts = read_byte(&mut cursor)?;
    let options = EnvelopeOptions::from_bits(opts).ok_or(EnvelopeError::InvalidOptions(opts))?;

    debug!(
        "Decoding envelope: function={}, options=0x{:02x}, {} bytes",
        function,
        opts,
        data.len()
    );

    let content = match function {
        MessageTxType::SettleOffChainMessages => {
            if options.padding && !options.embedding {
                return Err(EnvelopeError::InconsistentPaddingOption);
            }

            let sp_code = read_byte(&mut cursor)?;

            if sp_code != StorageProvider::OFF_CHAIN.byte_code() {
                return Err(EnvelopeError::InvalidStorageProviderCode(sp_code));
            }

            let batch_doc_cid = ContentId::from_bytes(remaining(&cursor))
                .ok_or(EnvelopeError::InvalidBatchReference)?;

            EnvelopeContent::BatchDocument {
                storage_provider: StorageProvider::OFF_CHAIN,
                batch_doc_cid,
            }
        }
        MessageTxType::SendMessage | MessageTxType::LogMessage if !options.embedding => {
            if options.padding {
                return Err(EnvelopeError::InconsistentPaddingOption);
            }

            let sp_code = read_byte(&mut cursor)?;
            let storage_provider = StorageProvider::from_byte_code(sp_code)
                .ok_or(EnvelopeError::InvalidStorageProviderCode(sp_code))?;

            let message_ref = ContentId::from_bytes(remaining(&cursor))
                .ok_or(EnvelopeError::InvalidMessageReference)?;

            EnvelopeContent::External {
                storage_provider,
                message_ref,
            }
        }
        MessageTxType::SendMessage | MessageTxType::LogMessage => {
            let padding = if options.padding {
                let length = read_byte(&mut cursor)? as usize;
                let rest = remaining(&cursor);

                if length == 0 || length > rest.len() {
                    return Err(EnvelopeError::InvalidPaddingLength {
                        length,
                        available: rest.len(),
                    });
                }

                cursor.set_position(cursor.position() + length as u64);
                Some(rest[..length].to_vec())
            } else {
                None
            };

            EnvelopeContent::Embedded {
                padding,
                message: remaining(&cursor).to_vec(),
            }
        }
    };

    Ok(Envelope {
        function,
        options,
        content,
    })
}

/// Encode an envelope back into its binary form
///
/// Fails when the options disagree with the envelope content, so that a
/// successful encode always decodes back to the same envelope.
pub fn encode(envelope: &Envelope) -> EnvelopeResult<Vec<u8>> {
    let options = &envelope.options;
    let mut buf = Vec::with_capacity(MIN_LENGTH + 64);

    buf.extend_from_slice(PREFIX);
    buf.push(VERSION | envelope.func_byte());
    buf.push(options.bits());

    match (&envelope.content, envelope.function) {
        (
            EnvelopeContent::BatchDocument {
                storage_provider,
                batch_doc_cid,
            },
            MessageTxType::SettleOffChainMessages,
        ) => {
            if options.padding && !options.embedding {
                return Err(EnvelopeError::InconsistentPaddingOption);
            }
            if *storage_provider != StorageProvider::OFF_CHAIN {
                return Err(EnvelopeError::InvalidStorageProviderCode(
                    storage_provider.byte_code(),
                ));
            }

            buf.push(storage_provider.byte_code());
            buf.extend_from_slice(&batch_doc_cid.to_bytes());
        }
        (
            EnvelopeContent::External {
                storage_provider,
                message_ref,
            },
            MessageTxType::SendMessage | MessageTxType::LogMessage,
        ) => {
            if options.embedding {
                return Err(EnvelopeError::InconsistentOptions(
                    "external message with embedding option set",
                ));
            }
            if options.padding {
                return Err(EnvelopeError::InconsistentPaddingOption);
            }

            buf.push(storage_provider.byte_code());
            buf.extend_from_slice(&message_ref.to_bytes());
        }
        (
            EnvelopeContent::Embedded { padding, message },
            MessageTxType::SendMessage | MessageTxType::LogMessage,
        ) => {
            if !options.embedding {
                return Err(EnvelopeError::InconsistentOptions(
                    "embedded message without embedding option",
                ));
            }

            match (padding, options.padding) {
                (Some(padding), true) => {
                    if padding.is_empty() || padding.len() > u8::MAX as usize {
                        return Err(EnvelopeError::InvalidPaddingLength {
                            length: padding.len(),
                            available: u8::MAX as usize,
                        });
                    }

                    buf.push(padding.len() as u8);
                    buf.extend_from_slice(padding);
                }
                (None, false) => {}
                _ => {
                    return Err(EnvelopeError::InconsistentOptions(
                        "padding option disagrees with padding block",
                    ))
                }
            }

            if !options.padding && message.is_empty() {
                return Err(EnvelopeError::DataTooShort);
            }

            buf.extend_from_slice(message);
        }
        _ => {
            return Err(EnvelopeError::InconsistentOptions(
                "content does not match function byte",
            ))
        }
    }

    Ok(buf)
}

fn read_byte(cursor: &mut Cursor<&[u8]>) -> EnvelopeResult<u8> {
    cursor.read_u8().map_err(|_| EnvelopeError::DataTooShort)
}

fn remaining<'a>(cursor: &Cursor<&'a [u8]>) -> &'a [u8] {
    let buf: &'a [u8] = *cursor.get_ref();
    let pos = (cursor.position() as usize).min(buf.len());
    &buf[pos..]
}
