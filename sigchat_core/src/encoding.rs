//! Canonical message encoding.
//!
//! Signer and verifier must agree on exactly these bytes, so the format is
//! fixed: each string field is a u32 big-endian byte length followed by its
//! UTF-8 bytes, the timestamp is a big-endian i64, and the kind tag is one
//! trailing byte (0 absent, 1 user, 2 bot). Length prefixes make the
//! encoding injective: no two distinct messages share an encoding.

use thiserror::Error;

use crate::message::{Message, MessageKind};

pub const MAX_SENDER_BYTES: usize = 256;
pub const MAX_TEXT_BYTES: usize = 16 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("sender is empty")]
    EmptySender,
    #[error("text is empty")]
    EmptyText,
    #[error("sender is longer than {MAX_SENDER_BYTES} bytes")]
    SenderTooLong,
    #[error("text is longer than {MAX_TEXT_BYTES} bytes")]
    TextTooLong,
    #[error("timestamp is negative")]
    NegativeTimestamp,
}

pub fn encode(message: &Message) -> Result<Vec<u8>, EncodingError> {
    if message.sender.is_empty() {
        return Err(EncodingError::EmptySender);
    }
    if message.text.is_empty() {
        return Err(EncodingError::EmptyText);
    }
    if message.sender.len() > MAX_SENDER_BYTES {
        return Err(EncodingError::SenderTooLong);
    }
    if message.text.len() > MAX_TEXT_BYTES {
        return Err(EncodingError::TextTooLong);
    }
    if message.timestamp < 0 {
        return Err(EncodingError::NegativeTimestamp);
    }

    let mut bytes =
        Vec::with_capacity(4 + message.sender.len() + 4 + message.text.len() + 8 + 1);
    push_str(&mut bytes, &message.sender);
    push_str(&mut bytes, &message.text);
    bytes.extend_from_slice(&message.timestamp.to_be_bytes());
    bytes.push(match message.kind {
        None => 0,
        Some(MessageKind::User) => 1,
        Some(MessageKind::Bot) => 2,
    });

    Ok(bytes)
}

fn push_str(bytes: &mut Vec<u8>, field: &str) {
    let length = u32::try_from(field.len()).expect("field length should fit in u32 after caps");
    bytes.extend_from_slice(&length.to_be_bytes());
    bytes.extend_from_slice(field.as_bytes());
}
