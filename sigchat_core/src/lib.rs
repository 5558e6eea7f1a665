//! Message authentication for the chat system: canonical encoding,
//! RSA-PSS signing and verification, signed envelopes, and the
//! verification service consumed by the transport and HTTP collaborators.

pub mod crypto;
pub mod encoding;
pub mod envelope;
pub mod keys;
pub mod message;
pub mod verify;
