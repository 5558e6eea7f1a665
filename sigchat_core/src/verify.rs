//! The verification operation exposed to the message pipeline and to the
//! external verification endpoint.
//!
//! The verdict is a value, not control flow: a signature that decodes but
//! does not match is `Invalid`, while structurally unusable input (bad
//! base64, unknown key, rejected message fields) is `Malformed` with the
//! failure category named. Callers handle every verdict explicitly.

use thiserror::Error;

use crate::{
    crypto::Signature,
    encoding::{self, EncodingError},
    keys::KeyProvider,
    message::Message,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationResult {
    Valid,
    Invalid,
    Malformed(MalformedReason),
}

impl VerificationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid)
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("invalid signature encoding")]
    SignatureEncoding,
    #[error("no public key for signer '{0}'")]
    UnknownKey(String),
    #[error("malformed message: {0}")]
    Message(#[from] EncodingError),
}

/// Stateless verification service over a key provider. Each call is
/// independent; concurrent calls share nothing but the provider.
pub struct Verifier<P: KeyProvider> {
    provider: P,
}

impl<P: KeyProvider> Verifier<P> {
    pub fn new(provider: P) -> Self {
        Verifier { provider }
    }

    pub fn verify(
        &self,
        message: &Message,
        signature_b64: &str,
        key_ref: &str,
    ) -> VerificationResult {
        let bytes = match encoding::encode(message) {
            Ok(bytes) => bytes,
            Err(error) => return VerificationResult::Malformed(MalformedReason::Message(error)),
        };

        let signature = match Signature::new_from_b64(signature_b64) {
            Ok(signature) => signature,
            Err(_) => {
                return VerificationResult::Malformed(MalformedReason::SignatureEncoding);
            }
        };

        let public_key = match self.provider.public_key(key_ref) {
            Some(public_key) => public_key,
            None => {
                return VerificationResult::Malformed(MalformedReason::UnknownKey(
                    key_ref.to_owned(),
                ));
            }
        };

        match public_key.verify(&bytes, &signature) {
            true => VerificationResult::Valid,
            false => VerificationResult::Invalid,
        }
    }
}
