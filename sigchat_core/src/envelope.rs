use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    crypto::{SecretKey, Signature, SigningError},
    encoding::{self, EncodingError},
    keys::KeyProvider,
    message::Message,
};

#[derive(Error, Debug)]
pub enum SealError {
    #[error("cannot encode message: {0}")]
    CannotEncodeMessage(#[from] EncodingError),
    #[error("cannot sign message: {0}")]
    CannotSignMessage(#[from] SigningError),
}

/// A message bundled with its signature and the reference of the key that
/// produced it, exchanged as one unit. The signature covers the canonical
/// encoding of `message` only, so any change to the message invalidates it
/// by construction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub message: Message,
    pub signature: String,
    pub signer: String,
}

impl SignedEnvelope {
    /// Encode → sign → bundle. A message the encoder rejects is never
    /// signed.
    pub fn seal<S: Into<String>>(
        message: Message,
        signer: S,
        secret_key: &SecretKey,
    ) -> Result<Self, SealError> {
        let bytes = encoding::encode(&message)?;
        let signature = secret_key.sign(&bytes)?;

        Ok(SignedEnvelope {
            message,
            signature: signature.to_b64(),
            signer: signer.into(),
        })
    }

    /// Returns the message and whether it is authentic under the key the
    /// provider holds for `signer`. Authenticity is data, not an
    /// exception: every failure along the way reads as `false`.
    pub fn open<P: KeyProvider>(self, provider: &P) -> (Message, bool) {
        let authentic = self.is_authentic(provider);
        (self.message, authentic)
    }

    fn is_authentic<P: KeyProvider>(&self, provider: &P) -> bool {
        let Ok(bytes) = encoding::encode(&self.message) else {
            return false;
        };
        let Ok(signature) = Signature::new_from_b64(&self.signature) else {
            return false;
        };
        let Some(public_key) = provider.public_key(&self.signer) else {
            return false;
        };

        public_key.verify(&bytes, &signature)
    }
}
