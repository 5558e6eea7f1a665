//! RSA-PSS signing and verification.
//!
//! The parameters are process-wide constants: 2048-bit modulus, SHA-256 as
//! both message digest and MGF1 hash, salt length equal to the digest
//! length (32 bytes). Changing any of them is a breaking protocol change:
//! signatures produced under one configuration do not verify under another.

use base64::{Engine, prelude::BASE64_STANDARD};
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::pss::{Signature as PssSignature, SigningKey, VerifyingKey};
use rsa::sha2::Sha256;
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use thiserror::Error;

pub const MODULUS_BITS: usize = 2048;
pub const SIGNATURE_LENGTH: usize = MODULUS_BITS / 8;

#[derive(Error, Debug)]
pub enum NewKeyError {
    #[error("cannot read base64 in standard alphabet from input")]
    CannotDecode,
    #[error("cannot parse rsa key from der bytes")]
    InvalidKey,
    #[error("key modulus is not {MODULUS_BITS} bits")]
    WrongKeySize,
    #[error("cannot generate rsa key material")]
    CannotGenerate,
}

#[derive(Error, Debug)]
pub enum SigningError {
    #[error("private key is unusable for signing")]
    UnusableKey,
}

#[derive(Error, Debug)]
pub enum NewSignatureError {
    #[error("cannot read base64 in standard alphabet from input")]
    CannotDecode,
}

#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    pub fn new_from_b64<S: AsRef<str>>(b64_string: S) -> Result<Self, NewKeyError> {
        let der_bytes = BASE64_STANDARD
            .decode(b64_string.as_ref())
            .map_err(|_| NewKeyError::CannotDecode)?;
        Self::new_from_der(&der_bytes)
    }

    pub fn new_from_der(der_bytes: &[u8]) -> Result<Self, NewKeyError> {
        let key = RsaPublicKey::from_public_key_der(der_bytes).map_err(|_| NewKeyError::InvalidKey)?;
        if key.size() != SIGNATURE_LENGTH {
            return Err(NewKeyError::WrongKeySize);
        }
        Ok(Self(key))
    }

    /// SPKI DER wrapped in standard base64, the interchange form used on
    /// the wire and by the key endpoint.
    pub fn to_b64(&self) -> String {
        let der = self
            .0
            .to_public_key_der()
            .expect("rsa public key should encode to der");
        b64_from_bytes(der.as_bytes())
    }

    /// True iff `signature` is a valid PSS signature of `bytes` under this
    /// key. Non-matching or unusable signatures yield `false`; this path
    /// never fails structurally.
    pub fn verify(&self, bytes: &[u8], signature: &Signature) -> bool {
        let verifying_key = VerifyingKey::<Sha256>::new(self.0.clone());
        match PssSignature::try_from(signature.as_bytes()) {
            Ok(pss_signature) => verifying_key.verify(bytes, &pss_signature).is_ok(),
            Err(_) => false,
        }
    }
}

pub struct SecretKey(RsaPrivateKey);

// No Debug, no Clone, no serde: secret key material never reaches logs or
// the wire. Share it as Arc<SecretKey>.

impl SecretKey {
    pub fn generate() -> Result<Self, NewKeyError> {
        let key =
            RsaPrivateKey::new(&mut OsRng, MODULUS_BITS).map_err(|_| NewKeyError::CannotGenerate)?;
        Ok(Self(key))
    }

    pub fn new_from_pkcs8_der(der_bytes: &[u8]) -> Result<Self, NewKeyError> {
        let key = RsaPrivateKey::from_pkcs8_der(der_bytes).map_err(|_| NewKeyError::InvalidKey)?;
        if key.size() != SIGNATURE_LENGTH {
            return Err(NewKeyError::WrongKeySize);
        }
        Ok(Self(key))
    }

    pub fn to_pkcs8_der(&self) -> Vec<u8> {
        self.0
            .to_pkcs8_der()
            .expect("rsa private key should encode to der")
            .as_bytes()
            .to_vec()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.to_public_key())
    }

    /// Signs with a fresh random salt. Two signatures over the same bytes
    /// are not byte-identical, but both verify.
    pub fn sign(&self, bytes: &[u8]) -> Result<Signature, SigningError> {
        let signing_key = SigningKey::<Sha256>::new(self.0.clone());
        let signature = signing_key
            .try_sign_with_rng(&mut OsRng, bytes)
            .map_err(|_| SigningError::UnusableKey)?;
        Ok(Signature(signature.to_bytes().into_vec()))
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new_from_b64<S: AsRef<str>>(b64_string: S) -> Result<Self, NewSignatureError> {
        BASE64_STANDARD
            .decode(b64_string.as_ref())
            .map(Signature)
            .map_err(|_| NewSignatureError::CannotDecode)
    }

    pub fn to_b64(&self) -> String {
        b64_from_bytes(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn b64_from_bytes(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}
