//! Key lookup capability.
//!
//! How keys are persisted (files, vault, hardware) is a provider concern;
//! the core only requires synchronous lookups returning immutable keys.
//! Retrying a transient lookup failure is the provider's business too.

use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::crypto::{PublicKey, SecretKey};

pub trait KeyProvider {
    /// The private half of the identity this process signs with.
    fn secret_key(&self) -> Option<Arc<SecretKey>>;

    fn public_key(&self, key_ref: &str) -> Option<Arc<PublicKey>>;
}

impl<P: KeyProvider + ?Sized> KeyProvider for Arc<P> {
    fn secret_key(&self) -> Option<Arc<SecretKey>> {
        (**self).secret_key()
    }

    fn public_key(&self, key_ref: &str) -> Option<Arc<PublicKey>> {
        (**self).public_key(key_ref)
    }
}

/// Process-memory provider. The secret key is loaded once and shared by
/// reference; rotation swaps the `Arc` rather than mutating key bytes in
/// place, so concurrent signers finish with whichever key they started
/// with.
pub struct MemoryKeyProvider {
    own_ref: String,
    secret: RwLock<Arc<SecretKey>>,
    registry: RwLock<HashMap<String, Arc<PublicKey>>>,
}

impl MemoryKeyProvider {
    pub fn new<S: Into<String>>(own_ref: S, secret_key: SecretKey) -> Self {
        let own_ref = own_ref.into();
        let public_key = Arc::new(secret_key.public_key());

        let mut registry = HashMap::new();
        registry.insert(own_ref.clone(), public_key);

        MemoryKeyProvider {
            own_ref,
            secret: RwLock::new(Arc::new(secret_key)),
            registry: RwLock::new(registry),
        }
    }

    pub fn own_ref(&self) -> &str {
        &self.own_ref
    }

    pub fn register<S: Into<String>>(&self, key_ref: S, public_key: PublicKey) {
        self.registry
            .write()
            .insert(key_ref.into(), Arc::new(public_key));
    }

    pub fn forget(&self, key_ref: &str) {
        self.registry.write().remove(key_ref);
    }

    /// Swaps the signing identity. Envelopes sealed before rotation stop
    /// verifying against the provider's own ref, which is the documented
    /// consequence of a key change.
    pub fn rotate(&self, new_secret_key: SecretKey) {
        let public_key = Arc::new(new_secret_key.public_key());
        *self.secret.write() = Arc::new(new_secret_key);
        self.registry
            .write()
            .insert(self.own_ref.clone(), public_key);
    }
}

impl KeyProvider for MemoryKeyProvider {
    fn secret_key(&self) -> Option<Arc<SecretKey>> {
        Some(Arc::clone(&self.secret.read()))
    }

    fn public_key(&self, key_ref: &str) -> Option<Arc<PublicKey>> {
        self.registry.read().get(key_ref).cloned()
    }
}
