use std::sync::Arc;

use sigchat_core::{
    crypto::SecretKey,
    envelope::{SealError, SignedEnvelope},
    keys::MemoryKeyProvider,
    message::{Message, MessageKind},
};

pub struct MockParticipant {
    pub name: String,
    pub key_ref: String,
    secret_key: SecretKey,
}

impl MockParticipant {
    pub fn new(name: &str, provider: &Arc<MemoryKeyProvider>) -> Self {
        let secret_key = SecretKey::generate().expect("key generation should succeed in tests");
        let key_ref = format!("user:{name}");

        provider.register(&key_ref, secret_key.public_key());

        MockParticipant {
            name: name.to_owned(),
            key_ref,
            secret_key,
        }
    }

    pub fn send(&self, text: &str, timestamp: i64) -> Result<SignedEnvelope, SealError> {
        let message = Message::new(&self.name, text, timestamp, Some(MessageKind::User));
        SignedEnvelope::seal(message, &self.key_ref, &self.secret_key)
    }
}
