//! The real-time transport collaborator: connected sessions, signed
//! fan-out, and the automated reply flow.
//!
//! Every producer is treated uniformly: each session gets its own key
//! pair on connect, and every envelope it emits is independently
//! verifiable, exactly like the daemon's own messages. Whether an
//! envelope reaches everyone or only the original sender is a routing
//! decision made here from the [`ResponseScope`] tag, never inside the
//! signing core.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use sigchat_core::{
    crypto::{NewKeyError, SecretKey},
    envelope::{SealError, SignedEnvelope},
    keys::{KeyProvider, MemoryKeyProvider},
    message::{Message, MessageKind},
};
use thiserror::Error;
use tokio::sync::{
    Mutex,
    mpsc::{self, UnboundedReceiver, UnboundedSender},
};
use uuid::Uuid;

use crate::{
    event::{Event, EventSender},
    responder,
};

#[derive(Error, Debug)]
pub enum RoomError {
    #[error("no session with this id")]
    UnknownSession,
    #[error("cannot create session identity: {0}")]
    CannotCreateIdentity(#[from] NewKeyError),
    #[error("cannot seal message: {0}")]
    CannotSeal(#[from] SealError),
    #[error("signing key is unavailable")]
    MissingSecretKey,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ResponseScope {
    Broadcast,
    SenderOnly,
}

pub struct Outgoing {
    pub envelope: SignedEnvelope,
    pub scope: ResponseScope,
}

struct Session {
    name: String,
    key_ref: String,
    secret_key: Arc<SecretKey>,
    outbox: UnboundedSender<SignedEnvelope>,
}

pub struct ChatRoom {
    provider: Arc<MemoryKeyProvider>,
    bot_name: String,
    sessions: Mutex<HashMap<Uuid, Session>>,
    event_sender: EventSender,
}

impl ChatRoom {
    pub fn new<S: Into<String>>(
        provider: Arc<MemoryKeyProvider>,
        bot_name: S,
        event_sender: EventSender,
    ) -> Self {
        ChatRoom {
            provider,
            bot_name: bot_name.into(),
            sessions: Mutex::new(HashMap::new()),
            event_sender,
        }
    }

    /// Registers a new session with a fresh key pair and greets it with a
    /// signed welcome. The returned receiver yields every envelope routed
    /// to this session.
    pub async fn connect(&self) -> Result<(Uuid, UnboundedReceiver<SignedEnvelope>), RoomError> {
        let secret_key = SecretKey::generate()?;
        let session_id = Uuid::new_v4();
        let key_ref = format!("user:{session_id}");

        self.provider.register(&key_ref, secret_key.public_key());

        let (outbox, inbox) = mpsc::unbounded_channel();

        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            session_id,
            Session {
                name: responder::DEFAULT_NAME.to_owned(),
                key_ref,
                secret_key: Arc::new(secret_key),
                outbox,
            },
        );

        self.event_sender.send(Event::SessionConnected(session_id)).ok();

        let welcome = format!(
            "Welcome, {}! Type /help to see the available commands.",
            responder::DEFAULT_NAME
        );
        let envelope = self.seal_as_bot(welcome)?;
        self.deliver(
            &sessions,
            Outgoing {
                envelope,
                scope: ResponseScope::SenderOnly,
            },
            session_id,
        );

        Ok((session_id, inbox))
    }

    /// Signs and fans out a session's message, then delivers the signed
    /// automated reply to that session only.
    pub async fn publish(&self, session_id: Uuid, text: &str) -> Result<(), RoomError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(RoomError::UnknownSession)?;

        let message = Message::new(
            &session.name,
            text,
            Utc::now().timestamp_millis(),
            Some(MessageKind::User),
        );
        let envelope = match SignedEnvelope::seal(message, &session.key_ref, &session.secret_key) {
            Ok(envelope) => envelope,
            Err(SealError::CannotEncodeMessage(error)) => {
                self.event_sender
                    .send(Event::MessageRejected(session_id, error.to_string()))
                    .ok();
                return Err(SealError::CannotEncodeMessage(error).into());
            }
            Err(SealError::CannotSignMessage(error)) => {
                self.event_sender
                    .send(Event::SigningFailed(error.to_string()))
                    .ok();
                return Err(SealError::CannotSignMessage(error).into());
            }
        };

        let reply_text = responder::process_message(&mut session.name, text);

        let delivered = self.deliver(
            &sessions,
            Outgoing {
                envelope,
                scope: ResponseScope::Broadcast,
            },
            session_id,
        );
        self.event_sender
            .send(Event::MessagePublished(session_id, delivered))
            .ok();

        let reply_envelope = self.seal_as_bot(reply_text)?;
        self.deliver(
            &sessions,
            Outgoing {
                envelope: reply_envelope,
                scope: ResponseScope::SenderOnly,
            },
            session_id,
        );
        self.event_sender.send(Event::ReplySent(session_id)).ok();

        Ok(())
    }

    pub async fn disconnect(&self, session_id: Uuid) {
        let mut sessions = self.sessions.lock().await;

        if let Some(session) = sessions.remove(&session_id) {
            self.provider.forget(&session.key_ref);
            self.event_sender
                .send(Event::SessionDisconnected(session_id))
                .ok();
        }
    }

    fn seal_as_bot(&self, text: String) -> Result<SignedEnvelope, RoomError> {
        let secret_key = self
            .provider
            .secret_key()
            .ok_or(RoomError::MissingSecretKey)?;
        let message = Message::new(
            &self.bot_name,
            text,
            Utc::now().timestamp_millis(),
            Some(MessageKind::Bot),
        );

        match SignedEnvelope::seal(message, self.provider.own_ref(), &secret_key) {
            Ok(envelope) => Ok(envelope),
            Err(error) => {
                self.event_sender
                    .send(Event::SigningFailed(error.to_string()))
                    .ok();
                Err(error.into())
            }
        }
    }

    fn deliver(
        &self,
        sessions: &HashMap<Uuid, Session>,
        outgoing: Outgoing,
        origin: Uuid,
    ) -> usize {
        let recipients = sessions.iter().filter(|(session_id, _)| {
            match outgoing.scope {
                ResponseScope::Broadcast => true,
                ResponseScope::SenderOnly => **session_id == origin,
            }
        });

        let mut delivered = 0;
        for (_, session) in recipients {
            if session.outbox.send(outgoing.envelope.clone()).is_ok() {
                delivered += 1;
            }
        }

        delivered
    }
}
