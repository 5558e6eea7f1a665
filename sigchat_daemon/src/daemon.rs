//! HTTP boundary. Exposes the verification operation and public-key
//! lookup; the chat room itself is handed to the realtime frontend by
//! [`Daemon::room`].

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing,
};
use sigchat_core::{
    crypto::SecretKey,
    keys::{KeyProvider, MemoryKeyProvider},
    verify::{VerificationResult, Verifier},
};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::{
    config::DaemonConfig,
    event::{Event, EventSender},
    room::ChatRoom,
    wire::{VerifyRequest, VerifyResponse},
};

pub const DEFAULT_LISTENING_PORT: u16 = 5000;

const BOT_KEY_REF: &str = "bot";

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("cannot bind port {0} (is it in use?)")]
    CannotBindPort(u16),
}

pub struct Daemon {
    room: Arc<ChatRoom>,
    provider: Arc<MemoryKeyProvider>,
    config: DaemonConfig,
    event_sender: EventSender,
}

impl Daemon {
    pub fn new(config: DaemonConfig, secret_key: SecretKey, event_sender: EventSender) -> Self {
        let provider = Arc::new(MemoryKeyProvider::new(BOT_KEY_REF, secret_key));
        let room = Arc::new(ChatRoom::new(
            Arc::clone(&provider),
            config.bot_name.clone(),
            event_sender.clone(),
        ));

        Daemon {
            room,
            provider,
            config,
            event_sender,
        }
    }

    pub fn room(&self) -> Arc<ChatRoom> {
        Arc::clone(&self.room)
    }

    pub async fn start_listener(&self) -> Result<(), DaemonError> {
        let listener_state = Arc::new(ListenerState {
            verifier: Verifier::new(Arc::clone(&self.provider)),
            provider: Arc::clone(&self.provider),
            event_sender: self.event_sender.clone(),
        });
        let router = Router::new()
            .route("/verify", routing::post(handle_verify))
            .route("/key/{key_ref}", routing::get(handle_key))
            .with_state(listener_state);

        let port = self.config.custom_port.unwrap_or(DEFAULT_LISTENING_PORT);
        let address = format!("0.0.0.0:{}", port);

        let listener = TcpListener::bind(address)
            .await
            .map_err(|_| DaemonError::CannotBindPort(port))?;

        tokio::spawn(async {
            axum::serve(listener, router.into_make_service())
                .await
                .expect("should run indefinitely");
        });

        self.event_sender
            .send(Event::ListenerStartedListening(port))
            .ok();

        Ok(())
    }
}

struct ListenerState {
    verifier: Verifier<Arc<MemoryKeyProvider>>,
    provider: Arc<MemoryKeyProvider>,
    event_sender: EventSender,
}

/// `Malformed` is the client's problem and maps to 400; both real
/// verdicts come back as 200 with the verdict embedded.
async fn handle_verify(
    State(state): State<Arc<ListenerState>>,
    Json(request): Json<VerifyRequest>,
) -> (StatusCode, Json<VerifyResponse>) {
    let result = state
        .verifier
        .verify(&request.message, &request.signature, &request.signer);

    let status = match result {
        VerificationResult::Malformed(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    };

    let response = VerifyResponse::from(result);
    state
        .event_sender
        .send(Event::VerificationServed(response.verdict.clone()))
        .ok();

    (status, Json(response))
}

async fn handle_key(
    State(state): State<Arc<ListenerState>>,
    Path(key_ref): Path<String>,
) -> Result<String, StatusCode> {
    match state.provider.public_key(&key_ref) {
        Some(public_key) => Ok(public_key.to_b64()),
        None => Err(StatusCode::NOT_FOUND),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::event_channel;

    #[tokio::test]
    async fn daemon_identity_is_resolvable_by_ref() -> anyhow::Result<()> {
        let (event_sender, _event_receiver) = event_channel();
        let secret_key = SecretKey::generate()?;
        let expected_public = secret_key.public_key();

        let daemon = Daemon::new(DaemonConfig::default(), secret_key, event_sender);

        let resolved = daemon.provider.public_key(BOT_KEY_REF).unwrap();
        assert_eq!(*resolved, expected_public);

        Ok(())
    }

    #[tokio::test]
    async fn verify_handler_embeds_the_verdict() -> anyhow::Result<()> {
        let (event_sender, _event_receiver) = event_channel();
        let daemon = Daemon::new(DaemonConfig::default(), SecretKey::generate()?, event_sender);

        let room = daemon.room();
        let (alice_id, mut inbox) = room.connect().await?;
        inbox.recv().await.unwrap();
        room.publish(alice_id, "hi").await?;

        let envelope = inbox.recv().await.unwrap();

        let state = Arc::new(ListenerState {
            verifier: Verifier::new(Arc::clone(&daemon.provider)),
            provider: Arc::clone(&daemon.provider),
            event_sender: daemon.event_sender.clone(),
        });

        let (status, Json(response)) = handle_verify(
            State(Arc::clone(&state)),
            Json(VerifyRequest {
                message: envelope.message.clone(),
                signature: envelope.signature.clone(),
                signer: envelope.signer.clone(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.verdict, "valid");

        let (status, Json(response)) = handle_verify(
            State(Arc::clone(&state)),
            Json(VerifyRequest {
                message: envelope.message.clone(),
                signature: "not-base64!!".to_owned(),
                signer: envelope.signer.clone(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response.verdict, "malformed");
        assert_eq!(
            response.reason.as_deref(),
            Some("invalid signature encoding")
        );

        Ok(())
    }

    #[tokio::test]
    async fn key_handler_serves_known_refs_only() -> anyhow::Result<()> {
        let (event_sender, _event_receiver) = event_channel();
        let daemon = Daemon::new(DaemonConfig::default(), SecretKey::generate()?, event_sender);

        let state = Arc::new(ListenerState {
            verifier: Verifier::new(Arc::clone(&daemon.provider)),
            provider: Arc::clone(&daemon.provider),
            event_sender: daemon.event_sender.clone(),
        });

        let served = handle_key(State(Arc::clone(&state)), Path(BOT_KEY_REF.to_owned()))
            .await
            .expect("bot key should be served");
        assert_eq!(
            served,
            daemon.provider.public_key(BOT_KEY_REF).unwrap().to_b64()
        );

        assert_eq!(
            handle_key(State(state), Path("user:nobody".to_owned())).await,
            Err(StatusCode::NOT_FOUND)
        );

        Ok(())
    }
}
