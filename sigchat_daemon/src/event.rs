//! Daemon observability. Every notable outcome is sent as an [`Event`]
//! over an unbounded channel; frontends decide how to surface them.
//! Events never carry key material.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

pub enum Event {
    ListenerStartedListening(u16),
    SessionConnected(Uuid),
    SessionDisconnected(Uuid),
    MessagePublished(Uuid, usize),
    ReplySent(Uuid),
    MessageRejected(Uuid, String),
    SigningFailed(String),
    VerificationServed(String),
}

pub type EventSender = UnboundedSender<Event>;

pub fn event_channel() -> (EventSender, UnboundedReceiver<Event>) {
    mpsc::unbounded_channel()
}

pub trait HandleEvent {
    fn handle_event(&mut self, event: Event);
}
