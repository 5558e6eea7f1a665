use serde::{Deserialize, Serialize};

/// Logical chat message. Immutable once created; the canonical encoding in
/// [`crate::encoding`] covers exactly these fields.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    pub sender: String,
    pub text: String,
    /// Unix milliseconds, stamped by the producer.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
}

impl Message {
    pub fn new<S, T>(sender: S, text: T, timestamp: i64, kind: Option<MessageKind>) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Message {
            sender: sender.into(),
            text: text.into(),
            timestamp,
            kind,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Bot,
}
