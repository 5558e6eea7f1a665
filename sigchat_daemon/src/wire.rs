//! Serde shapes for the verification endpoint. Signature bytes travel as
//! standard-alphabet, padded base64; verdicts as the three lowercase
//! words callers switch on.

use serde::{Deserialize, Serialize};
use sigchat_core::{message::Message, verify::VerificationResult};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VerifyRequest {
    pub message: Message,
    pub signature: String,
    pub signer: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VerifyResponse {
    pub verdict: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<VerificationResult> for VerifyResponse {
    fn from(result: VerificationResult) -> Self {
        match result {
            VerificationResult::Valid => VerifyResponse {
                verdict: "valid".to_owned(),
                reason: None,
            },
            VerificationResult::Invalid => VerifyResponse {
                verdict: "invalid".to_owned(),
                reason: None,
            },
            VerificationResult::Malformed(reason) => VerifyResponse {
                verdict: "malformed".to_owned(),
                reason: Some(reason.to_string()),
            },
        }
    }
}
