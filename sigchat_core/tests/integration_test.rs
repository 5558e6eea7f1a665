use std::sync::Arc;

use mock::MockParticipant;
use sigchat_core::{
    crypto::SecretKey,
    keys::{KeyProvider, MemoryKeyProvider},
    verify::{MalformedReason, VerificationResult, Verifier},
};

mod mock;

fn shared_provider() -> anyhow::Result<Arc<MemoryKeyProvider>> {
    Ok(Arc::new(MemoryKeyProvider::new(
        "bot",
        SecretKey::generate()?,
    )))
}

#[test]
fn envelope_verifies_end_to_end() -> anyhow::Result<()> {
    let provider = shared_provider()?;
    let alice = MockParticipant::new("alice", &provider);
    let verifier = Verifier::new(Arc::clone(&provider));

    let envelope = alice.send("hi", 1000)?;

    assert_eq!(
        verifier.verify(&envelope.message, &envelope.signature, &envelope.signer),
        VerificationResult::Valid
    );

    let (message, authentic) = envelope.open(&provider);
    assert!(authentic);
    assert_eq!(message.sender, "alice");

    Ok(())
}

#[test]
fn tampering_after_sealing_is_detected() -> anyhow::Result<()> {
    let provider = shared_provider()?;
    let alice = MockParticipant::new("alice", &provider);
    let verifier = Verifier::new(Arc::clone(&provider));

    let envelope = alice.send("pay bob 10", 1000)?;

    let mut tampered = envelope.message.clone();
    tampered.text = "pay eve 10".to_owned();

    assert_eq!(
        verifier.verify(&tampered, &envelope.signature, &envelope.signer),
        VerificationResult::Invalid
    );

    Ok(())
}

#[test]
fn participants_cannot_impersonate_each_other() -> anyhow::Result<()> {
    let provider = shared_provider()?;
    let alice = MockParticipant::new("alice", &provider);
    let mallory = MockParticipant::new("mallory", &provider);
    let verifier = Verifier::new(Arc::clone(&provider));

    let envelope = mallory.send("hi, it's alice", 1000)?;

    // Mallory claims alice's key produced the signature.
    assert_eq!(
        verifier.verify(&envelope.message, &envelope.signature, &alice.key_ref),
        VerificationResult::Invalid
    );

    Ok(())
}

#[test]
fn wire_round_trip_preserves_the_verdict() -> anyhow::Result<()> {
    let provider = shared_provider()?;
    let alice = MockParticipant::new("alice", &provider);
    let verifier = Verifier::new(Arc::clone(&provider));

    let envelope = alice.send("hi", 1000)?;
    let transmitted: sigchat_core::envelope::SignedEnvelope =
        serde_json::from_str(&serde_json::to_string(&envelope)?)?;

    assert!(
        verifier
            .verify(
                &transmitted.message,
                &transmitted.signature,
                &transmitted.signer
            )
            .is_valid()
    );

    Ok(())
}

#[test]
fn malformed_inputs_never_read_as_invalid_signatures() -> anyhow::Result<()> {
    let provider = shared_provider()?;
    let alice = MockParticipant::new("alice", &provider);
    let verifier = Verifier::new(Arc::clone(&provider));

    let envelope = alice.send("hi", 1000)?;

    assert!(matches!(
        verifier.verify(&envelope.message, "not-base64!!", &envelope.signer),
        VerificationResult::Malformed(MalformedReason::SignatureEncoding)
    ));
    assert!(matches!(
        verifier.verify(&envelope.message, &envelope.signature, "user:nobody"),
        VerificationResult::Malformed(MalformedReason::UnknownKey(_))
    ));

    Ok(())
}

#[test]
fn rotation_switches_which_envelopes_verify() -> anyhow::Result<()> {
    let provider = shared_provider()?;
    let verifier = Verifier::new(Arc::clone(&provider));

    let old_secret = provider.secret_key().unwrap();
    let before = sigchat_core::envelope::SignedEnvelope::seal(
        sigchat_core::message::Message::new("bot", "before rotation", 1000, None),
        "bot",
        &old_secret,
    )?;

    provider.rotate(SecretKey::generate()?);

    let after = sigchat_core::envelope::SignedEnvelope::seal(
        sigchat_core::message::Message::new("bot", "after rotation", 2000, None),
        "bot",
        &provider.secret_key().unwrap(),
    )?;

    assert_eq!(
        verifier.verify(&before.message, &before.signature, "bot"),
        VerificationResult::Invalid
    );
    assert_eq!(
        verifier.verify(&after.message, &after.signature, "bot"),
        VerificationResult::Valid
    );

    Ok(())
}
