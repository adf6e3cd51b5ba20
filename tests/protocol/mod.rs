use dephy_interact::model::{ConnectionDefaults, LogEntry};
use dephy_interact::protocol::{process_event, EventData, EventDecoder, SignedMessage};
use dephy_interact::session::{run_decode_stage, AppEvent};
use dephy_interact::tui::App;
use dephy_interact::Error;
use tokio::sync::mpsc;

mod test_helpers;
use test_helpers::*;

#[test]
fn test_event_from_target_device_is_decoded() {
    let payload = EventData { original: 1.5, weight: 2.0, actually: 3.0 };
    let event = create_test_event(DEVICE, &payload, 1_700_000_123);

    let decoded = process_event(&event, &did(DEVICE))
        .expect("Failed to decode event")
        .expect("Event should be accepted");

    assert_eq!(decoded.id, event.id);
    assert_eq!(decoded.payload, payload);
    assert_eq!(decoded.raw.timestamp, 1_700_000_123);
    assert_eq!(decoded.raw.from_address_hex(), DEVICE);
    assert_eq!(decoded.rendered, r#"{"original":1.5,"weight":2,"actually":3}"#);

    let entry = LogEntry::from(decoded);
    assert_eq!(
        entry.render(),
        r#"1700000123 🌎 [NoStr] Received: {"original":1.5,"weight":2,"actually":3}"#
    );
}

#[test]
fn test_event_from_other_device_is_dropped() {
    let payload = EventData { original: 1.0, weight: 1.0, actually: 1.0 };
    let event = create_test_event(OTHER_DEVICE, &payload, 1);
    assert!(process_event(&event, &did(DEVICE)).expect("Filter must not fail").is_none());

    // The dephy_to tag carries the target DID, but only dephy_from counts.
    let mut event = create_test_event(OTHER_DEVICE, &payload, 1);
    event.tags.retain(|t| t[0] != "dephy_to");
    event.tags.push(vec!["dephy_to".to_string(), did(DEVICE)]);
    assert!(process_event(&event, &did(DEVICE)).expect("Filter must not fail").is_none());
}

#[test]
fn test_did_is_matched_exactly() {
    let payload = EventData { original: 0.0, weight: 0.0, actually: 0.0 };
    let event = create_test_event(DEVICE, &payload, 1);
    let upper = did(&DEVICE.to_uppercase().replace("0X", "0x"));
    assert!(process_event(&event, &upper).expect("Filter must not fail").is_none());
}

#[test]
fn test_payload_doubles_are_bit_identical() {
    let values = [
        f64::MIN_POSITIVE,
        -0.0,
        1.0 / 3.0,
        f64::MAX,
        f64::from_bits(0x7ff8_0000_0000_0001),
        f64::NEG_INFINITY,
    ];
    for chunk in values.chunks(3) {
        let payload = EventData { original: chunk[0], weight: chunk[1], actually: chunk[2] };
        let event = create_test_event(DEVICE, &payload, 42);
        let decoded = process_event(&event, &did(DEVICE))
            .expect("Failed to decode event")
            .expect("Event should be accepted");
        assert_eq!(decoded.payload.original.to_bits(), chunk[0].to_bits());
        assert_eq!(decoded.payload.weight.to_bits(), chunk[1].to_bits());
        assert_eq!(decoded.payload.actually.to_bits(), chunk[2].to_bits());
    }
}

#[test]
fn test_malformed_base58_is_decode_error() {
    let event = create_test_event_with_content(DEVICE, "0OIl-not-base58".to_string());
    match process_event(&event, &did(DEVICE)) {
        Err(Error::Decode(_)) => {}
        other => panic!("expected decode error, got {:?}", other.map(|d| d.is_some())),
    }
}

#[tokio::test]
async fn test_malformed_base58_leaves_log_unchanged() {
    let mut app = App::new(ConnectionDefaults::default(), 0, Some(DEVICE.to_string()));
    app.handle_app_event(AppEvent::Info("[NoStr] Subscribed for DePHY messages.".to_string()));
    let before: Vec<String> = app.log.iter().map(|e| e.render()).collect();

    let (relay_tx, relay_rx) = mpsc::channel(4);
    let (app_tx, mut app_rx) = mpsc::unbounded_channel();
    relay_tx
        .send(create_test_event_with_content(DEVICE, "0OIl-not-base58".to_string()))
        .await
        .expect("Failed to queue event");
    drop(relay_tx);
    run_decode_stage(relay_rx, EventDecoder::new(did(DEVICE)), app_tx).await;

    while let Ok(event) = app_rx.try_recv() {
        app.handle_app_event(event);
    }
    let after: Vec<String> = app.log.iter().map(|e| e.render()).collect();
    assert_eq!(after, before);
}

#[test]
fn test_truncated_envelope_is_decode_error() {
    let payload = EventData { original: 1.0, weight: 2.0, actually: 3.0 };
    let raw = create_test_raw_message(&payload, 7);
    let signed = create_test_signed_message(&raw);
    let mut bytes = signed.encode().expect("Failed to encode signed message");
    bytes.truncate(bytes.len() - 3);

    let event = create_test_event_with_content(DEVICE, bs58::encode(bytes).into_string());
    assert!(matches!(process_event(&event, &did(DEVICE)), Err(Error::Decode(_))));
}

#[test]
fn test_short_payload_is_decode_error() {
    let payload = EventData { original: 1.0, weight: 2.0, actually: 3.0 };
    let mut raw = create_test_raw_message(&payload, 7);
    raw.payload.truncate(16);
    let signed = create_test_signed_message(&raw);

    let event = create_test_event_with_content(DEVICE, encode_content(&signed));
    assert!(matches!(process_event(&event, &did(DEVICE)), Err(Error::Decode(_))));
}

#[test]
fn test_hash_check_is_opt_in() {
    let payload = EventData { original: 1.0, weight: 2.0, actually: 3.0 };
    let raw = create_test_raw_message(&payload, 99);
    let mut signed = create_test_signed_message(&raw);
    signed.hash = vec![0u8; 32];
    let event = create_test_event_with_content(DEVICE, encode_content(&signed));

    let lenient = EventDecoder::new(did(DEVICE));
    assert!(lenient.decode(&event).expect("Failed to decode event").is_some());

    let strict = EventDecoder::new(did(DEVICE)).with_hash_check(true);
    assert!(matches!(strict.decode(&event), Err(Error::Decode(_))));

    let good = create_test_event(DEVICE, &payload, 99);
    assert!(strict.decode(&good).expect("Failed to decode event").is_some());
}

#[test]
fn test_hash_check_rejects_nonce_mismatch() {
    let payload = EventData { original: 1.0, weight: 2.0, actually: 3.0 };
    let raw = create_test_raw_message(&payload, 100);
    let raw_bytes = raw.encode().expect("Failed to encode raw message");
    let signed = SignedMessage {
        hash: SignedMessage::compute_hash(&raw_bytes, 101).to_vec(),
        raw: raw_bytes,
        nonce: 101,
        signature: random_bytes(65),
        last_edge_addr: None,
    };
    let event = create_test_event_with_content(DEVICE, encode_content(&signed));

    let strict = EventDecoder::new(did(DEVICE)).with_hash_check(true);
    assert!(matches!(strict.decode(&event), Err(Error::Decode(_))));
}
