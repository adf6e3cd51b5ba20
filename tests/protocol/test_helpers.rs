use dephy_interact::nostr::{Event, DEPHY_KIND, TAG_DEPHY_EDGE, TAG_DEPHY_FROM, TAG_DEPHY_TO};
use dephy_interact::protocol::{EventData, MessageChannel, RawMessage, SignedMessage};
use rand::RngCore;

pub const DEVICE: &str = "0x5865a1234567890abcdef1234567890abcdef123";
pub const OTHER_DEVICE: &str = "0x00000000000000000000000000000000000000aa";

pub fn did(address: &str) -> String {
    format!("did:dephy:{}", address)
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

pub fn create_test_raw_message(payload: &EventData, timestamp: u64) -> RawMessage {
    RawMessage {
        channel: MessageChannel::Normal(0),
        timestamp,
        from_address: hex_address(DEVICE),
        to_address: random_bytes(20),
        encrypted: false,
        payload: payload.encode().expect("Failed to encode payload"),
        enc_iv: None,
    }
}

/// Producer side: sign-free envelope with a correct hash.
pub fn create_test_signed_message(raw: &RawMessage) -> SignedMessage {
    let raw_bytes = raw.encode().expect("Failed to encode raw message");
    SignedMessage {
        hash: SignedMessage::compute_hash(&raw_bytes, raw.timestamp).to_vec(),
        raw: raw_bytes,
        nonce: raw.timestamp,
        signature: random_bytes(65),
        last_edge_addr: Some(random_bytes(20)),
    }
}

pub fn encode_content(signed: &SignedMessage) -> String {
    bs58::encode(signed.encode().expect("Failed to encode signed message")).into_string()
}

pub fn create_test_event_with_content(from: &str, content: String) -> Event {
    Event {
        id: hex::encode(random_bytes(32)),
        pubkey: hex::encode(random_bytes(32)),
        created_at: 1_700_000_000,
        kind: DEPHY_KIND,
        tags: vec![
            vec!["c".to_string(), "dephy".to_string()],
            vec![TAG_DEPHY_TO.to_string(), did(OTHER_DEVICE)],
            vec![TAG_DEPHY_FROM.to_string(), did(from)],
            vec![TAG_DEPHY_EDGE.to_string(), did(OTHER_DEVICE)],
        ],
        content,
        sig: hex::encode(random_bytes(64)),
    }
}

pub fn create_test_event(from: &str, payload: &EventData, timestamp: u64) -> Event {
    let raw = create_test_raw_message(payload, timestamp);
    let signed = create_test_signed_message(&raw);
    create_test_event_with_content(from, encode_content(&signed))
}

pub fn hex_address(address: &str) -> Vec<u8> {
    hex::decode(address.trim_start_matches("0x")).expect("Failed to decode address hex")
}
