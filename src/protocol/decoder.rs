use crate::nostr::{Event, TAG_DEPHY_FROM};
use crate::protocol::{EventData, RawMessage, SignedMessage};
use crate::Result;

/// An accepted relay event with every envelope layer decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    pub id: String,
    pub event: Event,
    pub signed: SignedMessage,
    pub raw: RawMessage,
    pub payload: EventData,
    pub rendered: String,
}

/// Filters relay events down to one device and unwraps
/// base58 → `SignedMessage` → `RawMessage` → `EventData`.
#[derive(Debug, Clone)]
pub struct EventDecoder {
    did: String,
    verify_hash: bool,
}

impl EventDecoder {
    pub fn new(did: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            verify_hash: false,
        }
    }

    pub fn with_hash_check(mut self, enabled: bool) -> Self {
        self.verify_hash = enabled;
        self
    }

    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn accepts(&self, event: &Event) -> bool {
        event.has_tag(TAG_DEPHY_FROM, &self.did)
    }

    /// `Ok(None)` means the event belongs to another device. Errors are
    /// scoped to this event only.
    pub fn decode(&self, event: &Event) -> Result<Option<DecodedEvent>> {
        if !self.accepts(event) {
            return Ok(None);
        }

        let content = bs58::decode(&event.content).into_vec()?;
        let signed = SignedMessage::decode(&content)?;
        let raw = RawMessage::decode(&signed.raw)?;
        if self.verify_hash {
            signed.verify_hash(&raw)?;
        }
        let payload = EventData::decode(&raw.payload)?;

        Ok(Some(DecodedEvent {
            id: event.id.clone(),
            event: event.clone(),
            rendered: payload.render(),
            signed,
            raw,
            payload,
        }))
    }
}

pub fn process_event(event: &Event, did: &str) -> Result<Option<DecodedEvent>> {
    EventDecoder::new(did).decode(event)
}
