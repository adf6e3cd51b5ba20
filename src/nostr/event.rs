use crate::{Error, Result};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

/// Event kind DePHY devices publish under.
pub const DEPHY_KIND: u32 = 1111;
/// Value of the `c` tag marking DePHY traffic.
pub const DEPHY_CATEGORY: &str = "dephy";
pub const TAG_DEPHY_FROM: &str = "dephy_from";
pub const TAG_DEPHY_TO: &str = "dephy_to";
pub const TAG_DEPHY_EDGE: &str = "dephy_edge";

/// NIP-01 event as delivered by a relay. The `sig` field is passed through
/// untouched; verification belongs to the relay client layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub pubkey: String,
    pub created_at: u64,
    pub kind: u32,
    pub tags: Vec<Vec<String>>,
    pub content: String,
    pub sig: String,
}

impl Event {
    /// True if any tag is exactly `[key, value, ...]`.
    pub fn has_tag(&self, key: &str, value: &str) -> bool {
        self.tags.iter().any(|t| {
            t.first().map(String::as_str) == Some(key) && t.get(1).map(String::as_str) == Some(value)
        })
    }

    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.first().map(String::as_str) == Some(key))
            .and_then(|t| t.get(1))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub kinds: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<u64>,
    #[serde(rename = "#c", skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl Filter {
    /// Every DePHY event published at or after `since` (unix seconds).
    pub fn dephy_since(since: u64) -> Self {
        Self {
            kinds: vec![DEPHY_KIND],
            since: Some(since),
            categories: vec![DEPHY_CATEGORY.to_string()],
        }
    }
}

/// `["REQ", <id>, <filter>...]`, serialized straight from the structs so
/// filter fields keep their declared order.
struct ReqFrame<'a> {
    subscription_id: &'a str,
    filters: &'a [Filter],
}

impl Serialize for ReqFrame<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2 + self.filters.len()))?;
        seq.serialize_element("REQ")?;
        seq.serialize_element(self.subscription_id)?;
        for filter in self.filters {
            seq.serialize_element(filter)?;
        }
        seq.end()
    }
}

pub struct ClientMessage;

impl ClientMessage {
    pub fn req(subscription_id: &str, filters: &[Filter]) -> Result<String> {
        Ok(serde_json::to_string(&ReqFrame {
            subscription_id,
            filters,
        })?)
    }

    pub fn close(subscription_id: &str) -> String {
        json!(["CLOSE", subscription_id]).to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
    Event {
        subscription_id: String,
        event: Box<Event>,
    },
    EndOfStoredEvents(String),
    Notice(String),
    Closed {
        subscription_id: String,
        message: String,
    },
    Unknown(String),
}

impl RelayMessage {
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let frame = value
            .as_array()
            .ok_or_else(|| Error::Decode("relay frame is not a JSON array".to_string()))?;
        let label = frame
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Decode("relay frame has no label".to_string()))?;

        let string_at = |i: usize| -> Result<String> {
            frame
                .get(i)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| Error::Decode(format!("{} frame missing string at {}", label, i)))
        };

        match label {
            "EVENT" => {
                let event = frame
                    .get(2)
                    .cloned()
                    .ok_or_else(|| Error::Decode("EVENT frame missing event".to_string()))?;
                Ok(RelayMessage::Event {
                    subscription_id: string_at(1)?,
                    event: Box::new(serde_json::from_value(event)?),
                })
            }
            "EOSE" => Ok(RelayMessage::EndOfStoredEvents(string_at(1)?)),
            "NOTICE" => Ok(RelayMessage::Notice(string_at(1)?)),
            "CLOSED" => Ok(RelayMessage::Closed {
                subscription_id: string_at(1)?,
                message: string_at(2).unwrap_or_default(),
            }),
            other => Ok(RelayMessage::Unknown(other.to_string())),
        }
    }
}
