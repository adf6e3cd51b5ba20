use crate::protocol::envelope::decode_borsh;
use crate::Result;
use borsh::{BorshDeserialize, BorshSerialize};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{Read, Write};

/// Largest magnitude where every integer is still exact in an f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Device report carried in `RawMessage::payload`: three little-endian f64s
/// in the order `original`, `weight`, `actually`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub original: f64,
    pub weight: f64,
    pub actually: f64,
}

// Hand-written so NaN payloads pass through bit for bit; borsh's own f64
// impl refuses them.
impl BorshSerialize for EventData {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_f64::<LittleEndian>(self.original)?;
        writer.write_f64::<LittleEndian>(self.weight)?;
        writer.write_f64::<LittleEndian>(self.actually)
    }
}

impl BorshDeserialize for EventData {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        Ok(Self {
            original: reader.read_f64::<LittleEndian>()?,
            weight: reader.read_f64::<LittleEndian>()?,
            actually: reader.read_f64::<LittleEndian>()?,
        })
    }
}

#[derive(Serialize)]
struct Rendered {
    original: Value,
    weight: Value,
    actually: Value,
}

/// Integral values print without a fraction (`2`, not `2.0`), the way the
/// web dashboard shows them.
fn display_number(value: f64) -> Value {
    if !value.is_finite() {
        Value::Null
    } else if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

impl EventData {
    pub const ENCODED_SIZE: usize = 24;

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(borsh::to_vec(self)?)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        decode_borsh(data, "EventData")
    }

    /// JSON rendering shown in the feed. Non-finite values render as `null`.
    pub fn render(&self) -> String {
        let rendered = Rendered {
            original: display_number(self.original),
            weight: display_number(self.weight),
            actually: display_number(self.actually),
        };
        serde_json::to_string(&rendered).unwrap_or_default()
    }
}
