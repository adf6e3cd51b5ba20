use crate::{Error, Result};
use borsh::{BorshDeserialize, BorshSerialize};
use tiny_keccak::{Hasher, Keccak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum MessageChannel {
    Normal(u8),
    TunnelNegotiate(u8),
}

/// Outer envelope as published on the relay. `signature` is carried but
/// never checked here.
#[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct SignedMessage {
    pub raw: Vec<u8>,
    pub hash: Vec<u8>,
    pub nonce: u64,
    pub signature: Vec<u8>,
    pub last_edge_addr: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct RawMessage {
    pub channel: MessageChannel,
    pub timestamp: u64,
    pub from_address: Vec<u8>,
    pub to_address: Vec<u8>,
    pub encrypted: bool,
    pub payload: Vec<u8>,
    pub enc_iv: Option<Vec<u8>>,
}

/// Strict Borsh decode: trailing bytes, bad tags and short input all fail.
pub(crate) fn decode_borsh<T: BorshDeserialize>(data: &[u8], what: &str) -> Result<T> {
    borsh::from_slice(data).map_err(|e| Error::Decode(format!("{}: {}", what, e)))
}

impl SignedMessage {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(borsh::to_vec(self)?)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        decode_borsh(data, "SignedMessage")
    }

    /// Hash the producer commits to: keccak256(raw || decimal nonce).
    pub fn compute_hash(raw: &[u8], nonce: u64) -> [u8; 32] {
        let mut k = Keccak::v256();
        let mut out = [0u8; 32];
        k.update(raw);
        k.update(nonce.to_string().as_bytes());
        k.finalize(&mut out);
        out
    }

    /// Integrity check of the envelope against its decoded inner message.
    /// Does not recover or verify the signer.
    pub fn verify_hash(&self, raw: &RawMessage) -> Result<()> {
        let expected = Self::compute_hash(&self.raw, self.nonce);
        if self.hash.as_slice() != expected.as_slice() {
            return Err(Error::Decode(format!(
                "hash verification failed: expected=0x{} current=0x{}",
                hex::encode(&self.hash),
                hex::encode(expected)
            )));
        }
        if self.nonce != raw.timestamp {
            return Err(Error::Decode(format!(
                "timestamp check failed: outer={} inner={}",
                self.nonce, raw.timestamp
            )));
        }
        Ok(())
    }
}

impl RawMessage {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(borsh::to_vec(self)?)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        decode_borsh(data, "RawMessage")
    }

    pub fn from_address_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.from_address))
    }
}
