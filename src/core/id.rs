//! Record identifiers
//!
//! Every stored record is addressed by a 24 hex digit identifier: a 4-byte
//! big-endian creation timestamp (seconds) followed by 8 random bytes. The
//! layout matches the document-store object ids clients already send.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of the textual form of a [`RecordId`]
pub const RECORD_ID_LEN: usize = 24;

/// Identifier of a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId([u8; 12]);

/// The supplied text is not a well-formed record identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a well-formed record id")]
pub struct MalformedId(pub String);

impl RecordId {
    /// Generate a fresh identifier stamped with the current time
    pub fn new() -> Self {
        let mut bytes = [0u8; 12];
        let secs = Utc::now().timestamp().clamp(0, i64::from(u32::MAX)) as u32;
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&Uuid::new_v4().as_bytes()[..8]);
        Self(bytes)
    }

    /// Build an identifier from its raw bytes
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the identifier
    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Whether `text` is exactly 24 hex digits
    pub fn is_well_formed(text: &str) -> bool {
        text.len() == RECORD_ID_LEN && text.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Parse the 24 hex digit textual form
    pub fn parse(text: &str) -> Result<Self, MalformedId> {
        if !Self::is_well_formed(text) {
            return Err(MalformedId(text.to_string()));
        }

        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &text[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16).map_err(|_| MalformedId(text.to_string()))?;
        }

        Ok(Self(bytes))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for RecordId {
    type Err = MalformedId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_well_formed_and_distinct() {
        let a = RecordId::new();
        let b = RecordId::new();

        assert!(RecordId::is_well_formed(&a.to_string()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_accepts_mixed_case_hex() {
        let id = RecordId::parse("5F3A9c0b1d2e3f4a5b6c7d8e").unwrap();
        assert_eq!(id.to_string(), "5f3a9c0b1d2e3f4a5b6c7d8e");
    }

    #[test]
    fn test_parse_rejects_wrong_length_and_non_hex() {
        assert!(RecordId::parse("abc").is_err());
        assert!(RecordId::parse("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
        assert!(RecordId::parse("000000000000000000000000ff").is_err());
        assert!(RecordId::parse("").is_err());
    }

    #[test]
    fn test_all_zero_id_is_well_formed() {
        let id = RecordId::parse("000000000000000000000000").unwrap();
        assert_eq!(id.bytes(), [0u8; 12]);
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let id = RecordId::parse("0123456789abcdef01234567").unwrap();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::json!("0123456789abcdef01234567"));

        let back: RecordId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }
}
