use std::fmt;
use std::str::FromStr;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The time-ordered key every stored record carries.
///
/// Ordering follows the underlying 12 bytes, whose leading 4 bytes are the
/// creation timestamp, so a smaller id is always an older record. The
/// textual form is 24 lowercase hex characters and is what clients see
/// both as record ids and as pagination cursors.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordId(ObjectId);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed record id {0:?}")]
pub struct MalformedId(pub String);

impl RecordId {
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        RecordId(ObjectId::from_bytes(bytes))
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    /// Decodes a client-supplied id. Shared by lookups and the paginator so
    /// both reject exactly the same inputs.
    pub fn decode(raw: &str) -> Result<Self, MalformedId> {
        ObjectId::parse_str(raw)
            .map(RecordId)
            .map_err(|_| MalformedId(raw.to_string()))
    }

    pub fn encode(&self) -> String {
        self.0.to_hex()
    }
}

impl From<ObjectId> for RecordId {
    fn from(value: ObjectId) -> Self {
        RecordId(value)
    }
}

impl FromStr for RecordId {
    type Err = MalformedId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::decode(&raw).map_err(serde::de::Error::custom)
    }
}
