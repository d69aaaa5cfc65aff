use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bson_codec;
use crate::error::SourceError;
use crate::node::{Mapping, Node};

/// Structured encoding of a stored document. Filtered output is always
/// written back in the same content type the document was read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Json,
    Yaml,
    Bson,
    #[serde(rename = "msgpack")]
    MsgPack,
}

impl ContentType {
    pub fn name(self) -> &'static str {
        match self {
            ContentType::Json => "json",
            ContentType::Yaml => "yaml",
            ContentType::Bson => "bson",
            ContentType::MsgPack => "msgpack",
        }
    }

    /// Decode a stored document. The root must be a mapping.
    pub fn decode(self, bytes: &[u8]) -> Result<Mapping, SourceError> {
        let root: Node = match self {
            ContentType::Bson => return bson_codec::decode(bytes),
            ContentType::Json => serde_json::from_slice(bytes)?,
            ContentType::Yaml => serde_yaml::from_slice(bytes)?,
            ContentType::MsgPack => rmp_serde::from_slice(bytes)?,
        };
        match root {
            Node::Mapping(m) => Ok(m),
            other => Err(SourceError::NotADocument(other.kind())),
        }
    }

    /// Encode a document, starting from a buffer of `capacity` bytes.
    pub fn encode(self, doc: &Mapping, capacity: usize) -> Result<Vec<u8>, SourceError> {
        let mut buf = Vec::with_capacity(capacity);
        match self {
            ContentType::Json => serde_json::to_writer(&mut buf, doc)?,
            ContentType::Yaml => serde_yaml::to_writer(&mut buf, doc)?,
            ContentType::Bson => bson_codec::encode(doc, &mut buf)?,
            ContentType::MsgPack => rmp_serde::encode::write(&mut buf, doc)?,
        }
        Ok(buf)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
