use std::cell::OnceCell;
use std::sync::Arc;

use crate::content_type::ContentType;
use crate::error::SourceError;
use crate::node::Mapping;

/// A stored document as retrieved for one hit: the raw bytes plus their
/// content type. The decoded tree is built on first use and cached; the raw
/// bytes are never touched.
#[derive(Debug, Clone)]
pub struct Source {
    bytes: Arc<[u8]>,
    content_type: ContentType,
    decoded: OnceCell<Mapping>,
}

impl Source {
    pub fn new(bytes: impl Into<Arc<[u8]>>, content_type: ContentType) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
            decoded: OnceCell::new(),
        }
    }

    /// Encode `doc` and wrap it. The decoded form is seeded so it is not
    /// parsed again.
    pub fn from_mapping(doc: Mapping, content_type: ContentType) -> Result<Self, SourceError> {
        let bytes = content_type.encode(&doc, 0)?;
        Ok(Self {
            bytes: bytes.into(),
            content_type,
            decoded: OnceCell::from(doc),
        })
    }

    /// Shared handle to the raw bytes. Cloning is a refcount bump.
    pub fn internal_source_ref(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn is_decoded(&self) -> bool {
        self.decoded.get().is_some()
    }

    pub fn source(&self) -> Result<&Mapping, SourceError> {
        if let Some(doc) = self.decoded.get() {
            return Ok(doc);
        }
        let doc = self.content_type.decode(&self.bytes)?;
        Ok(self.decoded.get_or_init(|| doc))
    }
}
