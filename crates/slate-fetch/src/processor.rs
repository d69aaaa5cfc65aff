use std::sync::Arc;

use serde::Serialize;
use slate_source::{ContentType, Mapping, Source};
use tracing::{debug, trace, warn};

use crate::error::FetchError;
use crate::filter_spec::FilterSpec;
use crate::nested::NestedIdentity;
use crate::pattern::FieldMatcher;
use crate::planner::{Plan, plan};
use crate::projection::project;

/// Starting buffer size for re-encoded output. Nested objects are usually a
/// small slice of the parent, so they always start here; top-level output
/// never exceeds the stored document, so it starts at the smaller of the two.
pub const INITIAL_CAPACITY: usize = 1024;

// ── Driver contract ─────────────────────────────────────────────

/// Index segment the driver is about to read hits from.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentContext {
    pub ord: usize,
    pub doc_base: usize,
}

/// One search hit. `source` is the only field written during fetch.
#[derive(Debug, Clone, Default)]
pub struct Hit {
    pub id: String,
    pub nested_identity: Option<NestedIdentity>,
    pub source: Option<Arc<[u8]>>,
}

impl Hit {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn nested(id: impl Into<String>, identity: NestedIdentity) -> Self {
        Self {
            id: id.into(),
            nested_identity: Some(identity),
            source: None,
        }
    }

    pub fn is_nested(&self) -> bool {
        self.nested_identity.is_some()
    }
}

pub struct HitContext {
    pub hit: Hit,
    pub source: Source,
}

impl HitContext {
    pub fn new(hit: Hit, source: Source) -> Self {
        Self { hit, source }
    }
}

/// Per-request unit of fetch work. The driver calls `set_next_reader` when
/// it moves to a new segment and `process` once per hit, in order, from a
/// single thread.
pub trait HitProcessor {
    fn set_next_reader(&mut self, segment: &SegmentContext);

    fn process(&mut self, hit: &mut HitContext) -> Result<(), FetchError>;

    fn debug_info(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::new()
    }
}

// ── Fetch source ────────────────────────────────────────────────

/// Request-scoped inputs for the fetch source phase.
#[derive(Debug, Clone)]
pub struct FetchContext {
    pub index: String,
    pub fetch_source: Option<FilterSpec>,
    pub source_enabled: bool,
}

impl FetchContext {
    pub fn new(index: impl Into<String>, fetch_source: Option<FilterSpec>) -> Self {
        Self {
            index: index.into(),
            fetch_source,
            source_enabled: true,
        }
    }

    pub fn with_source_enabled(mut self, enabled: bool) -> Self {
        self.source_enabled = enabled;
        self
    }
}

pub struct FetchSourcePhase;

impl FetchSourcePhase {
    /// `None` when the request does not want source at all. Fails when a
    /// filter pattern cannot be compiled.
    pub fn processor(ctx: &FetchContext) -> Result<Option<FetchSourceProcessor>, FetchError> {
        let spec = match &ctx.fetch_source {
            Some(spec) if spec.fetch_source => spec.clone(),
            _ => {
                debug!(index = %ctx.index, "source not requested, skipping fetch source");
                return Ok(None);
            }
        };
        debug!(
            index = %ctx.index,
            includes = spec.includes.len(),
            excludes = spec.excludes.len(),
            source_enabled = ctx.source_enabled,
            "building fetch source processor"
        );
        FetchSourceProcessor::new(ctx.index.clone(), spec, ctx.source_enabled).map(Some)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DebugInfo {
    pub fast_path: usize,
}

#[derive(Debug)]
pub struct FetchSourceProcessor {
    index: String,
    spec: FilterSpec,
    matcher: FieldMatcher,
    source_enabled: bool,
    fast_path: usize,
}

impl FetchSourceProcessor {
    pub fn new(index: String, spec: FilterSpec, source_enabled: bool) -> Result<Self, FetchError> {
        let matcher = FieldMatcher::new(&spec)?;
        Ok(Self {
            index,
            spec,
            matcher,
            source_enabled,
            fast_path: 0,
        })
    }

    /// Number of hits returned without decoding.
    pub fn fast_path(&self) -> usize {
        self.fast_path
    }

    pub fn stats(&self) -> DebugInfo {
        DebugInfo {
            fast_path: self.fast_path,
        }
    }

    fn hit_execute(&mut self, ctx: &mut HitContext) -> Result<(), FetchError> {
        let nested = ctx.hit.nested_identity.as_ref();

        if plan(&self.spec, nested.is_some()) == Plan::PassThrough {
            trace!(id = %ctx.hit.id, bytes = ctx.source.len(), "fast path");
            ctx.hit.source = Some(ctx.source.internal_source_ref());
            self.fast_path += 1;
            return Ok(());
        }

        let doc = ctx.source.source().map_err(FetchError::Decode)?;
        let value = project(doc, &self.matcher, nested);

        let capacity = match nested {
            Some(_) => INITIAL_CAPACITY,
            None => INITIAL_CAPACITY.min(ctx.source.len()),
        };
        let bytes = object_to_bytes(value.as_ref(), ctx.source.content_type(), capacity)?;
        trace!(
            id = %ctx.hit.id,
            nested = nested.is_some(),
            found = value.is_some(),
            bytes_in = ctx.source.len(),
            bytes_out = bytes.len(),
            "filtered source"
        );
        ctx.hit.source = Some(bytes.into());
        Ok(())
    }
}

impl HitProcessor for FetchSourceProcessor {
    fn set_next_reader(&mut self, segment: &SegmentContext) {
        trace!(index = %self.index, segment = segment.ord, "next segment");
    }

    fn process(&mut self, ctx: &mut HitContext) -> Result<(), FetchError> {
        if !self.source_enabled {
            if self.spec.has_filters() {
                warn!(index = %self.index, "source filtering requested but _source is disabled");
                return Err(FetchError::InvalidRequest {
                    index: self.index.clone(),
                });
            }
            return Ok(());
        }
        self.hit_execute(ctx)
    }

    fn debug_info(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut info = serde_json::Map::new();
        info.insert("fast_path".to_string(), self.fast_path.into());
        info
    }
}

/// Encode a filtered document. An absent document (the nested object was
/// filtered away) encodes as an empty object rather than a bare null, so the
/// output is always a well-formed document of `content_type`.
pub fn object_to_bytes(
    value: Option<&Mapping>,
    content_type: ContentType,
    capacity: usize,
) -> Result<Vec<u8>, FetchError> {
    let empty = Mapping::new();
    content_type
        .encode(value.unwrap_or(&empty), capacity)
        .map_err(|source| FetchError::Encoding { source })
}
