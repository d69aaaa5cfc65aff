mod error;
mod filter_spec;
mod nested;
mod pattern;
mod planner;
mod processor;
mod projection;

pub use error::FetchError;
pub use filter_spec::FilterSpec;
pub use nested::{NestedIdentity, extract_nested};
pub use pattern::{FieldMatcher, Inclusion, PathPattern};
pub use planner::{Plan, plan};
pub use processor::{
    DebugInfo, FetchContext, FetchSourcePhase, FetchSourceProcessor, Hit, HitContext,
    HitProcessor, INITIAL_CAPACITY, SegmentContext, object_to_bytes,
};
pub use projection::{filter_mapping, project};
pub use slate_source::{ContentType, Mapping, Node, Number, Source, SourceError};
