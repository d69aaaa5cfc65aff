#![allow(dead_code)]

use bson::Document;
use slate_fetch::{
    ContentType, FetchContext, FetchSourcePhase, FetchSourceProcessor, FilterSpec, Hit,
    HitContext, NestedIdentity, Source,
};

pub const INDEX: &str = "accounts";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn processor(spec: FilterSpec) -> FetchSourceProcessor {
    init_tracing();
    FetchSourcePhase::processor(&FetchContext::new(INDEX, Some(spec)))
        .unwrap()
        .expect("source requested")
}

pub fn disabled_source_processor(index: &str, spec: FilterSpec) -> FetchSourceProcessor {
    FetchSourcePhase::processor(&FetchContext::new(index, Some(spec)).with_source_enabled(false))
        .unwrap()
        .expect("source requested")
}

pub fn json_hit(json: &str) -> HitContext {
    HitContext::new(
        Hit::new("1"),
        Source::new(json.as_bytes().to_vec(), ContentType::Json),
    )
}

pub fn nested_json_hit(json: &str, identity: NestedIdentity) -> HitContext {
    HitContext::new(
        Hit::nested("1", identity),
        Source::new(json.as_bytes().to_vec(), ContentType::Json),
    )
}

pub fn bson_hit(doc: &Document) -> HitContext {
    let mut bytes = Vec::new();
    doc.to_writer(&mut bytes).unwrap();
    HitContext::new(Hit::new("1"), Source::new(bytes, ContentType::Bson))
}

pub fn output_json(ctx: &HitContext) -> serde_json::Value {
    let bytes = ctx.hit.source.as_ref().expect("source set");
    serde_json::from_slice(bytes).unwrap()
}

pub fn output_bson(ctx: &HitContext) -> Document {
    let bytes = ctx.hit.source.as_ref().expect("source set");
    Document::from_reader(&bytes[..]).unwrap()
}
