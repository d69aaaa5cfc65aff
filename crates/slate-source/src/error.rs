#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("bson error: {0}")]
    Bson(String),

    #[error("msgpack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    #[error("msgpack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    #[error("document root must be a mapping, found {0}")]
    NotADocument(&'static str),

    #[error("value cannot be represented as {content_type}: {reason}")]
    Unrepresentable {
        content_type: &'static str,
        reason: String,
    },
}
