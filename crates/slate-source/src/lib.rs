mod bson_codec;
mod content_type;
mod error;
mod node;
mod source;

pub use content_type::ContentType;
pub use error::SourceError;
pub use node::{Mapping, Node, Number};
pub use source::Source;
