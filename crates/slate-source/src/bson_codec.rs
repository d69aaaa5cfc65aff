use bson::spec::BinarySubtype;
use bson::{Binary, Bson, Document};

use crate::error::SourceError;
use crate::node::{Mapping, Node, Number};

pub(crate) fn decode(bytes: &[u8]) -> Result<Mapping, SourceError> {
    let doc = Document::from_reader(bytes).map_err(|e| SourceError::Bson(e.to_string()))?;
    Ok(document_to_mapping(doc))
}

pub(crate) fn encode(doc: &Mapping, buf: &mut Vec<u8>) -> Result<(), SourceError> {
    mapping_to_document(doc)?
        .to_writer(buf)
        .map_err(|e| SourceError::Bson(e.to_string()))
}

fn document_to_mapping(doc: Document) -> Mapping {
    let mut out = Mapping::with_capacity(doc.len());
    for (key, value) in doc {
        out.insert(key, bson_to_node(value));
    }
    out
}

/// Lower a `Bson` value onto the tree. Types the tree has no variant for
/// ride along as [`Node::Extended`] so they are written back as they were.
fn bson_to_node(value: Bson) -> Node {
    match value {
        Bson::Null => Node::Null,
        Bson::Boolean(b) => Node::Bool(b),
        Bson::Int32(n) => Node::Number(Number::Int32(n)),
        Bson::Int64(n) => Node::Number(Number::Int(n)),
        Bson::Double(f) => Node::Number(Number::Float(f)),
        Bson::String(s) => Node::String(s),
        Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes,
        }) => Node::Bytes(bytes),
        Bson::Array(arr) => Node::Sequence(arr.into_iter().map(bson_to_node).collect()),
        Bson::Document(doc) => Node::Mapping(document_to_mapping(doc)),
        other => Node::Extended(other),
    }
}

fn mapping_to_document(doc: &Mapping) -> Result<Document, SourceError> {
    let mut out = Document::new();
    for (key, value) in doc.iter() {
        out.insert(key.clone(), node_to_bson(value)?);
    }
    Ok(out)
}

fn node_to_bson(node: &Node) -> Result<Bson, SourceError> {
    Ok(match node {
        Node::Null => Bson::Null,
        Node::Bool(b) => Bson::Boolean(*b),
        Node::Number(Number::Int32(n)) => Bson::Int32(*n),
        Node::Number(Number::Int(n)) => Bson::Int64(*n),
        Node::Number(Number::UInt(n)) => {
            let n = i64::try_from(*n).map_err(|_| SourceError::Unrepresentable {
                content_type: "bson",
                reason: format!("integer {n} exceeds int64"),
            })?;
            Bson::Int64(n)
        }
        Node::Number(Number::Float(f)) => Bson::Double(*f),
        Node::String(s) => Bson::String(s.clone()),
        Node::Bytes(b) => Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: b.clone(),
        }),
        Node::Sequence(items) => {
            Bson::Array(items.iter().map(node_to_bson).collect::<Result<_, _>>()?)
        }
        Node::Mapping(m) => Bson::Document(mapping_to_document(m)?),
        Node::Extended(b) => b.clone(),
    })
}

#[cfg(test)]
mod tests {
    use bson::oid::ObjectId;
    use bson::{DateTime, Decimal128, Regex, Timestamp, doc};

    use super::*;

    fn bytes_of(doc: &Document) -> Vec<u8> {
        let mut buf = Vec::new();
        doc.to_writer(&mut buf).unwrap();
        buf
    }

    #[test]
    fn decode_scalars() {
        let bytes = bytes_of(&doc! { "a": 1, "b": 2i64, "c": 1.5, "d": "x", "e": true, "f": null });
        let m = decode(&bytes).unwrap();
        assert_eq!(m.get("a"), Some(&Node::Number(Number::Int32(1))));
        assert_eq!(m.get("b"), Some(&Node::from(2i64)));
        assert_eq!(m.get("c"), Some(&Node::from(1.5)));
        assert_eq!(m.get("d"), Some(&Node::from("x")));
        assert_eq!(m.get("e"), Some(&Node::Bool(true)));
        assert_eq!(m.get("f"), Some(&Node::Null));
    }

    #[test]
    fn object_id_is_kept_as_object_id() {
        let oid = ObjectId::new();
        let bytes = bytes_of(&doc! { "_id": oid });
        let m = decode(&bytes).unwrap();
        assert_eq!(m.get("_id"), Some(&Node::Extended(Bson::ObjectId(oid))));
    }

    #[test]
    fn bson_only_types_are_written_back_unchanged() {
        let regex = Regex {
            pattern: "^a.*".try_into().unwrap(),
            options: "i".try_into().unwrap(),
        };
        let ts = Timestamp {
            time: 5,
            increment: 1,
        };
        let uuid = Binary {
            subtype: BinarySubtype::Uuid,
            bytes: vec![1; 16],
        };
        let raw = Binary {
            subtype: BinarySubtype::Generic,
            bytes: vec![1, 2],
        };
        let original = doc! {
            "_id": ObjectId::new(),
            "at": DateTime::from_millis(1_700_000_000_000),
            "ts": ts,
            "price": Decimal128::from_bytes([3; 16]),
            "re": regex,
            "uuid": uuid,
            "raw": raw,
            "undef": Bson::Undefined,
            "nested": { "at": DateTime::from_millis(0) },
            "list": [ObjectId::new(), 1i32],
        };
        let m = decode(&bytes_of(&original)).unwrap();
        assert_eq!(m.get("raw"), Some(&Node::Bytes(vec![1, 2])));

        let mut out = Vec::new();
        encode(&m, &mut out).unwrap();
        assert_eq!(out, bytes_of(&original));
    }

    #[test]
    fn integer_widths_are_kept() {
        let bytes = bytes_of(&doc! { "a": 5i32, "b": 5i64, "c": 1i64 << 40 });
        let m = decode(&bytes).unwrap();
        let mut out = Vec::new();
        encode(&m, &mut out).unwrap();
        let doc = Document::from_reader(out.as_slice()).unwrap();
        assert_eq!(doc.get("a"), Some(&Bson::Int32(5)));
        assert_eq!(doc.get("b"), Some(&Bson::Int64(5)));
        assert_eq!(doc.get("c"), Some(&Bson::Int64(1i64 << 40)));
    }

    #[test]
    fn huge_unsigned_is_unrepresentable() {
        let m: Mapping = [("a", Node::Number(Number::UInt(u64::MAX)))]
            .into_iter()
            .collect();
        assert!(matches!(
            encode(&m, &mut Vec::new()),
            Err(SourceError::Unrepresentable { .. })
        ));
    }

    #[test]
    fn truncated_input_is_error() {
        let bytes = bytes_of(&doc! { "a": "hello" });
        assert!(matches!(decode(&bytes[..6]), Err(SourceError::Bson(_))));
    }
}
