//! Record codec
//!
//! Records are stored as a self-describing JSON envelope:
//!
//! ```text
//! { "format_version": 1, "kind": "experiment", "record": { ...named fields... } }
//! ```
//!
//! The version and kind are checked before the record body is decoded, and
//! decoding is all-or-nothing: a malformed body yields [`Error::Codec`],
//! never a partially populated record.
//!
//! Dataframe payloads use a separate columnar encoding, see [`parquet`].

pub mod parquet;
mod value;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use value::Value;

use crate::{Error, Result};

/// Envelope format written by this crate.
pub const FORMAT_VERSION: u32 = 1;

/// A durable record type.
pub trait Record: Serialize + DeserializeOwned {
    /// Kind tag written into the envelope and checked on decode.
    const KIND: &'static str;
}

/// Free-form field map, the most general record shape.
pub type Fields = BTreeMap<String, Value>;

impl Record for Fields {
    const KIND: &'static str = "fields";
}

#[derive(Serialize)]
struct EnvelopeRef<'a, R> {
    format_version: u32,
    kind: &'a str,
    record: &'a R,
}

#[derive(Deserialize)]
struct Envelope {
    format_version: u32,
    kind: String,
    record: serde_json::Value,
}

/// Encode a record into its durable byte form.
///
/// # Errors
///
/// Returns [`Error::Codec`] if the record cannot be serialized.
pub fn encode<R: Record>(record: &R) -> Result<Vec<u8>> {
    let envelope = EnvelopeRef {
        format_version: FORMAT_VERSION,
        kind: R::KIND,
        record,
    };
    serde_json::to_vec(&envelope).map_err(|e| Error::codec("encode", R::KIND, e))
}

/// Decode a record from bytes written by [`encode`].
///
/// # Errors
///
/// Returns [`Error::Codec`] on malformed bytes, an unknown format version,
/// or a kind mismatch.
pub fn decode<R: Record>(bytes: &[u8]) -> Result<R> {
    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(|e| Error::codec("decode", R::KIND, e))?;

    if envelope.format_version > FORMAT_VERSION {
        return Err(Error::codec(
            "decode",
            R::KIND,
            format!(
                "format version {} is newer than supported version {FORMAT_VERSION}",
                envelope.format_version
            ),
        ));
    }
    if envelope.kind != R::KIND {
        return Err(Error::codec(
            "decode",
            R::KIND,
            format!("expected a {} record, found {}", R::KIND, envelope.kind),
        ));
    }

    serde_json::from_value(envelope.record).map_err(|e| Error::codec("decode", R::KIND, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Fields {
        let mut fields = Fields::new();
        fields.insert("n_estimators".into(), Value::Int(100));
        fields.insert("criterion".into(), Value::from("gini"));
        fields.insert(
            "blob".into(),
            Value::Tuple(vec![Value::Bytes(vec![1, 2, 3]), Value::Float(0.5)]),
        );
        fields
    }

    #[test]
    fn test_round_trip() {
        let fields = sample();
        let bytes = encode(&fields).unwrap();
        let back: Fields = decode(&bytes).unwrap();
        assert_eq!(back, fields);
    }

    #[test]
    fn test_truncated_input_is_codec_error() {
        let bytes = encode(&sample()).unwrap();
        let err = decode::<Fields>(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, Error::Codec { .. }));
    }

    #[test]
    fn test_newer_version_rejected() {
        let bytes = br#"{"format_version":99,"kind":"fields","record":{}}"#;
        let err = decode::<Fields>(bytes).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let bytes = br#"{"format_version":1,"kind":"metric","record":{}}"#;
        let err = decode::<Fields>(bytes).unwrap_err();
        assert!(err.to_string().contains("expected a fields record"));
    }

    #[test]
    fn test_bad_field_value_rejected() {
        let bytes =
            br#"{"format_version":1,"kind":"fields","record":{"a":{"type":"int","value":"x"}}}"#;
        assert!(decode::<Fields>(bytes).is_err());
    }
}
